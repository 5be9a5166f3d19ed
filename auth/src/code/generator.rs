use rand::rngs::OsRng;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Verification code generator.
///
/// Draws each character uniformly from the 62-symbol alphanumeric alphabet
/// using the operating system's cryptographically secure random source.
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    const DEFAULT_LENGTH: usize = 6;

    /// Create a generator producing codes of the default length (6).
    pub fn new() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
        }
    }

    /// Create a generator producing codes of an explicit length.
    pub fn with_length(length: usize) -> Self {
        Self { length }
    }

    /// Generate a fresh random code.
    ///
    /// # Returns
    /// Alphanumeric code string of the configured length
    pub fn generate(&self) -> String {
        (0..self.length)
            .map(|_| {
                let index = OsRng.gen_range(0..ALPHABET.len());
                ALPHABET[index] as char
            })
            .collect()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
