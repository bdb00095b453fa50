//! Refresh credential hashing via bcrypt.
//!
//! bcrypt only reads the first 72 bytes of its input, so the encoded refresh
//! credential is cut to that length before hashing and verification.

use super::AuthError;

/// Maximum number of input bytes bcrypt consumes.
pub const BCRYPT_MAX_INPUT: usize = 72;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 10;

/// Hashes and verifies encoded refresh credentials.
#[derive(Debug, Clone, Copy)]
pub struct SecretHasher {
    cost: u32,
}

impl SecretHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash the leading bytes of an encoded refresh credential.
    pub fn hash(&self, encoded: &str) -> Result<String, AuthError> {
        bcrypt::hash(bounded(encoded), self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Check an encoded refresh credential against a stored hash.
    ///
    /// A stored value that is not a bcrypt hash (such as the empty placeholder
    /// left by an interrupted issuance) never matches.
    pub fn verify(&self, encoded: &str, stored_hash: &str) -> bool {
        bcrypt::verify(bounded(encoded), stored_hash).unwrap_or(false)
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

fn bounded(encoded: &str) -> &[u8] {
    let bytes = encoded.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_INPUT)]
}
