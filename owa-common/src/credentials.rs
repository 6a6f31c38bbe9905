//! Salted password hashing for members
//!
//! `hash = SHA-256(salt_hex || password)` rendered as 64 hex characters.
//! The salt is 16 random bytes rendered as hex.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Stored password credential. Never holds the plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

impl PasswordHash {
    /// Hash `password` with a newly generated salt
    pub fn generate(password: &str) -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let salt: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        let hash = calculate(&salt, password);
        Self { hash, salt }
    }

    /// Rebuild from stored columns
    pub fn from_parts(hash: String, salt: String) -> Self {
        Self { hash, salt }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        calculate(&self.salt, candidate) == self.hash
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash").finish_non_exhaustive()
    }
}

fn calculate(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_and_not_plaintext() {
        let cred = PasswordHash::generate("1234");
        assert_eq!(cred.hash.len(), 64);
        assert!(cred.hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(cred.hash, "1234");
        assert_eq!(cred.salt.len(), 32);
    }

    #[test]
    fn test_salts_are_different() {
        let a = PasswordHash::generate("catssuck");
        let b = PasswordHash::generate("catssuck");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
        assert!(a.verify("catssuck"));
        assert!(b.verify("catssuck"));
    }

    #[test]
    fn test_from_parts_verifies() {
        let cred = PasswordHash::generate("cat");
        let restored = PasswordHash::from_parts(cred.hash.clone(), cred.salt.clone());
        assert!(restored.verify("cat"));
        assert!(!restored.verify("dog"));
    }
}
