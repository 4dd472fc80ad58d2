use sha2::{Digest, Sha256};

/// Computes the checksum stored next to every persisted note.
pub trait IntegrityProvider {
    fn checksum(&self, content: &str) -> String;

    fn verify(&self, content: &str, checksum: &str) -> bool {
        self.checksum(content) == checksum
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Integrity;

impl IntegrityProvider for Sha256Integrity {
    fn checksum(&self, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_checksum_is_stable_hex() {
        let integrity = Sha256Integrity;
        let sum = integrity.checksum("hello");
        assert_eq!(
            sum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert!(integrity.verify("hello", &sum));
        assert!(!integrity.verify("hello!", &sum));
    }
}
