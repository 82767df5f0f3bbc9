use sha2::{Digest, Sha256};

/// Computes the credential digest: a single SHA-256 pass over the
/// plaintext, lowercase hex encoded.
///
/// Deterministic, unsalted and unkeyed. Stored digests depend on this
/// exact construction, so it must not be changed without a migration.
pub fn hash(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    let digest = hasher.finalize();

    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Recomputes the digest for `attempt` and compares it with the stored one.
pub fn verify(attempt: &str, stored_digest: &str) -> bool {
    hash(attempt) == stored_digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_hex() {
        let a = hash("password1");
        let b = hash("password1");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_inputs_produce_different_digests() {
        assert_ne!(hash("password1"), hash("password2"));
        assert_ne!(hash(""), hash(" "));
    }

    #[test]
    fn verify_accepts_matching_password() {
        let digest = hash("correct horse battery staple");
        assert!(verify("correct horse battery staple", &digest));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let digest = hash("password1");
        assert!(!verify("password2", &digest));
        assert!(!verify("", &digest));
    }
}
