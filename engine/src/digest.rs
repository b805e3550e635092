//! Frame digests for render regression tests.
//!
//! Comparing SHA-256 digests keeps assertions short and failure output readable when frames are
//! hundreds of kilobytes.

use sha2::{Digest, Sha256};

pub fn rgba_sha256_hex(rgba: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rgba);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let a = vec![0u8; 16];
        let mut b = a.clone();
        assert_eq!(rgba_sha256_hex(&a), rgba_sha256_hex(&b));

        b[3] = 1;
        assert_ne!(rgba_sha256_hex(&a), rgba_sha256_hex(&b));
    }

    #[test]
    fn digest_of_empty_input_is_the_sha256_empty_string() {
        assert_eq!(
            rgba_sha256_hex(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
