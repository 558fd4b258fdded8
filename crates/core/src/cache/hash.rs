//! Content-addressed file names for the filesystem tier.

use sha2::{Digest, Sha256};

/// Extension of every record file.
pub const RECORD_EXTENSION: &str = "json";

/// Map a cache key to a filesystem-safe file name.
pub fn cache_file_name(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{}.{RECORD_EXTENSION}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let name1 = cache_file_name("audit:https://example.com/");
        let name2 = cache_file_name("audit:https://example.com/");
        assert_eq!(name1, name2);
    }

    #[test]
    fn test_hash_different_keys() {
        let a = cache_file_name("audit:https://example.com/");
        let b = cache_file_name("audit:https://example.org/");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let name = cache_file_name("audit:https://example.com/?q=a/b&c=<d>");
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "json");
        assert_eq!(stem.len(), 64);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
