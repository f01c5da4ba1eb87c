//! `_key` generation for blocks, spans and mark definitions.

use uuid::Uuid;

/// Length of generated keys, in hex characters.
pub const KEY_LEN: usize = 12;

/// Generate a fresh key.
///
/// Keys are random, so uniqueness holds within any array a single document
/// produces; nothing needs to be threaded through the parser to achieve it.
pub fn new_key() -> String {
    let mut key = Uuid::new_v4().simple().to_string();
    key.truncate(KEY_LEN);
    key
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_key_shape() {
        let key = new_key();
        assert_eq!(key.len(), KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_keys_are_distinct() {
        let keys: HashSet<_> = (0..1000).map(|_| new_key()).collect();
        assert_eq!(keys.len(), 1000);
    }
}
