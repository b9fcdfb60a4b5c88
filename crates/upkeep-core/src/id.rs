use sha2::{Digest, Sha256};

/// Generate a deterministic row ID from a kind prefix and a type-qualified
/// key. Format: `{prefix}-{first 6 hex chars of SHA256}`.
pub fn generate_id(prefix: &str, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let hash = hasher.finalize();
    let hex = hex_encode(&hash);
    format!("{prefix}-{}", &hex[..6])
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic() {
        let id1 = generate_id("wo", "work_order:eq-abc:Replace filter:2024-01-01");
        let id2 = generate_id("wo", "work_order:eq-abc:Replace filter:2024-01-01");
        assert_eq!(id1, id2);
        assert!(id1.starts_with("wo-"));
        assert_eq!(id1.len(), 9); // "wo-" + 6 hex chars
    }

    #[test]
    fn different_keys_different_ids() {
        let id1 = generate_id("eq", "equipment:FORK-01");
        let id2 = generate_id("eq", "equipment:FORK-02");
        assert_ne!(id1, id2);
    }
}
