//! General utilities for tugextract.
//!
//! Identifier generation for backups, undo tokens, and journal entries.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a unique u64 for backup ids and undo tokens.
///
/// Mixes the current timestamp, process id, thread id and an atomic counter,
/// then hashes them with SHA-256 for a well-distributed value.
pub fn rand_u64() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let pid = std::process::id();
    let thread_id = format!("{:?}", std::thread::current().id());
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_le_bytes());
    hasher.update(pid.to_le_bytes());
    hasher.update(thread_id.as_bytes());
    hasher.update(counter.to_le_bytes());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

/// Generate a formatted backup id, e.g. `backup_0123456789abcdef`.
pub fn generate_backup_id() -> String {
    format!("backup_{:016x}", rand_u64())
}

/// Generate a formatted undo token, e.g. `undo_0123456789abcdef`.
pub fn generate_undo_token() -> String {
    format!("undo_{:016x}", rand_u64())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rand_u64_produces_different_values() {
        let mut values = HashSet::new();
        for _ in 0..1000 {
            let v = rand_u64();
            assert!(values.insert(v), "Duplicate value produced: {}", v);
        }
    }

    #[test]
    fn backup_id_format() {
        let id = generate_backup_id();
        assert!(id.starts_with("backup_"), "Should start with backup_: {}", id);
        assert_eq!(id.len(), 23, "Should be 23 chars: {}", id);
    }

    #[test]
    fn undo_token_format() {
        let token = generate_undo_token();
        assert!(token.starts_with("undo_"), "Should start with undo_: {}", token);
        assert_eq!(token.len(), 21, "Should be 21 chars: {}", token);
    }
}
