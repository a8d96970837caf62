//! BigQuery-parity experiment bucketing on top of `fingerprint64`.
//!
//! Reproduces `MOD(ABS(FARM_FINGERPRINT(CONCAT(id, experiment, salt))), N)`
//! exactly: BigQuery's `ABS` acts on the fingerprint reinterpreted as a
//! *signed* 64-bit integer, so the same two's-complement absolute value is
//! taken here before the modulo.

use crate::fingerprint64;

/// Map an already-computed fingerprint to a bucket in `0..num_buckets`.
///
/// `num_buckets` must be non-zero. `i64::MIN` has no positive counterpart;
/// its absolute value is kept as the unsigned `2^63`, matching BigQuery.
pub fn bucket_for_fingerprint(fp: u64, num_buckets: u64) -> u64 {
    assert!(num_buckets > 0, "num_buckets must be non-zero");
    (fp as i64).unsigned_abs() % num_buckets
}

/// Fingerprint a key and map it to a bucket in `0..num_buckets`.
pub fn bucket(key: &[u8], num_buckets: u64) -> u64 {
    bucket_for_fingerprint(fingerprint64(key), num_buckets)
}

/// Bucket an id under an experiment/salt pair, concatenated in the same
/// order the SQL side uses: `id + experiment + salt`, UTF-8 bytes.
pub fn salted_bucket(id: &str, experiment: &str, salt: &str, num_buckets: u64) -> u64 {
    let mut payload = String::with_capacity(id.len() + experiment.len() + salt.len());
    payload.push_str(id);
    payload.push_str(experiment);
    payload.push_str(salt);
    bucket(payload.as_bytes(), num_buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_abs_edge_cases() {
        // positive fingerprints pass through
        assert_eq!(bucket_for_fingerprint(250, 100), 50);
        // negative fingerprints are negated, not truncated
        let neg = (-250i64) as u64;
        assert_eq!(bucket_for_fingerprint(neg, 100), 50);
        // i64::MIN stays 2^63
        assert_eq!(bucket_for_fingerprint(1u64 << 63, 100), (1u64 << 63) % 100);
        assert_eq!(bucket_for_fingerprint(0, 100), 0);
    }

    #[test]
    fn test_bigquery_parity() {
        // expected buckets computed with
        // MOD(ABS(FARM_FINGERPRINT(CONCAT(id, 'test:1', 'salt-2025'))), 100)
        assert_eq!(salted_bucket("1234-5678-ABCD", "test:1", "salt-2025", 100), 47);
        assert_eq!(salted_bucket("A1B2C3D4", "test:1", "salt-2025", 100), 98);
        assert_eq!(salted_bucket("xyz-987", "test:1", "salt-2025", 100), 63);
    }

    #[test]
    fn test_bucket_in_range() {
        for i in 0..1000u32 {
            let key = format!("user-{}", i);
            assert!(bucket(key.as_bytes(), 100) < 100);
        }
    }

    #[test]
    fn test_salt_changes_assignment() {
        let a = salted_bucket("1234-5678-ABCD", "test:1", "salt-2025", 1 << 32);
        let b = salted_bucket("1234-5678-ABCD", "test:1", "salt-2026", 1 << 32);
        assert_ne!(a, b);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_buckets_panics() {
        bucket_for_fingerprint(1, 0);
    }
}
