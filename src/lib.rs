//! farmprint - deterministic 64-bit fingerprinting (FarmHash Fingerprint64)
//! **WARNING: NOT CRYPTOGRAPHICALLY SECURE**
//!
//! Bit-for-bit compatible with BigQuery's `FARM_FINGERPRINT`, i.e. the
//! portable `farmhashna::Hash64` path of Google FarmHash. Every multi-byte
//! read is explicit little-endian and every multiply wraps at 64 bits, so
//! outputs are identical on every platform, every run, every process.

pub mod bucket;

const K0: u64 = 0xc3a5c85c97cb3127;
const K1: u64 = 0xb492b66fbe98f273;
const K2: u64 = 0x9ae16a3b2f90404f;

/// Fast unaligned little-endian u64 read - caller guarantees `i + 8 <= s.len()`
#[inline(always)]
fn fetch64(s: &[u8], i: usize) -> u64 {
    debug_assert!(i + 8 <= s.len());
    unsafe { u64::from_le(std::ptr::read_unaligned(s.as_ptr().add(i) as *const u64)) }
}

/// Unaligned little-endian u32 read, widened - caller guarantees `i + 4 <= s.len()`
#[inline(always)]
fn fetch32(s: &[u8], i: usize) -> u64 {
    debug_assert!(i + 4 <= s.len());
    unsafe { u32::from_le(std::ptr::read_unaligned(s.as_ptr().add(i) as *const u32)) as u64 }
}

#[inline(always)]
fn shift_mix(v: u64) -> u64 {
    v ^ (v >> 47)
}

/// 128-to-64 fold with a per-length multiplier
#[inline(always)]
fn hash_len16(u: u64, v: u64, mul: u64) -> u64 {
    let mut a = (u ^ v).wrapping_mul(mul);
    a ^= a >> 47;
    let mut b = (v ^ a).wrapping_mul(mul);
    b ^= b >> 47;
    b.wrapping_mul(mul)
}

fn hash_len_0_to_16(s: &[u8]) -> u64 {
    let len = s.len();
    if len >= 8 {
        let mul = K2.wrapping_add(len as u64 * 2);
        let a = fetch64(s, 0).wrapping_add(K2);
        let b = fetch64(s, len - 8); // overlapping tail read
        let c = b.rotate_right(37).wrapping_mul(mul).wrapping_add(a);
        let d = a.rotate_right(25).wrapping_add(b).wrapping_mul(mul);
        return hash_len16(c, d, mul);
    }
    if len >= 4 {
        let mul = K2.wrapping_add(len as u64 * 2);
        let a = fetch32(s, 0);
        let b = fetch32(s, len - 4);
        return hash_len16((len as u64).wrapping_add(a << 3), b, mul);
    }
    if len > 0 {
        let a = s[0] as u64;
        let b = s[len >> 1] as u64;
        let c = s[len - 1] as u64;
        let y = a.wrapping_add(b << 8);
        let z = (len as u64).wrapping_add(c << 2);
        return shift_mix(y.wrapping_mul(K2) ^ z.wrapping_mul(K0)).wrapping_mul(K2);
    }
    // reserved empty-input constant
    K2
}

fn hash_len_17_to_32(s: &[u8]) -> u64 {
    let len = s.len();
    let mul = K2.wrapping_add(len as u64 * 2);
    let a = fetch64(s, 0).wrapping_mul(K1);
    let b = fetch64(s, 8);
    let c = fetch64(s, len - 8).wrapping_mul(mul);
    let d = fetch64(s, len - 16).wrapping_mul(K2);
    hash_len16(
        a.wrapping_add(b)
            .rotate_right(43)
            .wrapping_add(c.rotate_right(30))
            .wrapping_add(d),
        a.wrapping_add(b.wrapping_add(K2).rotate_right(18)).wrapping_add(c),
        mul,
    )
}

fn hash_len_33_to_64(s: &[u8]) -> u64 {
    let len = s.len();
    let mul = K2.wrapping_add(len as u64 * 2);
    let a = fetch64(s, 0).wrapping_mul(K2);
    let b = fetch64(s, 8);
    let c = fetch64(s, len - 8).wrapping_mul(mul);
    let d = fetch64(s, len - 16).wrapping_mul(K2);
    let y = a
        .wrapping_add(b)
        .rotate_right(43)
        .wrapping_add(c.rotate_right(30))
        .wrapping_add(d);
    let z = hash_len16(
        y,
        a.wrapping_add(b.wrapping_add(K2).rotate_right(18)).wrapping_add(c),
        mul,
    );
    let e = fetch64(s, 16).wrapping_mul(mul);
    let f = fetch64(s, 24);
    let g = y.wrapping_add(fetch64(s, len - 32)).wrapping_mul(mul);
    let h = z.wrapping_add(fetch64(s, len - 24)).wrapping_mul(mul);
    hash_len16(
        e.wrapping_add(f)
            .rotate_right(43)
            .wrapping_add(g.rotate_right(30))
            .wrapping_add(h),
        e.wrapping_add(f.wrapping_add(a).rotate_right(18)).wrapping_add(g),
        mul,
    )
}

/// 32-byte lane update for the long-input loop
#[inline(always)]
fn weak_hash_len32_with_seeds(s: &[u8], i: usize, a: u64, b: u64) -> (u64, u64) {
    let w = fetch64(s, i);
    let x = fetch64(s, i + 8);
    let y = fetch64(s, i + 16);
    let z = fetch64(s, i + 24);
    let mut a = a.wrapping_add(w);
    let mut b = b.wrapping_add(a).wrapping_add(z).rotate_right(21);
    let c = a;
    a = a.wrapping_add(x).wrapping_add(y);
    b = b.wrapping_add(a.rotate_right(44));
    (a.wrapping_add(z), b.wrapping_add(c))
}

/// Inputs above 64 bytes: 64-byte block loop over three scalar registers
/// and two 2-word lanes. The final block is always the *last* 64 bytes of
/// the buffer, overlapping already-consumed bytes when the length is not a
/// multiple of 64 - never zero-padded.
fn hash_long(s: &[u8]) -> u64 {
    let len = s.len();
    let mut x: u64 = 81;
    let mut y: u64 = 81u64.wrapping_mul(K1).wrapping_add(113);
    let mut z: u64 = shift_mix(y.wrapping_mul(K2).wrapping_add(113)).wrapping_mul(K2);
    let mut v: (u64, u64) = (0, 0);
    let mut w: (u64, u64) = (0, 0);
    x = x.wrapping_mul(K2).wrapping_add(fetch64(s, 0));

    // every full block except the one covering the final byte
    let end = ((len - 1) / 64) * 64;
    let mut pos = 0;
    while pos < end {
        x = x
            .wrapping_add(y)
            .wrapping_add(v.0)
            .wrapping_add(fetch64(s, pos + 8))
            .rotate_right(37)
            .wrapping_mul(K1);
        y = y
            .wrapping_add(v.1)
            .wrapping_add(fetch64(s, pos + 48))
            .rotate_right(42)
            .wrapping_mul(K1);
        x ^= w.1;
        y = y.wrapping_add(v.0).wrapping_add(fetch64(s, pos + 40));
        z = z.wrapping_add(w.0).rotate_right(33).wrapping_mul(K1);
        v = weak_hash_len32_with_seeds(s, pos, v.1.wrapping_mul(K1), x.wrapping_add(w.0));
        w = weak_hash_len32_with_seeds(
            s,
            pos + 32,
            z.wrapping_add(w.1),
            y.wrapping_add(fetch64(s, pos + 16)),
        );
        std::mem::swap(&mut z, &mut x);
        pos += 64;
    }

    // last 64 bytes, with a data-dependent multiplier fixed before the block
    let last = len - 64;
    let mul = K1.wrapping_add((z & 0xff) << 1);
    w.0 = w.0.wrapping_add(((len - 1) & 63) as u64);
    v.0 = v.0.wrapping_add(w.0);
    w.0 = w.0.wrapping_add(v.0);
    x = x
        .wrapping_add(y)
        .wrapping_add(v.0)
        .wrapping_add(fetch64(s, last + 8))
        .rotate_right(37)
        .wrapping_mul(mul);
    y = y
        .wrapping_add(v.1)
        .wrapping_add(fetch64(s, last + 48))
        .rotate_right(42)
        .wrapping_mul(mul);
    x ^= w.1.wrapping_mul(9);
    y = y
        .wrapping_add(v.0.wrapping_mul(9))
        .wrapping_add(fetch64(s, last + 40));
    z = z.wrapping_add(w.0).rotate_right(33).wrapping_mul(mul);
    v = weak_hash_len32_with_seeds(s, last, v.1.wrapping_mul(mul), x.wrapping_add(w.0));
    w = weak_hash_len32_with_seeds(
        s,
        last + 32,
        z.wrapping_add(w.1),
        y.wrapping_add(fetch64(s, last + 16)),
    );
    std::mem::swap(&mut z, &mut x);

    hash_len16(
        hash_len16(v.0, w.0, mul)
            .wrapping_add(shift_mix(y).wrapping_mul(K0))
            .wrapping_add(z),
        hash_len16(v.1, w.1, mul).wrapping_add(x),
        mul,
    )
}

/// Deterministic 64-bit fingerprint of a byte slice.
///
/// Pure and total: every input, including the empty slice, has a defined
/// output, and identical bytes always fingerprint to the identical value.
/// Single pass, O(n) time, no allocation.
///
/// ```
/// assert_eq!(farmprint::fingerprint64(b""), 0x9ae16a3b2f90404f);
/// assert_eq!(farmprint::fingerprint64(b"a"), 0xb3454265b6df75e3);
/// ```
pub fn fingerprint64(data: &[u8]) -> u64 {
    let len = data.len();
    if len <= 16 {
        hash_len_0_to_16(data)
    } else if len <= 32 {
        hash_len_17_to_32(data)
    } else if len <= 64 {
        hash_len_33_to_64(data)
    } else {
        hash_long(data)
    }
}

/// Fingerprint many independent keys, in parallel above a size threshold.
///
/// Output is identical to `keys.iter().map(|k| fingerprint64(k))` - the
/// parallelism is strictly per-key and never enters the mixing pipeline,
/// so determinism is unaffected.
pub fn fingerprint64_batch<T: AsRef<[u8]> + Sync>(keys: &[T]) -> Vec<u64> {
    use rayon::prelude::*;

    if keys.len() < 4096 {
        return keys.iter().map(|k| fingerprint64(k.as_ref())).collect();
    }
    keys.par_iter().map(|k| fingerprint64(k.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth_bytes(n: usize) -> Vec<u8> {
        (0..n).map(|i| ((i * 131 + 7) & 0xff) as u8).collect()
    }

    #[test]
    fn test_empty_fixed_point() {
        assert_eq!(fingerprint64(b""), 0x9ae16a3b2f90404f);
        assert_eq!(fingerprint64(b""), K2);
    }

    #[test]
    fn test_reference_strings() {
        // pinned against the reference implementation
        assert_eq!(fingerprint64(b"a"), 0xb3454265b6df75e3);
        assert_eq!(fingerprint64(b"b"), 0xa3b260215ec8f116);
        assert_eq!(fingerprint64(b"ab"), 0xaa8d6e5242ada51e);
        assert_eq!(fingerprint64(b"abc"), 0x24a5b3a074e7f369);
        assert_eq!(fingerprint64(b"abcd"), 0x1a5502de4a1f8101);
        assert_eq!(fingerprint64(b"hello"), 0xb48be5a931380ce8);
        assert_eq!(fingerprint64(b"message digest"), 0x8db193972bf98c6a);
        assert_eq!(fingerprint64(b"0123456789abcdef"), 0x54b961e5dc834067);
        assert_eq!(fingerprint64(b"0123456789abcdefg"), 0xa6ddff87a449d24a);
        assert_eq!(
            fingerprint64(b"The quick brown fox jumps over the lazy dog"),
            0xabbe83f33b1b5134
        );
    }

    #[test]
    fn test_band_boundaries() {
        // every dispatch boundary plus off-by-one neighbors
        let expected: &[(usize, u64)] = &[
            (1, 0x57821efdee1b7472),
            (3, 0xbeedf37b20babe01),
            (4, 0x78e5c39592d63067),
            (7, 0x04dd505220c44e7e),
            (8, 0xc19f34cbc54f4865),
            (9, 0x80aee4d0d63a7eca),
            (15, 0x390ab3fd476b7830),
            (16, 0x08b48f7ec30e084e),
            (17, 0xe8255d05f537d5f5),
            (31, 0x27c23ea18dbddfc4),
            (32, 0xeff8e4a51615d6df),
            (33, 0x73ddd0098c2d6111),
            (63, 0xad805636300d1112),
            (64, 0xe21627d5817d4f6f),
            (65, 0x97cc91b3a8f4e680),
            (96, 0xe95a7525bf93818f),
            (127, 0xea9c203d31e7d08b),
            (128, 0x1c164782a87793e4),
            (129, 0x986a5ebcf9b59191),
            (192, 0xd1668cd1dec9e4b0),
            (256, 0x289bc8766d49012d),
            (1000, 0xed05b63329b7b737),
        ];
        for &(n, want) in expected {
            assert_eq!(fingerprint64(&synth_bytes(n)), want, "length {}", n);
        }
    }

    #[test]
    fn test_deterministic() {
        for n in [0usize, 1, 16, 17, 64, 65, 500] {
            let data = synth_bytes(n);
            assert_eq!(fingerprint64(&data), fingerprint64(&data));
        }
    }

    #[test]
    fn test_length_sensitivity() {
        // trailing zero bytes are not ignored
        assert_eq!(fingerprint64(b"AB"), 0xd2ae2af1d8b98abd);
        assert_eq!(fingerprint64(b"AB\0"), 0x3c86404a841eee3a);
        assert_ne!(fingerprint64(b"AB"), fingerprint64(b"AB\0"));
        for n in [5usize, 12, 40, 200] {
            let mut data = synth_bytes(n);
            let short = fingerprint64(&data);
            data.push(0);
            assert_ne!(short, fingerprint64(&data));
        }
    }

    #[test]
    fn test_single_byte_no_collisions() {
        let mut seen = std::collections::HashSet::new();
        for b in 0u8..=255 {
            seen.insert(fingerprint64(&[b]));
        }
        assert_eq!(seen.len(), 256);
    }

    #[test]
    fn test_two_byte_no_collisions() {
        let mut seen = std::collections::HashSet::new();
        for a in 0u8..=255 {
            for b in 0u8..=255 {
                seen.insert(fingerprint64(&[a, b]));
            }
        }
        assert_eq!(seen.len(), 65536);
    }

    #[test]
    fn test_avalanche() {
        // flipping one input bit should flip ~32 of 64 output bits on
        // average; statistical, so assert a generous band
        let mut total = 0u64;
        let mut trials = 0u64;
        for n in [3usize, 12, 24, 48, 100] {
            let base = synth_bytes(n);
            let h0 = fingerprint64(&base);
            for bit in 0..n * 8 {
                let mut flipped = base.clone();
                flipped[bit / 8] ^= 1 << (bit % 8);
                total += (h0 ^ fingerprint64(&flipped)).count_ones() as u64;
                trials += 1;
            }
        }
        let avg = total as f64 / trials as f64;
        assert!((28.0..=36.0).contains(&avg), "avalanche average {}", avg);
    }

    #[test]
    fn test_batch_matches_scalar() {
        let keys: Vec<Vec<u8>> = (0..5000).map(|i| synth_bytes(i % 97)).collect();
        let batch = fingerprint64_batch(&keys);
        assert_eq!(batch.len(), keys.len());
        for (key, fp) in keys.iter().zip(&batch) {
            assert_eq!(*fp, fingerprint64(key));
        }
    }
}
