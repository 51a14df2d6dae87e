//! Hashing utilities.

#![forbid(unsafe_code)]

use std::hash::{Hash, Hasher};

use crate::core::collections::FastHasher;

/// Applies a stable hash function to a slice of sorted u64 values.
///
/// This function uses an FNV-based polynomial rolling hash with an avalanche step
/// to produce deterministic hash values. The input slice should be pre-sorted to ensure
/// consistent results regardless of input order.
///
/// # Examples
///
/// ```
/// use tetmesh::core::util::stable_hash_u64_slice;
/// let values = vec![1u64, 2u64, 3u64];
/// let hash1 = stable_hash_u64_slice(&values);
///
/// let mut reversed = values.clone();
/// reversed.reverse();
/// let hash2 = stable_hash_u64_slice(&reversed);
///
/// // Different order produces different hash (input should be pre-sorted)
/// assert_ne!(hash1, hash2);
/// ```
#[must_use]
pub fn stable_hash_u64_slice(sorted_values: &[u64]) -> u64 {
    // Hash constants (FNV-based)
    const HASH_PRIME: u64 = 1_099_511_628_211;
    const HASH_OFFSET: u64 = 14_695_981_039_346_656_037;

    if sorted_values.is_empty() {
        return 0;
    }

    let mut hash = HASH_OFFSET;
    for &value in sorted_values {
        hash = hash.wrapping_mul(HASH_PRIME).wrapping_add(value);
    }

    // Avalanche step for better bit distribution
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    hash ^= hash >> 33;

    hash
}

/// Hashes a single vertex reference with [`FastHasher`].
#[inline]
#[must_use]
pub fn vertex_hash<V: Hash>(vertex: &V) -> u64 {
    let mut hasher = FastHasher::default();
    vertex.hash(&mut hasher);
    hasher.finish()
}

/// Orientation-aware hash of an ordered simplex given its per-vertex hashes.
///
/// The values are sorted and the parity of the sorting permutation is folded into
/// the result, so every even permutation of the input (the rotations of a triangle,
/// the 12 proper relabellings of a tetrahedron) hashes identically while the odd
/// permutations usually do not. When two vertex hashes tie the parity is not
/// well defined and is dropped; the hash then only depends on the multiset, which
/// is still consistent with orientation-aware equality.
///
/// # Examples
///
/// ```
/// use tetmesh::core::util::oriented_hash;
///
/// assert_eq!(oriented_hash([1, 2, 3]), oriented_hash([2, 3, 1]));
/// assert_ne!(oriented_hash([1, 2, 3]), oriented_hash([1, 3, 2]));
/// assert_eq!(oriented_hash([7, 7, 3]), oriented_hash([7, 3, 7]));
/// ```
#[must_use]
pub fn oriented_hash<const N: usize>(mut values: [u64; N]) -> u64 {
    let mut swaps = 0usize;
    for i in 1..N {
        let mut j = i;
        while j > 0 && values[j - 1] > values[j] {
            values.swap(j - 1, j);
            swaps += 1;
            j -= 1;
        }
    }

    let hash = stable_hash_u64_slice(&values);
    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    if distinct && swaps % 2 == 1 {
        !hash
    } else {
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_hash_u64_slice_comprehensive() {
        let values = vec![1u64, 2u64, 3u64];
        let hash1 = stable_hash_u64_slice(&values);

        let mut reversed = values.clone();
        reversed.reverse();
        let hash2 = stable_hash_u64_slice(&reversed);
        assert_ne!(
            hash1, hash2,
            "Different order should produce different hash"
        );

        let mut sorted1 = values;
        sorted1.sort_unstable();
        let mut sorted2 = reversed;
        sorted2.sort_unstable();
        assert_eq!(
            stable_hash_u64_slice(&sorted1),
            stable_hash_u64_slice(&sorted2),
            "Same sorted input should produce same hash"
        );

        let empty: Vec<u64> = vec![];
        assert_eq!(stable_hash_u64_slice(&empty), 0);

        let short = vec![1u64, 2u64];
        let long = vec![1u64, 2u64, 3u64];
        assert_ne!(
            stable_hash_u64_slice(&short),
            stable_hash_u64_slice(&long),
            "Different lengths should produce different hashes"
        );
    }

    #[test]
    fn test_oriented_hash_even_permutations_agree() {
        let base = oriented_hash([10, 20, 30, 40]);
        for perm in [
            [20, 10, 40, 30],
            [30, 40, 10, 20],
            [40, 30, 20, 10],
            [10, 30, 40, 20],
            [10, 40, 20, 30],
        ] {
            assert_eq!(oriented_hash(perm), base, "even permutation {perm:?}");
        }
    }

    #[test]
    fn test_oriented_hash_odd_permutations_differ() {
        let base = oriented_hash([10, 20, 30, 40]);
        for perm in [[20, 10, 30, 40], [10, 20, 40, 30], [40, 20, 30, 10]] {
            assert_ne!(oriented_hash(perm), base, "odd permutation {perm:?}");
        }
    }

    #[test]
    fn test_oriented_hash_ties_ignore_parity() {
        assert_eq!(oriented_hash([5, 5, 9]), oriented_hash([5, 9, 5]));
        assert_eq!(oriented_hash([5, 5, 9]), oriented_hash([9, 5, 5]));
        assert_eq!(oriented_hash([1, 1, 1, 2]), oriented_hash([1, 2, 1, 1]));
    }

    #[test]
    fn test_vertex_hash_is_deterministic() {
        assert_eq!(vertex_hash(&42usize), vertex_hash(&42usize));
        assert_ne!(vertex_hash(&42usize), vertex_hash(&43usize));
    }
}
