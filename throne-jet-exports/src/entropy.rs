// Copyright (c) 2022 Throne Contributors

//! Deterministic selection of values by entropy, used by the jet
//! coordinator to pick the executor and heavy custodian for a pulse.
//! The hashing itself is treated as opaque (cryptographic design is out of
//! scope); any stable, collision-resistant mixing function can be plugged
//! in through the `hasher` argument.

/// Deterministically selects `count` values out of `values` by hashing
/// `entropy || value` for each candidate and keeping the ones with the
/// lexicographically smallest hash. Ties are broken by the stable sort
/// keeping the original relative order, matching the platform convention
/// that hashes already include enough entropy that true ties do not occur
/// in practice.
pub fn select_by_entropy<'a, H>(
    entropy: &[u8],
    values: &'a [Vec<u8>],
    count: usize,
    hasher: H,
) -> Option<Vec<&'a [u8]>>
where
    H: Fn(&[u8]) -> Vec<u8>,
{
    if values.len() < count {
        return None;
    }

    let mut hashed: Vec<(usize, Vec<u8>)> = values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let mut input = Vec::with_capacity(entropy.len() + value.len());
            input.extend_from_slice(entropy);
            input.extend_from_slice(value);
            (idx, hasher(&input))
        })
        .collect();

    hashed.sort_by(|a, b| a.1.cmp(&b.1));

    Some(
        hashed[..count]
            .iter()
            .map(|(idx, _)| values[*idx].as_slice())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fnv1a(input: &[u8]) -> Vec<u8> {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for &byte in input {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash.to_be_bytes().to_vec()
    }

    #[test]
    fn deterministic_across_repeated_calls() {
        let values = vec![b"alice".to_vec(), b"bob".to_vec(), b"carol".to_vec()];
        let first = select_by_entropy(b"entropy-42", &values, 1, fnv1a);
        let second = select_by_entropy(b"entropy-42", &values, 1, fnv1a);
        assert_eq!(first, second);
    }

    #[test]
    fn stable_under_input_permutation() {
        let values = vec![b"alice".to_vec(), b"bob".to_vec(), b"carol".to_vec()];
        let mut permuted = values.clone();
        permuted.reverse();

        let selected_original = select_by_entropy(b"entropy-42", &values, 1, fnv1a).unwrap();
        let selected_permuted = select_by_entropy(b"entropy-42", &permuted, 1, fnv1a).unwrap();
        assert_eq!(selected_original, selected_permuted);
    }

    #[test]
    fn none_when_count_exceeds_population() {
        let values = vec![b"alice".to_vec()];
        assert_eq!(select_by_entropy(b"entropy", &values, 2, fnv1a), None);
    }
}
