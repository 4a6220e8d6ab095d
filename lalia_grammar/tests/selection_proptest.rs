// Property-based tests for the resolution selector and interlocking.
//
// These pin the invariants the catalog builders rely on:
// - `reduce()` returns exactly the requested count whenever it has input;
// - every selected resolution comes from the input;
// - interlocking preserves every element and each sequence's order;
// - interlocked padding spreads fillers without touching the original order.

use lalia_grammar::{interlock, pad_interlocked, reduce};
use proptest::prelude::*;

fn resolutions_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..6, 1..6), 1..12)
}

proptest! {
    #[test]
    fn reduce_returns_exact_count(
        resolutions in resolutions_strategy(),
        variation_count in 1usize..20,
        minimal_length in 0usize..6,
    ) {
        let reduced = reduce(resolutions.clone(), variation_count, minimal_length);
        prop_assert_eq!(reduced.len(), variation_count);
        for resolution in &reduced {
            prop_assert!(resolutions.contains(resolution));
        }
    }

    #[test]
    fn reduce_prefers_long_enough_resolutions(
        resolutions in resolutions_strategy(),
        variation_count in 1usize..20,
        minimal_length in 1usize..6,
    ) {
        let any_long = resolutions.iter().any(|r| r.len() >= minimal_length);
        let reduced = reduce(resolutions, variation_count, minimal_length);
        if any_long {
            prop_assert!(reduced.iter().all(|r| r.len() >= minimal_length));
        }
    }

    #[test]
    fn interlock_preserves_elements_and_order(
        sequences in prop::collection::vec(prop::collection::vec(0u32..1000, 0..8), 0..5),
    ) {
        // Tag each element with its sequence and position to check order.
        let tagged: Vec<Vec<(usize, usize)>> = sequences
            .iter()
            .enumerate()
            .map(|(s, seq)| (0..seq.len()).map(|j| (s, j)).collect())
            .collect();
        let slices: Vec<&[(usize, usize)]> = tagged.iter().map(|t| t.as_slice()).collect();
        let merged = interlock(&slices);

        let total: usize = sequences.iter().map(|s| s.len()).sum();
        prop_assert_eq!(merged.len(), total);
        for (s, seq) in sequences.iter().enumerate() {
            let positions: Vec<usize> = merged
                .iter()
                .filter(|(owner, _)| *owner == s)
                .map(|(_, j)| *j)
                .collect();
            prop_assert_eq!(positions, (0..seq.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn padding_keeps_original_subsequence(
        sequence in prop::collection::vec(1u8..50, 0..10),
        extra in 0usize..10,
    ) {
        let length = sequence.len() + extra;
        let padded = pad_interlocked(&sequence, length, 0);
        prop_assert_eq!(padded.len(), length);
        let kept: Vec<u8> = padded.iter().copied().filter(|&x| x != 0).collect();
        prop_assert_eq!(kept, sequence);
    }
}
