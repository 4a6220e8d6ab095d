// Resolution selector: trims or pads a candidate list to an exact count.
//
// Candidates are bucketed by length. Buckets at or above `minimal_length`
// are preferred; if none qualify, every bucket is eligible. Buckets are
// consumed shortest first:
// - a bucket smaller than the remaining quota is taken whole;
// - a bucket exactly matching the quota is taken whole and selection stops;
// - a larger bucket is sampled by a least-used rule and selection stops.
//
// Least-used sampling scores each candidate by summing, over its symbols,
// how often that symbol already occurs in the selected resolutions. The
// lowest scores win, ties keep bucket order. The usage counter lives only
// for one `reduce()` call, so repeated calls with the same input always
// return the same output.
//
// If fewer than `variation_count` candidates are eligible, the selection is
// padded by cycling through it from the start. `eligible_count()` reports
// how many distinct candidates a call can draw from.
//
// Generic over the symbol type: the grammar resolver uses it with pitches,
// word generation with phoneme pitches.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Reduce `resolutions` to exactly `variation_count` entries.
///
/// Returns an empty list only when `resolutions` is empty or
/// `variation_count` is zero.
pub fn reduce<S: Clone + Eq + Hash>(
    resolutions: Vec<Vec<S>>,
    variation_count: usize,
    minimal_length: usize,
) -> Vec<Vec<S>> {
    if resolutions.is_empty() || variation_count == 0 {
        return Vec::new();
    }

    let mut buckets: BTreeMap<usize, Vec<Vec<S>>> = BTreeMap::new();
    for resolution in resolutions {
        buckets.entry(resolution.len()).or_default().push(resolution);
    }
    if buckets.keys().any(|&length| length >= minimal_length) {
        buckets.retain(|&length, _| length >= minimal_length);
    }

    let mut selected: Vec<Vec<S>> = Vec::with_capacity(variation_count);
    for bucket in buckets.into_values() {
        let remaining = variation_count - selected.len();
        if remaining > bucket.len() {
            selected.extend(bucket);
        } else if remaining == bucket.len() {
            selected.extend(bucket);
            break;
        } else {
            let picked = least_used(&selected, bucket, remaining);
            selected.extend(picked);
            break;
        }
    }

    pad_cyclic(selected, variation_count)
}

/// Number of candidates `reduce()` selects from: those of at least
/// `minimal_length` symbols, or all of them if none is that long.
pub fn eligible_count<S>(resolutions: &[Vec<S>], minimal_length: usize) -> usize {
    let long_enough = resolutions
        .iter()
        .filter(|resolution| resolution.len() >= minimal_length)
        .count();
    if long_enough > 0 {
        long_enough
    } else {
        resolutions.len()
    }
}

/// Pick `take` candidates whose symbols are least represented in `selected`.
fn least_used<S: Clone + Eq + Hash>(
    selected: &[Vec<S>],
    bucket: Vec<Vec<S>>,
    take: usize,
) -> Vec<Vec<S>> {
    let mut usage: FxHashMap<&S, usize> = FxHashMap::default();
    for symbol in selected.iter().flatten() {
        *usage.entry(symbol).or_insert(0) += 1;
    }
    let scores: Vec<usize> = bucket
        .iter()
        .map(|candidate| {
            candidate
                .iter()
                .map(|symbol| usage.get(symbol).copied().unwrap_or(0))
                .sum()
        })
        .collect();

    let mut scored: Vec<(usize, Vec<S>)> = scores.into_iter().zip(bucket).collect();
    scored.sort_by_key(|(score, _)| *score);
    scored
        .into_iter()
        .take(take)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Repeat `selected` cyclically until it holds `count` entries.
fn pad_cyclic<S: Clone>(mut selected: Vec<Vec<S>>, count: usize) -> Vec<Vec<S>> {
    let original = selected.len();
    if original == 0 {
        return selected;
    }
    for index in 0..count.saturating_sub(original) {
        let repeat = selected[index % original].clone();
        selected.push(repeat);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(items: &[&[u8]]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.to_vec()).collect()
    }

    #[test]
    fn test_whole_buckets_shortest_first() {
        let input = v(&[b"abc", b"a", b"ab", b"ba"]);
        assert_eq!(reduce(input, 3, 1), v(&[b"a", b"ab", b"ba"]));
    }

    #[test]
    fn test_minimal_length_filters_buckets() {
        let input = v(&[b"a", b"ab", b"abc", b"abd"]);
        assert_eq!(reduce(input, 2, 3), v(&[b"abc", b"abd"]));
    }

    #[test]
    fn test_falls_back_when_nothing_is_long_enough() {
        let input = v(&[b"a", b"b"]);
        assert_eq!(reduce(input, 2, 5), v(&[b"a", b"b"]));
    }

    #[test]
    fn test_partial_bucket_prefers_unused_symbols() {
        // "a" is selected from the first bucket; from the length-2 bucket the
        // candidates without 'a' score lowest.
        let input = v(&[b"a", b"ab", b"cd", b"ae", b"fg"]);
        assert_eq!(reduce(input, 3, 1), v(&[b"a", b"cd", b"fg"]));
    }

    #[test]
    fn test_partial_bucket_ties_keep_order() {
        let input = v(&[b"xy", b"zw", b"uv"]);
        assert_eq!(reduce(input, 2, 1), v(&[b"xy", b"zw"]));
    }

    #[test]
    fn test_eligible_count_follows_minimal_length() {
        let input = v(&[b"a", b"ab", b"abc", b"abd"]);
        assert_eq!(eligible_count(&input, 1), 4);
        assert_eq!(eligible_count(&input, 3), 2);
        assert_eq!(eligible_count(&input, 5), 4);
        assert_eq!(eligible_count::<u8>(&[], 1), 0);

        // Only the two long candidates are drawn from, so the third repeats.
        let reduced = reduce(input, 3, 3);
        assert_eq!(reduced, v(&[b"abc", b"abd", b"abc"]));
    }

    #[test]
    fn test_pads_cyclically() {
        let input = v(&[b"a", b"bc"]);
        assert_eq!(reduce(input, 5, 1), v(&[b"a", b"bc", b"a", b"bc", b"a"]));
    }

    #[test]
    fn test_empty_input_or_zero_count() {
        assert!(reduce(Vec::<Vec<u8>>::new(), 3, 1).is_empty());
        assert!(reduce(v(&[b"a"]), 0, 1).is_empty());
    }

    #[test]
    fn test_reduce_is_repeatable() {
        let input = v(&[b"ab", b"ba", b"aa", b"bb", b"abc"]);
        let first = reduce(input.clone(), 3, 2);
        let second = reduce(input, 3, 2);
        assert_eq!(first, second);
    }
}
