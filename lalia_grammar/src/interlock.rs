// Euclidean interlocking: merge sequences so each one is spread evenly.
//
// Element `j` of a sequence of length `n` has the ideal position
// `(j + 1/2) / n` on the unit interval. The merge repeatedly emits the next
// element, across all sequences, with the smallest ideal position; ties go
// to the sequence listed first. Each sequence keeps its internal order.
//
// Positions are compared exactly by cross-multiplying `(2j + 1) / (2n)`,
// so there is no floating-point tie ambiguity.
//
// Used for symmetric unison padding of pair resolutions and for merging
// consonant and vowel phoneme sequences into words.

/// Merge `sequences` into one, interleaving their elements evenly.
pub fn interlock<T: Clone>(sequences: &[&[T]]) -> Vec<T> {
    let total = sequences.iter().map(|s| s.len()).sum();
    let mut cursors = vec![0usize; sequences.len()];
    let mut merged = Vec::with_capacity(total);

    loop {
        let mut best: Option<usize> = None;
        for (index, sequence) in sequences.iter().enumerate() {
            if cursors[index] >= sequence.len() {
                continue;
            }
            let earlier = match best {
                None => true,
                Some(current) => precedes(
                    (cursors[index], sequence.len()),
                    (cursors[current], sequences[current].len()),
                ),
            };
            if earlier {
                best = Some(index);
            }
        }
        let Some(index) = best else {
            break;
        };
        merged.push(sequences[index][cursors[index]].clone());
        cursors[index] += 1;
    }

    merged
}

/// Pad `sequence` to `length` with `filler`, placing the fillers evenly
/// between the original elements. Returns the sequence unchanged if it is
/// already long enough.
pub fn pad_interlocked<T: Clone>(sequence: &[T], length: usize, filler: T) -> Vec<T> {
    let missing = length.saturating_sub(sequence.len());
    if missing == 0 {
        return sequence.to_vec();
    }
    let fillers = vec![filler; missing];
    interlock(&[sequence, &fillers[..]])
}

/// Whether element `a.0` of a length-`a.1` sequence sits strictly before
/// element `b.0` of a length-`b.1` sequence.
fn precedes(a: (usize, usize), b: (usize, usize)) -> bool {
    let (a_index, a_length) = a;
    let (b_index, b_length) = b;
    (2 * a_index + 1) * b_length < (2 * b_index + 1) * a_length
}
