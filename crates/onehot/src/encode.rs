use std::collections::HashMap;

use log::debug;
use ndarray::Array3;

use crate::{NULL_INDEX, PAD_INDEX};

/// One-hot encode a batch of strings over `vocabulary`.
///
/// Returns an array of shape `(strings.len(), max_length, vocabulary.len())`.
/// At each position `i` of each string:
/// - the character at `i` maps to its index in `vocabulary` (first match),
///   or to `NULL_INDEX` when it is not in the vocabulary;
/// - positions past the end of the string map to `PAD_INDEX`;
/// - characters beyond `max_length` are dropped.
///
/// Only single-character vocabulary entries can match, so the reserved
/// token names never collide with input characters.
///
/// Degenerate inputs produce zero-sized axes instead of failing. If the
/// vocabulary is too short to hold the fallback index (fewer than two
/// entries), the affected rows stay all-zero.
pub fn encode_one_hot<S, V>(strings: &[S], vocabulary: &[V], max_length: usize) -> Array3<u8>
where
    S: AsRef<str>,
    V: AsRef<str>,
{
    let mut lookup: HashMap<char, usize> = HashMap::with_capacity(vocabulary.len());
    for (i, token) in vocabulary.iter().enumerate() {
        let mut chars = token.as_ref().chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            lookup.entry(c).or_insert(i);
        }
    }
    encode_with(strings, vocabulary.len(), max_length, |c| {
        lookup.get(&c).copied()
    })
}

/// Shared encoding loop; `lookup` resolves a character to its vocabulary index.
pub(crate) fn encode_with<S, F>(
    strings: &[S],
    vocab_size: usize,
    max_length: usize,
    lookup: F,
) -> Array3<u8>
where
    S: AsRef<str>,
    F: Fn(char) -> Option<usize>,
{
    debug!(
        "one-hot encoding to shape ({}, {}, {})",
        strings.len(),
        max_length,
        vocab_size
    );
    let mut one_hots = Array3::<u8>::zeros((strings.len(), max_length, vocab_size));
    for (mut sample, smiles) in one_hots.outer_iter_mut().zip(strings) {
        // `Chars` is fused: once the string runs out every later position pads
        let mut chars = smiles.as_ref().chars();
        for mut row in sample.outer_iter_mut() {
            let ind = match chars.next() {
                Some(c) => lookup(c).unwrap_or(NULL_INDEX),
                None => PAD_INDEX,
            };
            if let Some(cell) = row.get_mut(ind) {
                *cell = 1;
            }
        }
    }
    one_hots
}
