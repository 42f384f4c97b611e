use ndarray::{Array2, ArrayBase, ArrayView1, Data, Ix3};

use crate::{NULL_INDEX, PAD_INDEX};

/// Rendered in place of `NULL` positions by [`decode_one_hot`].
pub const NULL_CHAR: char = char::REPLACEMENT_CHARACTER;

/// Reasons a tensor cannot be decoded.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The charset axis and the vocabulary disagree in length
    #[error("tensor has {found} vocabulary columns, vocabulary has {expected} tokens")]
    VocabularyMismatch {
        /// vocabulary length
        expected: usize,
        /// size of the tensor's last axis
        found: usize,
    },
    /// A row does not hold exactly one 1 among 0s
    #[error("row at sample {sample}, position {position} is not one-hot")]
    NotOneHot {
        /// batch index
        sample: usize,
        /// position index
        position: usize,
    },
}

fn hot_index(row: ArrayView1<'_, u8>) -> Option<usize> {
    let mut hot = None;
    for (i, &v) in row.iter().enumerate() {
        match v {
            0 => {}
            1 if hot.is_none() => hot = Some(i),
            _ => return None,
        }
    }
    hot
}

/// Index of the active entry at every `(sample, position)`.
pub fn one_hot_indices<D>(tensor: &ArrayBase<D, Ix3>) -> Result<Array2<usize>, DecodeError>
where
    D: Data<Elem = u8>,
{
    let (batch, length, _) = tensor.dim();
    let mut indices = Array2::zeros((batch, length));
    for (sample, (src, mut dst)) in tensor
        .outer_iter()
        .zip(indices.outer_iter_mut())
        .enumerate()
    {
        for (position, (row, slot)) in src.outer_iter().zip(dst.iter_mut()).enumerate() {
            *slot = hot_index(row).ok_or(DecodeError::NotOneHot { sample, position })?;
        }
    }
    Ok(indices)
}

/// Turn an encoded tensor back into strings.
///
/// `PAD` positions are dropped, `NULL` positions become [`NULL_CHAR`] and
/// every other index becomes its vocabulary token. Truncated characters are
/// gone for good, and out-of-vocabulary characters cannot be recovered.
pub fn decode_one_hot<D, V>(
    tensor: &ArrayBase<D, Ix3>,
    vocabulary: &[V],
) -> Result<Vec<String>, DecodeError>
where
    D: Data<Elem = u8>,
    V: AsRef<str>,
{
    let (_, _, width) = tensor.dim();
    if width != vocabulary.len() {
        return Err(DecodeError::VocabularyMismatch {
            expected: vocabulary.len(),
            found: width,
        });
    }
    let indices = one_hot_indices(tensor)?;
    let decoded = indices
        .outer_iter()
        .map(|sample| {
            let mut s = String::with_capacity(sample.len());
            for &ind in sample.iter() {
                match ind {
                    PAD_INDEX => {}
                    NULL_INDEX => s.push(NULL_CHAR),
                    _ => {
                        if let Some(token) = vocabulary.get(ind) {
                            s.push_str(token.as_ref());
                        }
                    }
                }
            }
            s
        })
        .collect();
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_charset, encode_one_hot, Charset};
    use ndarray::{array, Array3};

    #[test]
    fn decodes_padded_batch() {
        let charset = build_charset(&["CC1", "N"]);
        let x = encode_one_hot(&["CC1", "N"], &charset, 5);
        assert_eq!(decode_one_hot(&x, &charset), Ok(vec!["CC1".to_string(), "N".to_string()]));
    }

    #[test]
    fn indices_per_position() {
        let charset = Charset::build(&["CC1"]);
        let x = charset.encode(&["CC1"], 4);
        assert_eq!(one_hot_indices(&x), Ok(array![[3, 3, 2, 1]]));
    }

    #[test]
    fn null_positions_render_as_replacement() {
        let charset = Charset::build(&["CO"]);
        let x = charset.encode(&["CNO"], 3);
        assert_eq!(charset.decode(&x), Ok(vec!["C\u{FFFD}O".to_string()]));
    }

    #[test]
    fn decode_after_truncation_keeps_prefix() {
        let charset = Charset::build(&["CCO"]);
        let x = charset.encode(&["CCOCC"], 2);
        assert_eq!(charset.decode(&x.view()), Ok(vec!["CC".to_string()]));
    }

    #[test]
    fn rejects_vocabulary_mismatch() {
        let x = encode_one_hot(&["C"], &["NULL", "PAD", "C"], 1);
        assert_eq!(
            decode_one_hot(&x, &["NULL", "PAD"]),
            Err(DecodeError::VocabularyMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn rejects_rows_that_are_not_one_hot() {
        let x: Array3<u8> = array![[[0, 0, 1], [0, 1, 1]]];
        assert_eq!(
            one_hot_indices(&x),
            Err(DecodeError::NotOneHot {
                sample: 0,
                position: 1
            })
        );

        let empty_row: Array3<u8> = array![[[0, 0, 0]]];
        assert_eq!(
            one_hot_indices(&empty_row),
            Err(DecodeError::NotOneHot {
                sample: 0,
                position: 0
            })
        );

        let not_binary: Array3<u8> = array![[[2, 0, 0]]];
        assert!(one_hot_indices(&not_binary).is_err());
    }

    #[test]
    fn empty_batch_decodes_to_nothing() {
        let x = Array3::<u8>::zeros((0, 4, 3));
        assert_eq!(decode_one_hot(&x, &["NULL", "PAD", "C"]), Ok(Vec::new()));
    }
}
