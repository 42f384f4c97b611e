use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};
use ndarray::{Array3, ArrayBase, Data, Ix3};
use serde::{Deserialize, Serialize};

use crate::decode::{decode_one_hot, DecodeError};
use crate::encode::encode_with;
use crate::{NULL_TOKEN, PAD_TOKEN, RESERVED_TOKENS};

/// Build a vocabulary from a corpus.
///
/// Every string is split into characters, so the corpus may be whole SMILES
/// strings or already-tokenized single characters (`["c", "c", "1"]` and
/// `["cc1"]` give the same result). The output is `NULL`, `PAD`, then each
/// distinct character once, in ascending code-point order. An empty corpus
/// yields just the two reserved tokens.
pub fn build_charset<S: AsRef<str>>(strings: &[S]) -> Vec<String> {
    let unique: BTreeSet<char> = strings.iter().flat_map(|s| s.as_ref().chars()).collect();
    let mut charset = Vec::with_capacity(RESERVED_TOKENS + unique.len());
    charset.push(NULL_TOKEN.to_string());
    charset.push(PAD_TOKEN.to_string());
    charset.extend(unique.into_iter().map(String::from));
    debug!(
        "built charset of {} tokens from {} strings",
        charset.len(),
        strings.len()
    );
    charset
}

/// Reasons a token list is not a valid charset.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CharsetError {
    /// One of the two leading reserved tokens is missing or misplaced
    #[error("expected reserved token {expected:?} at position {position}, found {found:?}")]
    MissingReserved {
        /// index that should hold the reserved token
        position: usize,
        /// the reserved token required there
        expected: &'static str,
        /// what was actually there, if anything
        found: Option<String>,
    },
    /// A non-reserved entry is empty or longer than one character
    #[error("token {token:?} at position {position} is not a single character")]
    MultiCharToken {
        /// index of the offending entry
        position: usize,
        /// the offending entry
        token: String,
    },
    /// The same character appears twice
    #[error("duplicate token {token:?}")]
    Duplicate {
        /// the repeated entry
        token: String,
    },
    /// Characters are not in ascending code-point order
    #[error("token at position {position} is out of order")]
    Unsorted {
        /// index of the first entry smaller than its predecessor
        position: usize,
    },
}

/// A validated vocabulary with a character index.
///
/// Serializes as the plain token list, e.g. `["NULL","PAD","1","C"]`, and
/// deserializes through [`Charset::from_tokens`], so a charset saved during
/// training reloads with the same index for every character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Charset {
    tokens: Vec<String>,
    index: HashMap<char, usize>,
}

impl Charset {
    /// Build a charset from a training corpus. See [`build_charset`].
    pub fn build<S: AsRef<str>>(corpus: &[S]) -> Self {
        let tokens = build_charset(corpus);
        let index = tokens
            .iter()
            .skip(RESERVED_TOKENS)
            .zip(RESERVED_TOKENS..)
            .filter_map(|(token, i)| token.chars().next().map(|c| (c, i)))
            .collect();
        Self { tokens, index }
    }

    /// Validate a token list produced elsewhere (a saved vocabulary, another tool).
    ///
    /// The list must start with `NULL`, `PAD` and continue with distinct
    /// single characters in ascending order, which is exactly the shape
    /// [`build_charset`] produces.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self, CharsetError> {
        for (position, expected) in [NULL_TOKEN, PAD_TOKEN].into_iter().enumerate() {
            let found = tokens.get(position);
            if found.map(String::as_str) != Some(expected) {
                return Err(CharsetError::MissingReserved {
                    position,
                    expected,
                    found: found.cloned(),
                });
            }
        }

        let mut index = HashMap::with_capacity(tokens.len().saturating_sub(RESERVED_TOKENS));
        let mut prev: Option<char> = None;
        for (position, token) in tokens.iter().enumerate().skip(RESERVED_TOKENS) {
            let mut chars = token.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(CharsetError::MultiCharToken {
                        position,
                        token: token.clone(),
                    })
                }
            };
            if index.insert(c, position).is_some() {
                return Err(CharsetError::Duplicate {
                    token: token.clone(),
                });
            }
            if prev.is_some_and(|p| p > c) {
                return Err(CharsetError::Unsorted { position });
            }
            prev = Some(c);
        }
        trace!("validated charset of {} tokens", tokens.len());
        Ok(Self { tokens, index })
    }

    /// The ordered tokens, reserved tokens first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Consume the charset and return its tokens.
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Number of tokens, reserved ones included. Always at least 2.
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Index of `c`, or `None` when it is out of vocabulary.
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.index.get(&c).copied()
    }

    /// One-hot encode `strings` at `max_length`. Same result as
    /// [`encode_one_hot`](crate::encode_one_hot) over [`Charset::tokens`].
    pub fn encode<S: AsRef<str>>(&self, strings: &[S], max_length: usize) -> Array3<u8> {
        encode_with(strings, self.size(), max_length, |c| self.index_of(c))
    }

    /// Decode a tensor produced by [`Charset::encode`]. See [`decode_one_hot`].
    pub fn decode<D>(&self, tensor: &ArrayBase<D, Ix3>) -> Result<Vec<String>, DecodeError>
    where
        D: Data<Elem = u8>,
    {
        decode_one_hot(tensor, &self.tokens)
    }
}

impl AsRef<[String]> for Charset {
    fn as_ref(&self) -> &[String] {
        &self.tokens
    }
}

impl TryFrom<Vec<String>> for Charset {
    type Error = CharsetError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_tokens(tokens)
    }
}

impl From<Charset> for Vec<String> {
    fn from(charset: Charset) -> Self {
        charset.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn charset_from_single_smiles() {
        // '1' (0x31) sorts before 'C' (0x43)
        assert_eq!(build_charset(&["CC1"]), ["NULL", "PAD", "1", "C"]);
    }

    #[test]
    fn empty_corpus_has_only_reserved_tokens() {
        let empty: [&str; 0] = [];
        assert_eq!(build_charset(&empty), ["NULL", "PAD"]);
        assert_eq!(Charset::build(&empty).size(), 2);
    }

    #[test]
    fn tokenized_and_plain_corpus_agree() {
        let split = build_charset(&["c", "c", "1"]);
        let plain = build_charset(&["cc1"]);
        assert_eq!(split, plain);
        assert_eq!(plain, ["NULL", "PAD", "1", "c"]);
    }

    #[test]
    fn corpus_characters_sorted_by_code_point() {
        let charset = build_charset(&["c1ccccc1O", "[Na+].[Cl-]", "C(=O)N"]);
        let expected = owned(&[
            "NULL", "PAD", "(", ")", "+", "-", ".", "1", "=", "C", "N", "O", "[", "]", "a", "c",
            "l",
        ]);
        assert_eq!(charset, expected);
    }

    #[test]
    fn non_ascii_characters_follow_ascii() {
        let charset = build_charset(&["Cé", "α"]);
        assert_eq!(charset, ["NULL", "PAD", "C", "é", "α"]);
    }

    #[test]
    fn built_charset_indexes_characters() {
        let charset = Charset::build(&["CC1"]);
        assert_eq!(charset.index_of('C'), Some(3));
        assert_eq!(charset.index_of('1'), Some(2));
        assert_eq!(charset.index_of('N'), None);
        assert_eq!(Charset::from_tokens(charset.tokens().to_vec()), Ok(charset));
    }

    #[test]
    fn from_tokens_requires_reserved_prefix() {
        assert_eq!(
            Charset::from_tokens(owned(&["PAD", "NULL", "C"])),
            Err(CharsetError::MissingReserved {
                position: 0,
                expected: "NULL",
                found: Some("PAD".to_string()),
            })
        );
        assert_eq!(
            Charset::from_tokens(owned(&["NULL"])),
            Err(CharsetError::MissingReserved {
                position: 1,
                expected: "PAD",
                found: None,
            })
        );
    }

    #[test]
    fn from_tokens_rejects_malformed_entries() {
        assert_eq!(
            Charset::from_tokens(owned(&["NULL", "PAD", "Cl"])),
            Err(CharsetError::MultiCharToken {
                position: 2,
                token: "Cl".to_string(),
            })
        );
        assert_eq!(
            Charset::from_tokens(owned(&["NULL", "PAD", ""])),
            Err(CharsetError::MultiCharToken {
                position: 2,
                token: String::new(),
            })
        );
        assert_eq!(
            Charset::from_tokens(owned(&["NULL", "PAD", "C", "C"])),
            Err(CharsetError::Duplicate {
                token: "C".to_string(),
            })
        );
        assert_eq!(
            Charset::from_tokens(owned(&["NULL", "PAD", "C", "1"])),
            Err(CharsetError::Unsorted { position: 3 })
        );
    }

    #[test]
    fn serializes_as_token_list() {
        let charset = Charset::build(&["CC1"]);
        let json = serde_json::to_string(&charset).unwrap();
        assert_eq!(json, r#"["NULL","PAD","1","C"]"#);
        let back: Charset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, charset);
    }

    #[test]
    fn deserialization_validates_tokens() {
        let err = serde_json::from_str::<Charset>(r#"["NULL","PAD","C","1"]"#).unwrap_err();
        assert!(err.to_string().contains("out of order"), "{err}");
    }
}
