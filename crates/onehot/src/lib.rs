#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![deny(missing_docs, unused_must_use)]

//! Character vocabularies and one-hot encoding for SMILES strings.
//!
//! Two pure operations, composed by the caller:
//! - [`build_charset`] derives a vocabulary from a training corpus: the
//!   reserved tokens `NULL` and `PAD` followed by every distinct character
//!   in ascending code-point order.
//! - [`encode_one_hot`] turns a batch of strings into an `Array3<u8>` of shape
//!   `(batch, max_length, vocabulary)`, padding short strings with `PAD`,
//!   truncating long ones and mapping unknown characters to `NULL`.
//!
//! Contract: identical inputs -> identical outputs. Neither operation fails;
//! every edge case has a defined fallback. Errors only come from loading a
//! vocabulary from outside ([`Charset::from_tokens`]) and from decoding
//! tensors that are not one-hot ([`decode_one_hot`]).
//!
//! ```
//! use onehot::{build_charset, encode_one_hot};
//!
//! let charset = build_charset(&["CC1"]);
//! assert_eq!(charset, ["NULL", "PAD", "1", "C"]);
//!
//! let x = encode_one_hot(&["CC1"], &charset, 4);
//! assert_eq!(x.dim(), (1, 4, 4));
//! ```

/// Vocabulary construction and validation.
pub mod charset;
/// Bundled charset + fixed length used at inference time.
pub mod config;
/// Inverse view of an encoded tensor.
pub mod decode;
/// The one-hot encoder.
pub mod encode;

pub use charset::{build_charset, Charset, CharsetError};
pub use config::EncoderConfig;
pub use decode::{decode_one_hot, one_hot_indices, DecodeError};
pub use encode::encode_one_hot;

/// Reserved token at index 0; stands in for out-of-vocabulary characters.
pub const NULL_TOKEN: &str = "NULL";
/// Reserved token at index 1; fills positions past the end of a string.
pub const PAD_TOKEN: &str = "PAD";
/// Index of [`NULL_TOKEN`] in every charset.
pub const NULL_INDEX: usize = 0;
/// Index of [`PAD_TOKEN`] in every charset.
pub const PAD_INDEX: usize = 1;
/// Number of reserved tokens preceding the corpus characters.
pub const RESERVED_TOKENS: usize = 2;
