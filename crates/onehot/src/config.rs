use ndarray::{Array3, ArrayBase, Data, Ix3};
use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::decode::DecodeError;

/// Everything needed to encode at inference time exactly as during training.
///
/// Serializes as `{"charset": [...], "max_length": N}`; the charset is
/// validated on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// vocabulary shared by training and inference
    pub charset: Charset,
    /// fixed number of positions per encoded string
    pub max_length: usize,
}

impl EncoderConfig {
    /// Pair an existing charset with a fixed length.
    pub fn new(charset: Charset, max_length: usize) -> Self {
        Self {
            charset,
            max_length,
        }
    }

    /// Build the charset from a training corpus.
    pub fn fit<S: AsRef<str>>(corpus: &[S], max_length: usize) -> Self {
        Self::new(Charset::build(corpus), max_length)
    }

    /// Output shape for a batch of `batch` strings.
    pub fn shape(&self, batch: usize) -> (usize, usize, usize) {
        (batch, self.max_length, self.charset.size())
    }

    /// One-hot encode `strings`.
    pub fn encode<S: AsRef<str>>(&self, strings: &[S]) -> Array3<u8> {
        self.charset.encode(strings, self.max_length)
    }

    /// Decode a tensor produced by [`EncoderConfig::encode`].
    pub fn decode<D>(&self, tensor: &ArrayBase<D, Ix3>) -> Result<Vec<String>, DecodeError>
    where
        D: Data<Elem = u8>,
    {
        self.charset.decode(tensor)
    }
}
