//! Algorithm-tagged signature blobs.
//!
//! Every SSH signature, whatever produced it, travels as
//! `[string algorithm-name][string raw-signature]`. The raw bytes are opaque
//! at this layer; only the capability provider for the algorithm interprets
//! them.

use crate::algorithm::Algorithm;
use crate::encoding::{Reader, Writer};
use crate::error::DecodeError;

/// Encode a signature blob.
///
/// ```
/// use sshdata_core::algorithm::Algorithm;
/// use sshdata_core::signature::{decode_signature, encode_signature};
///
/// let blob = encode_signature(Algorithm::Ed25519, &[0xaa; 64]);
/// let (algo, raw, rest) = decode_signature(&blob).unwrap();
/// assert_eq!(algo, Algorithm::Ed25519);
/// assert_eq!(raw, vec![0xaa; 64]);
/// assert!(rest.is_empty());
/// ```
#[must_use]
pub fn encode_signature(algorithm: Algorithm, raw: &[u8]) -> Vec<u8> {
    let mut writer = Writer::with_capacity(8 + algorithm.as_str().len() + raw.len());
    writer.string(algorithm.as_str()).bytes(raw);
    writer.into_bytes()
}

/// Decode a signature blob from the front of `bytes`.
///
/// Returns the algorithm, the raw signature bytes and whatever followed the
/// blob.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownAlgorithm`] for unrecognized names and
/// [`DecodeError::Truncated`] if the blob is cut short.
pub fn decode_signature(bytes: &[u8]) -> Result<(Algorithm, Vec<u8>, &[u8]), DecodeError> {
    let mut reader = Reader::new(bytes);
    let algorithm = reader.read_string()?.parse::<Algorithm>()?;
    let raw = reader.read_bytes()?.to_vec();
    Ok((algorithm, raw, reader.remaining()))
}

/// A decoded signature value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    algorithm: Algorithm,
    raw: Vec<u8>,
}

impl Signature {
    /// Pair an algorithm with raw signature bytes.
    #[must_use]
    pub const fn new(algorithm: Algorithm, raw: Vec<u8>) -> Self {
        Self { algorithm, raw }
    }

    /// Parse a complete signature blob.
    ///
    /// # Errors
    ///
    /// As [`decode_signature`], plus [`DecodeError::TrailingBytes`] if
    /// anything follows the blob.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (algorithm, raw, rest) = decode_signature(bytes)?;
        Reader::new(rest).finish()?;
        Ok(Self { algorithm, raw })
    }

    /// Encode as a signature blob.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        encode_signature(self.algorithm, &self.raw)
    }

    /// The algorithm that produced the signature.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The raw, algorithm-specific signature bytes.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}
