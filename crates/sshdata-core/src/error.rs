//! Error types for sshdata.
//!
//! Errors are organized by domain:
//!
//! - [`DecodeError`] - Malformed or truncated wire data
//! - [`AlgorithmError`] - An operation named an algorithm that does not apply
//! - [`KeyError`] - Key material and provider failures
//! - [`ConfigError`] - Configuration failures
//! - [`VerifyFailure`] - Why a certificate did not verify (a result, not a misuse)
//! - [`Error`] - Top-level error that wraps all of the above
//!
//! # Example
//!
//! ```rust
//! use sshdata_core::error::{DecodeError, Error};
//!
//! fn parse(data: &[u8]) -> Result<(), Error> {
//!     if data.len() < 4 {
//!         return Err(DecodeError::truncated(4, data.len()).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(parse(&[0, 0]), Err(Error::Decode(_))));
//! ```

use crate::algorithm::{Algorithm, Family};

/// Result type using the top-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for sshdata.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bytes could not be parsed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An algorithm identifier was used outside of where it applies.
    #[error("algorithm error: {0}")]
    Algorithm(#[from] AlgorithmError),

    /// A key operation failed.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A certificate failed verification while being decoded.
    #[error("verification failed: {0}")]
    Verification(#[from] VerifyFailure),
}

impl Error {
    /// Returns `true` if this is a [`DecodeError`].
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Returns `true` if this is an [`AlgorithmError`].
    #[must_use]
    pub const fn is_algorithm(&self) -> bool {
        matches!(self, Self::Algorithm(_))
    }
}

// ============================================================================
// DecodeError
// ============================================================================

/// Errors raised while parsing wire-encoded data.
///
/// Decoding never recovers partially: the first problem is surfaced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before a field was complete.
    #[error("truncated data: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes required to finish the field.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Bytes remained after a structure that must consume its whole input.
    #[error("{count} unexpected trailing bytes")]
    TrailingBytes {
        /// Number of unread bytes.
        count: usize,
    },

    /// A string field was not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A multi-precision integer had its sign bit set.
    #[error("negative mpint where a non-negative value was required")]
    NegativeMpint,

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    /// An algorithm or key-type name is not known.
    #[error("unknown algorithm: {name}")]
    UnknownAlgorithm {
        /// The name that was found on the wire.
        name: String,
    },

    /// The structure is well-framed but semantically invalid.
    #[error("malformed data: {context}")]
    Malformed {
        /// What was malformed.
        context: String,
    },
}

impl DecodeError {
    /// Create a `Truncated` error.
    #[must_use]
    pub const fn truncated(needed: usize, remaining: usize) -> Self {
        Self::Truncated { needed, remaining }
    }

    /// Create an `UnknownAlgorithm` error.
    #[must_use]
    pub fn unknown_algorithm(name: impl Into<String>) -> Self {
        Self::UnknownAlgorithm { name: name.into() }
    }

    /// Create a `Malformed` error with context.
    #[must_use]
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
        }
    }
}

// ============================================================================
// AlgorithmError
// ============================================================================

/// Errors raised when an operation names an algorithm that does not apply.
///
/// These are caller mistakes, distinct from "the bytes are unparseable"
/// ([`DecodeError`]) and from "the signature is wrong" (a `false` result).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    /// The identifier has no registered provider or is disabled.
    #[error("algorithm not registered: {algorithm}")]
    Unregistered {
        /// The identifier that was resolved.
        algorithm: Algorithm,
    },

    /// The identifier does not belong to the key's family.
    #[error("algorithm {algorithm} is outside the {family} family")]
    FamilyMismatch {
        /// The family of the key.
        family: Family,
        /// The identifier that was requested.
        algorithm: Algorithm,
    },
}

impl AlgorithmError {
    /// Create an `Unregistered` error.
    #[must_use]
    pub const fn unregistered(algorithm: Algorithm) -> Self {
        Self::Unregistered { algorithm }
    }

    /// Create a `FamilyMismatch` error.
    #[must_use]
    pub const fn family_mismatch(family: Family, algorithm: Algorithm) -> Self {
        Self::FamilyMismatch { family, algorithm }
    }
}

// ============================================================================
// KeyError
// ============================================================================

/// Errors raised by key operations and capability providers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The private key was released and can no longer be used.
    #[error("private key has been released")]
    Released,

    /// The key material does not describe a valid key.
    #[error("invalid key material: {context}")]
    InvalidMaterial {
        /// Why the material was rejected.
        context: String,
    },

    /// The provider failed to produce a signature.
    #[error("signing failed: {context}")]
    SigningFailed {
        /// Provider context.
        context: String,
    },
}

impl KeyError {
    /// Create an `InvalidMaterial` error with context.
    #[must_use]
    pub fn invalid_material(context: impl Into<String>) -> Self {
        Self::InvalidMaterial {
            context: context.into(),
        }
    }

    /// Create a `SigningFailed` error with context.
    #[must_use]
    pub fn signing_failed(context: impl Into<String>) -> Self {
        Self::SigningFailed {
            context: context.into(),
        }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range or inconsistent.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create an `Invalid` error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// VerifyFailure
// ============================================================================

/// Why a certificate was not accepted.
///
/// Verification of untrusted input fails routinely, so this is returned as a
/// value rather than treated as a programming error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyFailure {
    /// The signature's algorithm is not in the CA key's family.
    #[error("signature algorithm {signature} does not match CA key algorithm {ca_key}")]
    AlgorithmMismatch {
        /// Identifier found in the signature blob.
        signature: Algorithm,
        /// Identifier of the CA key.
        ca_key: Algorithm,
    },

    /// The signature identifier is disabled in the registry.
    #[error("signature algorithm {0} is not enabled")]
    UnsupportedAlgorithm(Algorithm),

    /// The signature blob could not be parsed.
    #[error("signature blob is malformed")]
    MalformedSignature,

    /// The signature does not verify under the CA key.
    #[error("signature is invalid")]
    BadSignature,

    /// The CA key was rejected by the trust predicate.
    #[error("certificate authority is not trusted")]
    UntrustedCa,

    /// The current time is before valid-after.
    #[error("certificate is not valid before {valid_after}")]
    NotYetValid {
        /// Seconds since the Unix epoch.
        valid_after: u64,
    },

    /// The current time is at or after valid-before.
    #[error("certificate expired at {valid_before}")]
    Expired {
        /// Seconds since the Unix epoch.
        valid_before: u64,
    },

    /// The principal is not listed in the certificate.
    #[error("principal not allowed: {0}")]
    PrincipalNotAllowed(String),

    /// A critical option is not understood by the relying party.
    #[error("unrecognized critical option: {0}")]
    UnrecognizedCriticalOption(String),
}
