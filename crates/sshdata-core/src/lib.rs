//! # sshdata-core
//!
//! Wire encoding, algorithm identifiers, and error definitions shared by the
//! `sshdata` crates.
//!
//! ## Modules
//!
//! - [`encoding`] - SSH field encoding ([`Reader`], [`Writer`], typed field lists)
//! - [`signature`] - Algorithm-tagged signature blobs
//! - [`algorithm`] - Algorithm identifiers ([`Algorithm`]) and families ([`Family`])
//! - [`config`] - TOML configuration
//! - [`error`] - Error types and result aliases
//!
//! ## Example
//!
//! ```rust
//! use sshdata_core::{decode_signature, encode_signature, Algorithm};
//!
//! let blob = encode_signature(Algorithm::RsaSha2_256, b"raw signature");
//! let (algo, raw, _) = decode_signature(&blob)?;
//! assert_eq!(algo, Algorithm::RsaSha2_256);
//! assert_eq!(raw, b"raw signature");
//! # Ok::<(), sshdata_core::DecodeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod algorithm;
pub mod config;
pub mod encoding;
pub mod error;
pub mod signature;

pub use algorithm::{Algorithm, Family};
pub use config::{CertificateConfig, Config, ConfigBuilder, GenerationConfig, RegistryConfig};
pub use encoding::{decode, encode_fields, Field, FieldKind, FieldValue, Reader, Writer};
pub use error::{
    AlgorithmError, ConfigError, DecodeError, Error, KeyError, Result, VerifyFailure,
};
pub use signature::{decode_signature, encode_signature, Signature};
