//! # sshdata-crypto
//!
//! SSH keys, signatures and certificates for `sshdata`.
//!
//! ## Modules
//!
//! - [`material`] - Key material containers with secure memory handling
//! - [`provider`] - Per-family signature providers (RSA, DSA, ECDSA, Ed25519, Dilithium5)
//! - [`registry`] - Runtime provider lookup and enabled identifiers
//! - [`public_key`] - Public key parsing, encoding and verification
//! - [`private_key`] - Private key generation, signing and release
//! - [`certificate`] - OpenSSH certificate issuance, parsing and verification
//! - [`openssh`] - Unencrypted `openssh-key-v1` containers
//!
//! ## Security
//!
//! - No unsafe code allowed
//! - Secret material is zeroized on release and drop
//! - Secret material is compared in constant time
//! - Debug output of private keys is redacted

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod certificate;
pub mod material;
pub mod openssh;
pub mod private_key;
pub mod provider;
pub mod public_key;
pub mod registry;

pub use certificate::{CertOptions, CertType, Certificate, CertificateOptions, VerifyMode};
pub use material::{KeyMaterial, SecretMaterial};
pub use openssh::{decode_private_keys, decode_private_keys_with, encode_private_keys};
pub use private_key::PrivateKey;
pub use provider::{MaterialField, SignatureProvider};
pub use public_key::PublicKey;
pub use registry::AlgorithmRegistry;
