//! # sshdata
//!
//! Parse, generate, sign and verify SSH public keys, private keys and
//! OpenSSH certificates.
//!
//! Supported key families: RSA (`ssh-rsa`, `rsa-sha2-256`, `rsa-sha2-512`),
//! DSA, ECDSA on P-256/P-384/P-521, Ed25519 and Dilithium5.
//!
//! ## Example
//!
//! ```
//! use sshdata::{Certificate, CertificateOptions, Family, PrivateKey};
//!
//! let ca = PrivateKey::generate(Family::Ed25519)?;
//! let user = PrivateKey::generate(Family::Ed25519)?;
//!
//! let cert = ca.issue_certificate(
//!     user.public_key(),
//!     CertificateOptions::new("some ident").with_principals(["alice"]),
//! )?;
//!
//! // Decoding verifies the CA signature.
//! let parsed = Certificate::decode(&cert.encode())?;
//! assert_eq!(parsed.key_id(), "some ident");
//! assert_eq!(parsed.ca_key(), ca.public_key());
//! assert!(parsed.check_principal("alice").is_ok());
//! # Ok::<(), sshdata::Error>(())
//! ```
//!
//! ## Configuration
//!
//! Which identifiers are enabled, the RSA modulus size and the certificate
//! nonce length come from a [`Config`], usually loaded from TOML and turned
//! into an [`AlgorithmRegistry`]:
//!
//! ```
//! use sshdata::{Algorithm, AlgorithmRegistry, Config};
//!
//! let config = Config::from_toml_str(r#"
//! [registry]
//! algorithms = ["rsa-sha2-256", "rsa-sha2-512", "ssh-ed25519"]
//! "#)?;
//! let registry = AlgorithmRegistry::from_config(&config);
//! assert!(!registry.supports(Algorithm::Rsa));
//! # Ok::<(), sshdata::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod logging;

pub use sshdata_core::{
    config, decode_signature, encode_signature, encoding, error, Algorithm, AlgorithmError,
    CertificateConfig, Config, ConfigBuilder, ConfigError, DecodeError, Error, Family,
    GenerationConfig, KeyError, Reader, RegistryConfig, Result, Signature, VerifyFailure, Writer,
};
pub use sshdata_crypto::{
    certificate, decode_private_keys, decode_private_keys_with, encode_private_keys, material,
    openssh, provider, AlgorithmRegistry, CertOptions, CertType, Certificate, CertificateOptions,
    KeyMaterial, MaterialField, PrivateKey, PublicKey, SecretMaterial, SignatureProvider,
    VerifyMode,
};
