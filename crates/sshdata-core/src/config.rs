//! Configuration types for sshdata.
//!
//! The configuration decides which algorithm identifiers the registry
//! enables, the parameters used when generating keys, and how certificates
//! are issued.
//!
//! # Examples
//!
//! ```
//! use sshdata_core::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.generation.rsa_bits, 2048);
//! assert_eq!(config.certificates.nonce_len, 32);
//!
//! let toml_str = Config::default_toml();
//! let parsed = Config::from_toml_str(&toml_str).unwrap();
//! assert_eq!(parsed, config);
//! ```
//!
//! # Default TOML Output
//!
//! ```toml
//! [registry]
//! algorithms = ["ssh-rsa", "rsa-sha2-256", "rsa-sha2-512", "ssh-dss",
//!               "ecdsa-sha2-nistp256", "ecdsa-sha2-nistp384",
//!               "ecdsa-sha2-nistp521", "ssh-ed25519", "ssh-dilithium5"]
//!
//! [generation]
//! rsa_bits = 2048
//!
//! [certificates]
//! nonce_len = 32
//! ```

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::ConfigError;

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use sshdata_core::algorithm::Algorithm;
/// use sshdata_core::config::Config;
///
/// let toml_str = r#"
/// [registry]
/// algorithms = ["ssh-ed25519", "rsa-sha2-512"]
///
/// [generation]
/// rsa_bits = 4096
/// "#;
///
/// let config = Config::from_toml_str(toml_str).expect("valid TOML");
/// assert_eq!(config.registry.algorithms, vec![Algorithm::Ed25519, Algorithm::RsaSha2_512]);
/// assert_eq!(config.generation.rsa_bits, 4096);
/// assert_eq!(config.certificates.nonce_len, 32);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Which identifiers the algorithm registry enables.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Key generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Certificate issuance parameters.
    #[serde(default)]
    pub certificates: CertificateConfig,
}

impl Config {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The default configuration as TOML.
    #[must_use]
    pub fn default_toml() -> String {
        // Serializing plain strings and integers cannot fail.
        Self::default().to_toml_string().unwrap_or_default()
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.algorithms.is_empty() {
            return Err(ConfigError::invalid(
                "registry.algorithms",
                "at least one algorithm must be enabled",
            ));
        }
        if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&self.generation.rsa_bits) {
            return Err(ConfigError::invalid(
                "generation.rsa_bits",
                format!("must be between {MIN_RSA_BITS} and {MAX_RSA_BITS}"),
            ));
        }
        if !(1..=MAX_NONCE_LEN).contains(&self.certificates.nonce_len) {
            return Err(ConfigError::invalid(
                "certificates.nonce_len",
                format!("must be between 1 and {MAX_NONCE_LEN}"),
            ));
        }
        Ok(())
    }
}

/// Smallest RSA modulus accepted by [`Config::validate`].
pub const MIN_RSA_BITS: usize = 1024;

/// Largest RSA modulus [`Config::validate`] accepts for generation.
///
/// Larger public keys still decode; the `rsa` backend cannot generate or
/// load private keys above this size.
pub const MAX_RSA_BITS: usize = 4096;

/// Largest certificate nonce accepted by [`Config::validate`].
pub const MAX_NONCE_LEN: usize = 1024;

fn default_algorithms() -> Vec<Algorithm> {
    Algorithm::ALL.to_vec()
}

/// Algorithm registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Identifiers to enable, by wire name.
    ///
    /// Default: every supported identifier.
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
        }
    }
}

const fn default_rsa_bits() -> usize {
    2048
}

/// Key generation configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationConfig {
    /// RSA modulus size in bits.
    ///
    /// Default: 2048
    #[serde(default = "default_rsa_bits")]
    pub rsa_bits: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rsa_bits: default_rsa_bits(),
        }
    }
}

const fn default_nonce_len() -> usize {
    32
}

/// Certificate issuance configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateConfig {
    /// Length of the random nonce placed in issued certificates.
    ///
    /// Default: 32
    #[serde(default = "default_nonce_len")]
    pub nonce_len: usize,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            nonce_len: default_nonce_len(),
        }
    }
}

/// Builder for [`Config`].
///
/// ```
/// use sshdata_core::algorithm::Algorithm;
/// use sshdata_core::config::Config;
///
/// let config = Config::builder()
///     .algorithms([Algorithm::Ed25519])
///     .rsa_bits(3072)
///     .nonce_len(16)
///     .build()
///     .unwrap();
/// assert_eq!(config.registry.algorithms, vec![Algorithm::Ed25519]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of enabled identifiers.
    #[must_use]
    pub fn algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.config.registry.algorithms = algorithms.into_iter().collect();
        self
    }

    /// Set the RSA modulus size used for generation.
    #[must_use]
    pub fn rsa_bits(mut self, bits: usize) -> Self {
        self.config.generation.rsa_bits = bits;
        self
    }

    /// Set the certificate nonce length.
    #[must_use]
    pub fn nonce_len(mut self, len: usize) -> Self {
        self.config.certificates.nonce_len = len;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if validation fails.
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
