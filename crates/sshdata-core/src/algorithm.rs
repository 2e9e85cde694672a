//! Algorithm identifiers and the families that share key material.
//!
//! An [`Algorithm`] names one signature scheme variant as it appears on the
//! wire. A [`Family`] groups the identifiers that can be produced from the
//! same key material: one RSA key signs under `ssh-rsa`, `rsa-sha2-256` and
//! `rsa-sha2-512`, while every other family has exactly one identifier.
//!
//! ```
//! use sshdata_core::algorithm::{Algorithm, Family};
//!
//! let algo: Algorithm = "rsa-sha2-512".parse().unwrap();
//! assert_eq!(algo.family(), Family::Rsa);
//! assert_eq!(Family::Rsa.primary(), Algorithm::Rsa);
//! assert_eq!(Family::Rsa.algorithms().len(), 3);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Signature algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// `ssh-rsa` (PKCS#1 v1.5 with SHA-1).
    Rsa,
    /// `rsa-sha2-256`.
    RsaSha2_256,
    /// `rsa-sha2-512`.
    RsaSha2_512,
    /// `ssh-dss`.
    Dsa,
    /// `ecdsa-sha2-nistp256`.
    EcdsaP256,
    /// `ecdsa-sha2-nistp384`.
    EcdsaP384,
    /// `ecdsa-sha2-nistp521`.
    EcdsaP521,
    /// `ssh-ed25519`.
    Ed25519,
    /// `ssh-dilithium5`.
    Dilithium5,
}

impl Algorithm {
    /// Every identifier, in a stable order.
    pub const ALL: [Self; 9] = [
        Self::Rsa,
        Self::RsaSha2_256,
        Self::RsaSha2_512,
        Self::Dsa,
        Self::EcdsaP256,
        Self::EcdsaP384,
        Self::EcdsaP521,
        Self::Ed25519,
        Self::Dilithium5,
    ];

    /// The wire name of this identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "ssh-rsa",
            Self::RsaSha2_256 => "rsa-sha2-256",
            Self::RsaSha2_512 => "rsa-sha2-512",
            Self::Dsa => "ssh-dss",
            Self::EcdsaP256 => "ecdsa-sha2-nistp256",
            Self::EcdsaP384 => "ecdsa-sha2-nistp384",
            Self::EcdsaP521 => "ecdsa-sha2-nistp521",
            Self::Ed25519 => "ssh-ed25519",
            Self::Dilithium5 => "ssh-dilithium5",
        }
    }

    /// The family whose key material produces this identifier.
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::Rsa | Self::RsaSha2_256 | Self::RsaSha2_512 => Family::Rsa,
            Self::Dsa => Family::Dsa,
            Self::EcdsaP256 => Family::EcdsaP256,
            Self::EcdsaP384 => Family::EcdsaP384,
            Self::EcdsaP521 => Family::EcdsaP521,
            Self::Ed25519 => Family::Ed25519,
            Self::Dilithium5 => Family::Dilithium,
        }
    }

    /// Whether this is the identifier a key of its family uses by default.
    #[must_use]
    pub fn is_primary(self) -> bool {
        self.family().primary() == self
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algo| algo.as_str() == s)
            .ok_or_else(|| DecodeError::unknown_algorithm(s))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(algo: Algorithm) -> Self {
        algo.as_str().to_string()
    }
}

/// A set of identifiers producible from the same key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// RSA keys.
    Rsa,
    /// DSA keys.
    Dsa,
    /// ECDSA keys on NIST P-256.
    EcdsaP256,
    /// ECDSA keys on NIST P-384.
    EcdsaP384,
    /// ECDSA keys on NIST P-521.
    EcdsaP521,
    /// Ed25519 keys.
    Ed25519,
    /// Dilithium5 keys.
    Dilithium,
}

impl Family {
    /// Every family, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Rsa,
        Self::Dsa,
        Self::EcdsaP256,
        Self::EcdsaP384,
        Self::EcdsaP521,
        Self::Ed25519,
        Self::Dilithium,
    ];

    /// Short human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "rsa",
            Self::Dsa => "dsa",
            Self::EcdsaP256 => "ecdsa-nistp256",
            Self::EcdsaP384 => "ecdsa-nistp384",
            Self::EcdsaP521 => "ecdsa-nistp521",
            Self::Ed25519 => "ed25519",
            Self::Dilithium => "dilithium",
        }
    }

    /// The default identifier; also the key-type name of public keys.
    #[must_use]
    pub const fn primary(self) -> Algorithm {
        match self {
            Self::Rsa => Algorithm::Rsa,
            Self::Dsa => Algorithm::Dsa,
            Self::EcdsaP256 => Algorithm::EcdsaP256,
            Self::EcdsaP384 => Algorithm::EcdsaP384,
            Self::EcdsaP521 => Algorithm::EcdsaP521,
            Self::Ed25519 => Algorithm::Ed25519,
            Self::Dilithium => Algorithm::Dilithium5,
        }
    }

    /// Every identifier belonging to this family.
    #[must_use]
    pub const fn algorithms(self) -> &'static [Algorithm] {
        match self {
            Self::Rsa => &[Algorithm::Rsa, Algorithm::RsaSha2_256, Algorithm::RsaSha2_512],
            Self::Dsa => &[Algorithm::Dsa],
            Self::EcdsaP256 => &[Algorithm::EcdsaP256],
            Self::EcdsaP384 => &[Algorithm::EcdsaP384],
            Self::EcdsaP521 => &[Algorithm::EcdsaP521],
            Self::Ed25519 => &[Algorithm::Ed25519],
            Self::Dilithium => &[Algorithm::Dilithium5],
        }
    }

    /// Whether `algorithm` belongs to this family.
    #[must_use]
    pub fn contains(self, algorithm: Algorithm) -> bool {
        algorithm.family() == self
    }

    /// The OpenSSH certificate key-type name for subject keys of this family.
    #[must_use]
    pub const fn certificate_type(self) -> &'static str {
        match self {
            Self::Rsa => "ssh-rsa-cert-v01@openssh.com",
            Self::Dsa => "ssh-dss-cert-v01@openssh.com",
            Self::EcdsaP256 => "ecdsa-sha2-nistp256-cert-v01@openssh.com",
            Self::EcdsaP384 => "ecdsa-sha2-nistp384-cert-v01@openssh.com",
            Self::EcdsaP521 => "ecdsa-sha2-nistp521-cert-v01@openssh.com",
            Self::Ed25519 => "ssh-ed25519-cert-v01@openssh.com",
            Self::Dilithium => "ssh-dilithium5-cert-v01@openssh.com",
        }
    }

    /// Look up a family by its certificate key-type name.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownAlgorithm`] for names that are not
    /// certificate key types.
    pub fn from_certificate_type(name: &str) -> Result<Self, DecodeError> {
        Self::ALL
            .into_iter()
            .find(|family| family.certificate_type() == name)
            .ok_or_else(|| DecodeError::unknown_algorithm(name))
    }

    /// The curve identifier carried inside ECDSA keys.
    #[must_use]
    pub const fn curve_name(self) -> Option<&'static str> {
        match self {
            Self::EcdsaP256 => Some("nistp256"),
            Self::EcdsaP384 => Some("nistp384"),
            Self::EcdsaP521 => Some("nistp521"),
            _ => None,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
