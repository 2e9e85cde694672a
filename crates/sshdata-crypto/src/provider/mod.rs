//! Per-family signature capability providers.
//!
//! Each supported key family has one [`SignatureProvider`]. A provider owns
//! everything family-specific: the wire schema of public and private
//! material, key generation, raw signing and raw verification. Everything
//! above this layer (keys, certificates, containers) is family-agnostic and
//! reaches providers through the [`AlgorithmRegistry`](crate::AlgorithmRegistry).
//!
//! # Raw signature formats
//!
//! | Family | Raw signature |
//! |--------|---------------|
//! | RSA | PKCS#1 v1.5 signature, SHA-1/256/512 by identifier |
//! | DSA | 40 bytes, `r ‖ s`, SHA-1 |
//! | ECDSA | `mpint r`, `mpint s`, SHA-256/384/512 by curve |
//! | Ed25519 | 64 bytes |
//! | Dilithium5 | detached signature |

use zeroize::Zeroizing;

use sshdata_core::{Algorithm, DecodeError, Family, GenerationConfig, KeyError, Reader, Writer};

use crate::material::{KeyMaterial, SecretMaterial};

pub mod dilithium;
pub mod dsa;
pub mod ecdsa;
pub mod ed25519;
pub mod rsa;

pub use self::dilithium::DilithiumProvider;
pub use self::dsa::DsaProvider;
pub use self::ecdsa::{EcdsaP256Provider, EcdsaP384Provider, EcdsaP521Provider};
pub use self::ed25519::Ed25519Provider;
pub use self::rsa::RsaProvider;

/// One entry of a material schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialField {
    /// A non-negative `mpint`, stored as its minimal magnitude.
    Mpint(&'static str),
    /// A length-prefixed byte string.
    String(&'static str),
}

impl MaterialField {
    /// The field's name, for error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mpint(name) | Self::String(name) => name,
        }
    }
}

/// Family-specific key operations.
///
/// Implementations must be `Send + Sync`; the registry shares them across
/// threads.
pub trait SignatureProvider: Send + Sync {
    /// The family this provider serves.
    fn family(&self) -> Family;

    /// Wire schema of public material, without the key-type name.
    fn public_schema(&self) -> &'static [MaterialField];

    /// Wire schema of private material, without the key-type name or comment.
    fn private_schema(&self) -> &'static [MaterialField];

    /// Generate a fresh key pair.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidMaterial`] if the backend rejects the
    /// generation parameters.
    fn generate(&self, config: &GenerationConfig)
        -> Result<(KeyMaterial, SecretMaterial), KeyError>;

    /// Derive public material from private material.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidMaterial`] if fields are missing.
    fn derive_public(&self, private: &KeyMaterial) -> Result<KeyMaterial, KeyError>;

    /// Produce a raw signature under `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidMaterial`] for unusable material and
    /// [`KeyError::SigningFailed`] if the backend fails.
    fn sign(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        private: &KeyMaterial,
    ) -> Result<Vec<u8>, KeyError>;

    /// Check a raw signature. Malformed input yields `false`.
    fn verify(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        signature: &[u8],
        public: &KeyMaterial,
    ) -> bool;

    /// Semantic checks on decoded public material.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the material cannot be a key
    /// of this family.
    fn validate_public(&self, _public: &KeyMaterial) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Semantic checks on decoded private material.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the material cannot be a key
    /// of this family.
    fn validate_private(&self, _private: &KeyMaterial) -> Result<(), DecodeError> {
        Ok(())
    }

    /// Append the public fields to `writer`.
    fn write_public(&self, writer: &mut Writer, public: &KeyMaterial) {
        write_material(writer, self.public_schema(), public);
    }

    /// Read and validate public fields.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for truncated or invalid fields.
    fn read_public(&self, reader: &mut Reader<'_>) -> Result<KeyMaterial, DecodeError> {
        let material = read_material(reader, self.public_schema())?;
        self.validate_public(&material)?;
        Ok(material)
    }

    /// Encode the private fields.
    fn write_private(&self, writer: &mut Writer, private: &KeyMaterial) {
        write_material(writer, self.private_schema(), private);
    }

    /// Read and validate private fields.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for truncated or invalid fields.
    fn read_private(&self, reader: &mut Reader<'_>) -> Result<SecretMaterial, DecodeError> {
        let secret = SecretMaterial::new(read_material(reader, self.private_schema())?);
        self.validate_private(secret.expose())?;
        Ok(secret)
    }
}

/// Write `material` following `schema`. Missing fields are written empty.
pub fn write_material(writer: &mut Writer, schema: &[MaterialField], material: &KeyMaterial) {
    for (index, kind) in schema.iter().enumerate() {
        let value = material.field(index).unwrap_or_default();
        match kind {
            MaterialField::Mpint(_) => writer.mpint(value),
            MaterialField::String(_) => writer.bytes(value),
        };
    }
}

/// Read one field per schema entry.
///
/// # Errors
///
/// Returns a [`DecodeError`] if any field is truncated or, for integers,
/// negative or non-minimal.
pub fn read_material(
    reader: &mut Reader<'_>,
    schema: &[MaterialField],
) -> Result<KeyMaterial, DecodeError> {
    let mut fields = Vec::with_capacity(schema.len());
    for kind in schema {
        let value = match kind {
            MaterialField::Mpint(_) => reader.read_mpint()?,
            MaterialField::String(_) => reader.read_bytes()?,
        };
        fields.push(value.to_vec());
    }
    Ok(KeyMaterial::new(fields))
}

/// Strip leading zero bytes from a big-endian magnitude.
pub(crate) fn trim_magnitude(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Left-pad a big-endian magnitude to exactly `len` bytes.
///
/// Returns `None` if the value does not fit.
pub(crate) fn left_pad(bytes: &[u8], len: usize) -> Option<Zeroizing<Vec<u8>>> {
    let trimmed = &bytes[bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len())..];
    if trimmed.len() > len {
        return None;
    }
    let mut out = Zeroizing::new(vec![0u8; len]);
    out[len - trimmed.len()..].copy_from_slice(trimmed);
    Some(out)
}
