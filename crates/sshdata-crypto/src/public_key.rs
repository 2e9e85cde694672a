//! SSH public keys.
//!
//! Wire form: `[string key-type][family public fields]`, where the key type
//! is the family's primary identifier.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use sshdata_core::{
    decode_signature, Algorithm, AlgorithmError, DecodeError, Family, Reader, Result, Writer,
};

use crate::material::KeyMaterial;
use crate::provider::SignatureProvider;
use crate::registry::AlgorithmRegistry;

/// A public key of any registered family.
///
/// Equality compares the family and the material; the registry a key was
/// decoded with is not part of its identity.
#[derive(Clone)]
pub struct PublicKey {
    family: Family,
    material: KeyMaterial,
    provider: Arc<dyn SignatureProvider>,
    registry: AlgorithmRegistry,
}

impl PublicKey {
    /// Build a key from validated public material.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unregistered`](sshdata_core::AlgorithmError)
    /// if the family is disabled, or a [`DecodeError`] if the material is
    /// invalid for it.
    pub fn from_material(
        registry: &AlgorithmRegistry,
        family: Family,
        material: KeyMaterial,
    ) -> Result<Self> {
        let provider = registry.family_provider(family)?;
        provider.validate_public(&material)?;
        Ok(Self {
            family,
            material,
            provider,
            registry: registry.clone(),
        })
    }

    /// Parse a complete public key blob using the global registry.
    ///
    /// # Errors
    ///
    /// See [`decode_with`](Self::decode_with).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with(AlgorithmRegistry::global(), bytes)
    }

    /// Parse a complete public key blob.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for unknown key types, malformed fields or
    /// trailing bytes, and an algorithm error if the family is disabled.
    pub fn decode_with(registry: &AlgorithmRegistry, bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let key = Self::read_from(registry, &mut reader)?;
        reader.finish()?;
        Ok(key)
    }

    /// Read a public key from the front of `reader`.
    ///
    /// # Errors
    ///
    /// As [`decode_with`](Self::decode_with), except that trailing bytes are
    /// left in the reader.
    pub fn read_from(registry: &AlgorithmRegistry, reader: &mut Reader<'_>) -> Result<Self> {
        let name = reader.read_string()?;
        let algorithm: Algorithm = name.parse()?;
        if !algorithm.is_primary() {
            return Err(DecodeError::malformed(format!("{name} is not a key type")).into());
        }
        Self::read_fields(registry, algorithm.family(), reader)
    }

    /// Read the public fields of a key whose family is already known, as in
    /// the subject key of a certificate.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for malformed fields.
    pub fn read_fields(
        registry: &AlgorithmRegistry,
        family: Family,
        reader: &mut Reader<'_>,
    ) -> Result<Self> {
        let provider = registry.family_provider(family)?;
        let material = provider.read_public(reader)?;
        Ok(Self {
            family,
            material,
            provider,
            registry: registry.clone(),
        })
    }

    /// Encode as a public key blob.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.string(self.algorithm().as_str());
        self.write_fields(&mut writer);
        writer.into_bytes()
    }

    /// Append the public fields, without the key-type name.
    pub fn write_fields(&self, writer: &mut Writer) {
        self.provider.write_public(writer, &self.material);
    }

    /// Verify a signature blob over `message`.
    ///
    /// Returns `Ok(false)` when the signature does not match.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the blob is malformed,
    /// [`AlgorithmError::FamilyMismatch`] if the blob's algorithm is outside
    /// this key's family, and [`AlgorithmError::Unregistered`] if it is
    /// disabled.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        let (algorithm, raw, rest) = decode_signature(signature)?;
        Reader::new(rest).finish()?;
        if !self.family.contains(algorithm) {
            return Err(AlgorithmError::family_mismatch(self.family, algorithm).into());
        }
        let provider = self.registry.resolve(algorithm)?;
        let valid = provider.verify(algorithm, message, &raw, &self.material);

        tracing::debug!(algorithm = %algorithm, valid, "verified signature");

        Ok(valid)
    }

    /// The key-type identifier.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.family.primary()
    }

    /// The key family.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// The public fields.
    #[must_use]
    pub const fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// The registry this key resolves providers through.
    #[must_use]
    pub const fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Lowercase hex SHA-256 of [`encode`](Self::encode).
    #[must_use]
    pub fn fingerprint_sha256(&self) -> String {
        hex::encode(Sha256::digest(self.encode()))
    }

    pub(crate) fn wipe(&mut self) {
        self.material.wipe();
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family && self.material == other.material
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm())
            .field("fingerprint", &self.fingerprint_sha256())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::unwrap_used)]

    use sshdata_core::{encode_signature, Error, GenerationConfig};

    use super::*;
    use crate::provider::{Ed25519Provider, SignatureProvider};

    fn ed25519_key() -> (PublicKey, crate::material::SecretMaterial) {
        let registry = AlgorithmRegistry::new();
        let (public, private) = Ed25519Provider.generate(&GenerationConfig::default()).unwrap();
        let key = PublicKey::from_material(&registry, Family::Ed25519, public).unwrap();
        (key, private)
    }

    #[test]
    fn test_encode_decode() {
        let (key, _) = ed25519_key();
        let blob = key.encode();
        let mut reader = Reader::new(&blob);
        assert_eq!(reader.read_string().unwrap(), "ssh-ed25519");
        assert_eq!(reader.read_bytes().unwrap().len(), 32);
        assert!(reader.is_empty());

        assert_eq!(PublicKey::decode(&blob).unwrap(), key);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let (key, _) = ed25519_key();
        let mut blob = key.encode();
        blob.push(0);
        assert!(matches!(
            PublicKey::decode(&blob),
            Err(Error::Decode(DecodeError::TrailingBytes { count: 1 }))
        ));
    }

    #[test]
    fn test_decode_rejects_signature_only_identifiers() {
        let mut writer = Writer::new();
        writer.string("rsa-sha2-256").mpint(&[1, 0, 1]).mpint(&[0xc5; 64]);
        let err = PublicKey::decode(writer.as_bytes()).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let mut writer = Writer::new();
        writer.string("ssh-foo").bytes(&[0; 32]);
        assert!(matches!(
            PublicKey::decode(writer.as_bytes()),
            Err(Error::Decode(DecodeError::UnknownAlgorithm { .. }))
        ));
    }

    #[test]
    fn test_verify() {
        let (key, private) = ed25519_key();
        let raw = Ed25519Provider
            .sign(Algorithm::Ed25519, b"hello, world!", private.expose())
            .unwrap();
        let blob = encode_signature(Algorithm::Ed25519, &raw);
        assert!(key.verify(b"hello, world!", &blob).unwrap());
        assert!(!key.verify(b"hello, world", &blob).unwrap());
    }

    #[test]
    fn test_verify_family_mismatch_is_an_error() {
        let (key, _) = ed25519_key();
        let blob = encode_signature(Algorithm::RsaSha2_256, &[0; 256]);
        assert!(matches!(
            key.verify(b"msg", &blob),
            Err(Error::Algorithm(AlgorithmError::FamilyMismatch {
                family: Family::Ed25519,
                algorithm: Algorithm::RsaSha2_256,
            }))
        ));
    }

    #[test]
    fn test_verify_malformed_blob_is_decode_error() {
        let (key, _) = ed25519_key();
        assert!(key.verify(b"msg", &[0, 0, 0]).unwrap_err().is_decode());
    }

    #[test]
    fn test_equality_ignores_registry() {
        let (key, _) = ed25519_key();
        let other_registry = AlgorithmRegistry::from_config(
            &sshdata_core::Config::builder()
                .algorithms([Algorithm::Ed25519])
                .build()
                .unwrap(),
        );
        let same = PublicKey::decode_with(&other_registry, &key.encode()).unwrap();
        assert_eq!(key, same);
        assert_eq!(same.encode(), key.encode());
    }

    #[test]
    fn test_equality_detects_changed_material() {
        let (key, _) = ed25519_key();
        let mut blob = key.encode();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        // Flipping a bit may produce an invalid point; only compare valid keys.
        if let Ok(mutated) = PublicKey::decode(&blob) {
            assert_ne!(key, mutated);
        }
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        let (key, _) = ed25519_key();
        let fingerprint = key.fingerprint_sha256();
        assert_eq!(fingerprint.len(), 64);
        assert_eq!(fingerprint, hex::encode(Sha256::digest(key.encode())));
    }

    #[test]
    fn test_disabled_family_is_rejected() {
        let (key, _) = ed25519_key();
        let registry = AlgorithmRegistry::from_config(
            &sshdata_core::Config::builder()
                .algorithms([Algorithm::Dsa])
                .build()
                .unwrap(),
        );
        assert!(matches!(
            PublicKey::decode_with(&registry, &key.encode()),
            Err(Error::Algorithm(AlgorithmError::Unregistered { .. }))
        ));
    }
}
