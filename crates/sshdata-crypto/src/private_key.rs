//! SSH private keys.
//!
//! Wire form (as found inside OpenSSH private key containers):
//! `[string key-type][family private fields][string comment]`.
//!
//! # Lifecycle
//!
//! A [`PrivateKey`] owns its secret material exclusively. Calling
//! [`PrivateKey::release`] zeroizes the secret and derived public material,
//! after which signing and issuing fail with [`KeyError::Released`]. Dropping
//! a key releases it.

use std::fmt;

use zeroize::Zeroizing;

use sshdata_core::{
    encode_signature, Algorithm, AlgorithmError, DecodeError, Family, KeyError, Reader, Result,
    Writer,
};

use crate::certificate::{self, Certificate, CertificateOptions};
use crate::material::{KeyMaterial, SecretMaterial};
use crate::public_key::PublicKey;
use crate::registry::AlgorithmRegistry;

/// A private key of any registered family.
///
/// This type does not implement `Clone`; debug output is redacted.
///
/// # Example
///
/// ```
/// use sshdata_core::Family;
/// use sshdata_crypto::PrivateKey;
///
/// let key = PrivateKey::generate(Family::Ed25519)?;
/// let signature = key.sign(b"hello, world!", None)?;
/// assert!(key.public_key().verify(b"hello, world!", &signature)?);
/// # Ok::<(), sshdata_core::Error>(())
/// ```
pub struct PrivateKey {
    family: Family,
    material: SecretMaterial,
    public_key: PublicKey,
    comment: String,
    registry: AlgorithmRegistry,
    released: bool,
}

impl PrivateKey {
    /// Generate a key with the global registry.
    ///
    /// # Errors
    ///
    /// See [`generate_with`](Self::generate_with).
    pub fn generate(family: Family) -> Result<Self> {
        Self::generate_with(AlgorithmRegistry::global(), family)
    }

    /// Generate a key using the registry's generation parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unregistered`] if the family is disabled and
    /// a [`KeyError`] if the provider fails.
    pub fn generate_with(registry: &AlgorithmRegistry, family: Family) -> Result<Self> {
        let provider = registry.resolve_family(family)?;
        let (public, private) = provider.generate(registry.generation_config())?;
        let public_key = PublicKey::from_material(registry, family, public)?;

        tracing::debug!(
            family = %family,
            fingerprint = %public_key.fingerprint_sha256(),
            "generated private key"
        );

        Ok(Self {
            family,
            material: private,
            public_key,
            comment: String::new(),
            registry: registry.clone(),
            released: false,
        })
    }

    /// Build a key from private material, deriving its public key.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if `algorithm` is not a key type or the
    /// material is invalid, and an algorithm error if the family is disabled.
    pub fn from_material(
        registry: &AlgorithmRegistry,
        algorithm: Algorithm,
        material: KeyMaterial,
        comment: impl Into<String>,
    ) -> Result<Self> {
        let secret = SecretMaterial::new(material);
        if !algorithm.is_primary() {
            return Err(DecodeError::malformed(format!("{algorithm} is not a key type")).into());
        }
        let provider = registry.resolve_family(algorithm.family())?;
        provider.validate_private(secret.expose())?;
        Self::assemble(registry, algorithm.family(), secret, comment.into())
    }

    fn assemble(
        registry: &AlgorithmRegistry,
        family: Family,
        material: SecretMaterial,
        comment: String,
    ) -> Result<Self> {
        let provider = registry.resolve_family(family)?;
        let public = provider.derive_public(material.expose())?;
        let public_key = PublicKey::from_material(registry, family, public)?;
        Ok(Self {
            family,
            material,
            public_key,
            comment,
            registry: registry.clone(),
            released: false,
        })
    }

    /// Parse a complete private key record with the global registry.
    ///
    /// # Errors
    ///
    /// See [`decode_with`](Self::decode_with).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with(AlgorithmRegistry::global(), bytes)
    }

    /// Parse a complete private key record.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for malformed records or trailing bytes.
    pub fn decode_with(registry: &AlgorithmRegistry, bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let key = Self::read_from(registry, &mut reader)?;
        reader.finish()?;
        Ok(key)
    }

    /// Read a private key record from the front of `reader`.
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
        let family = algorithm.family();
        let material = registry.resolve_family(family)?.read_private(reader)?;
        let comment = reader.read_string()?.to_string();
        Self::assemble(registry, family, material, comment)
    }

    /// Encode as a private key record.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Released`] after [`release`](Self::release).
    pub fn encode(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_live()?;
        let provider = self.registry.resolve_family(self.family)?;
        let mut writer = Writer::new();
        writer.string(self.algorithm().as_str());
        provider.write_private(&mut writer, self.material.expose());
        writer.string(&self.comment);
        Ok(Zeroizing::new(writer.into_bytes()))
    }

    /// Sign `message`, producing a signature blob.
    ///
    /// `algorithm` defaults to [`default_algorithm`](Self::default_algorithm);
    /// RSA keys may choose any of their three identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Released`] after release,
    /// [`AlgorithmError::FamilyMismatch`] if `algorithm` is outside the
    /// key's family, and [`AlgorithmError::Unregistered`] if it is disabled.
    pub fn sign(&self, message: &[u8], algorithm: Option<Algorithm>) -> Result<Vec<u8>> {
        self.ensure_live()?;
        let algorithm = algorithm.unwrap_or_else(|| self.default_algorithm());
        if !self.family.contains(algorithm) {
            return Err(AlgorithmError::family_mismatch(self.family, algorithm).into());
        }
        let provider = self.registry.resolve(algorithm)?;
        let raw = provider.sign(algorithm, message, self.material.expose())?;

        tracing::debug!(algorithm = %algorithm, len = message.len(), "signed message");

        Ok(encode_signature(algorithm, &raw))
    }

    /// Issue a certificate for `subject`, signed by this key.
    ///
    /// # Errors
    ///
    /// As [`sign`](Self::sign), using
    /// [`CertificateOptions::signature_algorithm`].
    pub fn issue_certificate(
        &self,
        subject: &PublicKey,
        options: CertificateOptions,
    ) -> Result<Certificate> {
        certificate::issue(self, subject, options)
    }

    /// Zeroize the secret and derived public material. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.material.release();
        self.public_key.wipe();
        self.released = true;

        tracing::debug!(family = %self.family, "released private key");
    }

    /// Whether [`release`](Self::release) has run.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// The key-type identifier.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.family.primary()
    }

    /// The signature identifier used when none is requested: the family's
    /// first identifier enabled in this key's registry.
    #[must_use]
    pub fn default_algorithm(&self) -> Algorithm {
        self.registry.default_algorithm(self.family)
    }

    /// The key family.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// The derived public key. Wiped after release.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The secret material. Empty after release.
    #[must_use]
    pub const fn material(&self) -> &SecretMaterial {
        &self.material
    }

    /// The key comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Replace the key comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// The registry this key resolves providers through.
    #[must_use]
    pub const fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub(crate) fn ensure_live(&self) -> std::result::Result<(), KeyError> {
        if self.released {
            Err(KeyError::Released)
        } else {
            Ok(())
        }
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.release();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
            && self.material == other.material
            && self.comment == other.comment
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("material", &self.material)
            .field("comment", &self.comment)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::unwrap_used)]

    use sshdata_core::{Config, Error};

    use super::*;

    fn ed25519() -> PrivateKey {
        PrivateKey::generate(Family::Ed25519).expect("generation should succeed")
    }

    #[test]
    fn test_sign_defaults_to_primary() {
        let key = ed25519();
        let sig = key.sign(b"hello, world!", None).unwrap();
        let mut reader = Reader::new(&sig);
        assert_eq!(reader.read_string().unwrap(), "ssh-ed25519");
        assert!(key.public_key().verify(b"hello, world!", &sig).unwrap());
    }

    #[test]
    fn test_sign_rejects_foreign_algorithm() {
        let key = ed25519();
        let err = key.sign(b"msg", Some(Algorithm::Dsa)).unwrap_err();
        assert!(matches!(
            err,
            Error::Algorithm(AlgorithmError::FamilyMismatch {
                family: Family::Ed25519,
                algorithm: Algorithm::Dsa
            })
        ));
    }

    #[test]
    fn test_record_round_trip() {
        let mut key = ed25519();
        key.set_comment("me@example.com");
        let record = key.encode().unwrap();
        let back = PrivateKey::decode(&record).unwrap();
        assert_eq!(back, key);
        assert_eq!(back.comment(), "me@example.com");
        assert_eq!(back.public_key(), key.public_key());
    }

    #[test]
    fn test_record_rejects_trailing_bytes() {
        let key = ed25519();
        let mut record = key.encode().unwrap().to_vec();
        record.push(0);
        assert!(PrivateKey::decode(&record).unwrap_err().is_decode());
    }

    #[test]
    fn test_from_material_derives_public_key() {
        let key = ed25519();
        let fields = key.material().expose().clone();
        let rebuilt = PrivateKey::from_material(key.registry(), Algorithm::Ed25519, fields, "")
            .unwrap();
        assert_eq!(rebuilt.public_key(), key.public_key());
    }

    #[test]
    fn test_from_material_rejects_signature_identifier() {
        let key = PrivateKey::generate(Family::Ed25519).unwrap();
        let fields = key.material().expose().clone();
        assert!(
            PrivateKey::from_material(key.registry(), Algorithm::RsaSha2_256, fields, "")
                .unwrap_err()
                .is_decode()
        );
    }

    #[test]
    fn test_release_wipes_material() {
        let mut key = ed25519();
        let secret = key.material().expose().fields().to_vec();
        let public = key.public_key().material().fields().to_vec();
        assert!(!secret.is_empty());

        key.release();
        assert!(key.is_released());
        assert!(key.material().is_released());
        assert!(key.material().expose().fields().is_empty());
        assert!(key.public_key().material().is_empty());

        let debug_output = format!("{:?}", key.public_key().material());
        for field in secret.iter().chain(&public) {
            assert!(!key.material().expose().fields().contains(field));
            assert!(!key.public_key().material().fields().contains(field));
            assert!(!debug_output.contains(&hex::encode(field)));
        }
    }

    #[test]
    fn test_release_is_idempotent_and_blocks_use() {
        let mut key = ed25519();
        key.release();
        key.release();
        assert!(matches!(
            key.sign(b"msg", None),
            Err(Error::Key(KeyError::Released))
        ));
        assert!(matches!(key.encode(), Err(Error::Key(KeyError::Released))));
    }

    #[test]
    fn test_disabled_identifier_cannot_sign() {
        let config = Config::builder()
            .algorithms([Algorithm::RsaSha2_256, Algorithm::RsaSha2_512])
            .rsa_bits(1024)
            .build()
            .unwrap();
        let registry = AlgorithmRegistry::from_config(&config);
        let key = PrivateKey::generate_with(&registry, Family::Rsa).unwrap();
        assert!(matches!(
            key.sign(b"msg", Some(Algorithm::Rsa)),
            Err(Error::Algorithm(AlgorithmError::Unregistered {
                algorithm: Algorithm::Rsa
            }))
        ));
        assert!(key.sign(b"msg", Some(Algorithm::RsaSha2_512)).is_ok());
    }

    #[test]
    fn test_default_signature_skips_disabled_identifier() {
        let config = Config::builder()
            .algorithms([Algorithm::RsaSha2_256, Algorithm::RsaSha2_512])
            .rsa_bits(1024)
            .build()
            .unwrap();
        let registry = AlgorithmRegistry::from_config(&config);
        let key = PrivateKey::generate_with(&registry, Family::Rsa).unwrap();
        assert_eq!(key.default_algorithm(), Algorithm::RsaSha2_256);

        let sig = key.sign(b"msg", None).unwrap();
        let mut reader = Reader::new(&sig);
        assert_eq!(reader.read_string().unwrap(), "rsa-sha2-256");
        assert!(key.public_key().verify(b"msg", &sig).unwrap());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ed25519();
        let debug_output = format!("{key:?}");
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode(
            key.material().expose().field(1).unwrap()
        )));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PrivateKey>();
    }
}
