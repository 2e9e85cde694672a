//! Ed25519 provider (`ssh-ed25519`).
//!
//! Private material stores the 32-byte public key followed by the 64-byte
//! `seed ‖ public` value, the way OpenSSH lays it out.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use ed25519_dalek::{KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use sshdata_core::{Algorithm, DecodeError, Family, GenerationConfig, KeyError};

use super::{MaterialField, SignatureProvider};
use crate::material::{KeyMaterial, SecretMaterial};

const PUBLIC_SCHEMA: &[MaterialField] = &[MaterialField::String("pk")];

const PRIVATE_SCHEMA: &[MaterialField] = &[MaterialField::String("pk"), MaterialField::String("sk")];

/// Capability provider for Ed25519 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

fn verifying_key(public: &KeyMaterial) -> Option<VerifyingKey> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = public.field(0)?.try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

fn signing_key(private: &KeyMaterial) -> Result<SigningKey, KeyError> {
    let sk = private.require(1, "sk")?;
    if sk.len() != KEYPAIR_LENGTH {
        return Err(KeyError::invalid_material(format!(
            "Ed25519 private key must be {KEYPAIR_LENGTH} bytes, got {}",
            sk.len()
        )));
    }
    let mut keypair = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
    keypair.copy_from_slice(sk);
    let key = SigningKey::from_keypair_bytes(&keypair)
        .map_err(|_| KeyError::invalid_material("Ed25519 seed does not match public key"))?;
    if private.field(0) != Some(key.verifying_key().as_bytes().as_slice()) {
        return Err(KeyError::invalid_material(
            "Ed25519 public key does not match private key",
        ));
    }
    Ok(key)
}

impl SignatureProvider for Ed25519Provider {
    fn family(&self) -> Family {
        Family::Ed25519
    }

    fn public_schema(&self) -> &'static [MaterialField] {
        PUBLIC_SCHEMA
    }

    fn private_schema(&self) -> &'static [MaterialField] {
        PRIVATE_SCHEMA
    }

    fn generate(
        &self,
        _config: &GenerationConfig,
    ) -> Result<(KeyMaterial, SecretMaterial), KeyError> {
        let key = SigningKey::generate(&mut OsRng);
        let pk = key.verifying_key().to_bytes().to_vec();
        let keypair = Zeroizing::new(key.to_keypair_bytes());
        Ok((
            KeyMaterial::new(vec![pk.clone()]),
            SecretMaterial::new(KeyMaterial::new(vec![pk, keypair.to_vec()])),
        ))
    }

    fn derive_public(&self, private: &KeyMaterial) -> Result<KeyMaterial, KeyError> {
        Ok(KeyMaterial::new(vec![private.require(0, "pk")?.to_vec()]))
    }

    fn sign(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        private: &KeyMaterial,
    ) -> Result<Vec<u8>, KeyError> {
        if algorithm != Algorithm::Ed25519 {
            return Err(KeyError::signing_failed(format!(
                "{algorithm} is not an Ed25519 algorithm"
            )));
        }
        let key = signing_key(private)?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    fn verify(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        signature: &[u8],
        public: &KeyMaterial,
    ) -> bool {
        if algorithm != Algorithm::Ed25519 {
            return false;
        }
        let Some(key) = verifying_key(public) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(message, &signature).is_ok()
    }

    fn validate_public(&self, public: &KeyMaterial) -> Result<(), DecodeError> {
        verifying_key(public)
            .map(|_| ())
            .ok_or_else(|| DecodeError::malformed("invalid Ed25519 public key"))
    }

    fn validate_private(&self, private: &KeyMaterial) -> Result<(), DecodeError> {
        signing_key(private)
            .map(|_| ())
            .map_err(|e| DecodeError::malformed(e.to_string()))
    }
}
