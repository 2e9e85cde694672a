//! Dilithium5 provider (`ssh-dilithium5`).
//!
//! Material is opaque: public is `[pk]`, private is `[pk, sk]`, and the raw
//! signature is a detached Dilithium5 signature.

use pqcrypto_dilithium::dilithium5;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};

use sshdata_core::{Algorithm, DecodeError, Family, GenerationConfig, KeyError};

use super::{MaterialField, SignatureProvider};
use crate::material::{KeyMaterial, SecretMaterial};

const PUBLIC_SCHEMA: &[MaterialField] = &[MaterialField::String("pk")];

const PRIVATE_SCHEMA: &[MaterialField] = &[MaterialField::String("pk"), MaterialField::String("sk")];

/// Both key halves begin with the public seed `rho`.
const SEED_LEN: usize = 32;

/// Capability provider for Dilithium5 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DilithiumProvider;

fn public_key(public: &KeyMaterial) -> Option<dilithium5::PublicKey> {
    dilithium5::PublicKey::from_bytes(public.field(0)?).ok()
}

fn secret_key(private: &KeyMaterial) -> Result<dilithium5::SecretKey, KeyError> {
    let sk = private.require(1, "sk")?;
    dilithium5::SecretKey::from_bytes(sk).map_err(|_| {
        KeyError::invalid_material(format!(
            "Dilithium5 secret key must be {} bytes, got {}",
            dilithium5::secret_key_bytes(),
            sk.len()
        ))
    })
}

impl SignatureProvider for DilithiumProvider {
    fn family(&self) -> Family {
        Family::Dilithium
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
        let (pk, sk) = dilithium5::keypair();
        let pk = pk.as_bytes().to_vec();
        Ok((
            KeyMaterial::new(vec![pk.clone()]),
            SecretMaterial::new(KeyMaterial::new(vec![pk, sk.as_bytes().to_vec()])),
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
        if algorithm != Algorithm::Dilithium5 {
            return Err(KeyError::signing_failed(format!(
                "{algorithm} is not a Dilithium algorithm"
            )));
        }
        let sk = secret_key(private)?;
        Ok(dilithium5::detached_sign(message, &sk).as_bytes().to_vec())
    }

    fn verify(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        signature: &[u8],
        public: &KeyMaterial,
    ) -> bool {
        if algorithm != Algorithm::Dilithium5 {
            return false;
        }
        let Some(pk) = public_key(public) else {
            return false;
        };
        let Ok(signature) = dilithium5::DetachedSignature::from_bytes(signature) else {
            return false;
        };
        dilithium5::verify_detached_signature(&signature, message, &pk).is_ok()
    }

    fn validate_public(&self, public: &KeyMaterial) -> Result<(), DecodeError> {
        public_key(public).map(|_| ()).ok_or_else(|| {
            DecodeError::malformed(format!(
                "Dilithium5 public key must be {} bytes",
                dilithium5::public_key_bytes()
            ))
        })
    }

    fn validate_private(&self, private: &KeyMaterial) -> Result<(), DecodeError> {
        let pk = private
            .field(0)
            .ok_or_else(|| DecodeError::malformed("missing Dilithium5 public key"))?;
        self.validate_public(&KeyMaterial::new(vec![pk.to_vec()]))?;
        let sk = secret_key(private).map_err(|e| DecodeError::malformed(e.to_string()))?;
        if sk.as_bytes()[..SEED_LEN] != pk[..SEED_LEN] {
            return Err(DecodeError::malformed(
                "Dilithium5 public key does not match secret key",
            ));
        }
        Ok(())
    }
}
