//! RSA provider (`ssh-rsa`, `rsa-sha2-256`, `rsa-sha2-512`).
//!
//! One key signs under all three identifiers; only the digest differs.

use ::rsa::traits::{PrivateKeyParts, PublicKeyParts};
use ::rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use rand::rngs::OsRng;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use sshdata_core::{Algorithm, DecodeError, Family, GenerationConfig, KeyError};

use super::{left_pad, MaterialField, SignatureProvider};
use crate::material::{KeyMaterial, SecretMaterial};

const PUBLIC_SCHEMA: &[MaterialField] = &[MaterialField::Mpint("e"), MaterialField::Mpint("n")];

const PRIVATE_SCHEMA: &[MaterialField] = &[
    MaterialField::Mpint("n"),
    MaterialField::Mpint("e"),
    MaterialField::Mpint("d"),
    MaterialField::Mpint("iqmp"),
    MaterialField::Mpint("p"),
    MaterialField::Mpint("q"),
];

/// Largest modulus accepted in public keys, in bits. Private keys are held
/// to the `rsa` crate's 4096-bit limit.
const MAX_PUBLIC_BITS: usize = 16384;

/// Capability provider for RSA keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaProvider;

/// The PKCS#1 padding scheme and message digest for `algorithm`.
fn padding_and_digest(algorithm: Algorithm, message: &[u8]) -> Option<(Pkcs1v15Sign, Vec<u8>)> {
    match algorithm {
        Algorithm::Rsa => Some((Pkcs1v15Sign::new::<Sha1>(), Sha1::digest(message).to_vec())),
        Algorithm::RsaSha2_256 => Some((
            Pkcs1v15Sign::new::<Sha256>(),
            Sha256::digest(message).to_vec(),
        )),
        Algorithm::RsaSha2_512 => Some((
            Pkcs1v15Sign::new::<Sha512>(),
            Sha512::digest(message).to_vec(),
        )),
        _ => None,
    }
}

fn uint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

fn public_key(public: &KeyMaterial) -> Option<RsaPublicKey> {
    let e = public.field(0)?;
    let n = public.field(1)?;
    RsaPublicKey::new_with_max_size(uint(n), uint(e), MAX_PUBLIC_BITS).ok()
}

fn private_key(private: &KeyMaterial) -> Result<RsaPrivateKey, KeyError> {
    let n = uint(private.require(0, "n")?);
    let e = uint(private.require(1, "e")?);
    let d = uint(private.require(2, "d")?);
    let p = uint(private.require(4, "p")?);
    let q = uint(private.require(5, "q")?);
    RsaPrivateKey::from_components(n, e, d, vec![p, q])
        .map_err(|e| KeyError::invalid_material(format!("RSA: {e}")))
}

impl SignatureProvider for RsaProvider {
    fn family(&self) -> Family {
        Family::Rsa
    }

    fn public_schema(&self) -> &'static [MaterialField] {
        PUBLIC_SCHEMA
    }

    fn private_schema(&self) -> &'static [MaterialField] {
        PRIVATE_SCHEMA
    }

    fn generate(
        &self,
        config: &GenerationConfig,
    ) -> Result<(KeyMaterial, SecretMaterial), KeyError> {
        let key = RsaPrivateKey::new(&mut OsRng, config.rsa_bits)
            .map_err(|e| KeyError::invalid_material(format!("RSA generation: {e}")))?;
        let [p, q] = key.primes() else {
            return Err(KeyError::invalid_material("RSA key must have two primes"));
        };
        let iqmp = key
            .crt_coefficient()
            .ok_or_else(|| KeyError::invalid_material("RSA CRT coefficient unavailable"))?;

        let n = key.n().to_bytes_be();
        let e = key.e().to_bytes_be();
        let public = KeyMaterial::new(vec![e.clone(), n.clone()]);
        let private = SecretMaterial::new(KeyMaterial::new(vec![
            n,
            e,
            key.d().to_bytes_be(),
            iqmp.to_bytes_be(),
            p.to_bytes_be(),
            q.to_bytes_be(),
        ]));
        Ok((public, private))
    }

    fn derive_public(&self, private: &KeyMaterial) -> Result<KeyMaterial, KeyError> {
        let n = private.require(0, "n")?;
        let e = private.require(1, "e")?;
        Ok(KeyMaterial::new(vec![e.to_vec(), n.to_vec()]))
    }

    fn sign(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        private: &KeyMaterial,
    ) -> Result<Vec<u8>, KeyError> {
        let (padding, digest) = padding_and_digest(algorithm, message)
            .ok_or_else(|| KeyError::signing_failed(format!("{algorithm} is not an RSA algorithm")))?;
        let key = private_key(private)?;
        key.sign(padding, &digest)
            .map_err(|e| KeyError::signing_failed(format!("RSA: {e}")))
    }

    fn verify(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        signature: &[u8],
        public: &KeyMaterial,
    ) -> bool {
        let Some((padding, digest)) = padding_and_digest(algorithm, message) else {
            return false;
        };
        let Some(key) = public_key(public) else {
            return false;
        };
        // Some signers strip leading zero bytes from the signature.
        let Some(padded) = left_pad(signature, key.size()) else {
            return false;
        };
        key.verify(padding, &digest, &padded).is_ok()
    }

    fn validate_public(&self, public: &KeyMaterial) -> Result<(), DecodeError> {
        public_key(public)
            .map(|_| ())
            .ok_or_else(|| DecodeError::malformed("invalid RSA public key"))
    }

    fn validate_private(&self, private: &KeyMaterial) -> Result<(), DecodeError> {
        private_key(private)
            .map(|_| ())
            .map_err(|e| DecodeError::malformed(e.to_string()))
    }
}
