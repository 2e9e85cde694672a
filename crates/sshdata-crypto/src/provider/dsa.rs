//! DSA provider (`ssh-dss`).
//!
//! SSH DSA uses 160-bit subgroups with SHA-1; the raw signature is the
//! 20-byte `r` followed by the 20-byte `s`.

use ::dsa::{BigUint, Components, KeySize, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use signature::{DigestSigner, DigestVerifier};

use sshdata_core::{Algorithm, DecodeError, Family, GenerationConfig, KeyError};

use super::{left_pad, MaterialField, SignatureProvider};
use crate::material::{KeyMaterial, SecretMaterial};

const PUBLIC_SCHEMA: &[MaterialField] = &[
    MaterialField::Mpint("p"),
    MaterialField::Mpint("q"),
    MaterialField::Mpint("g"),
    MaterialField::Mpint("y"),
];

const PRIVATE_SCHEMA: &[MaterialField] = &[
    MaterialField::Mpint("p"),
    MaterialField::Mpint("q"),
    MaterialField::Mpint("g"),
    MaterialField::Mpint("y"),
    MaterialField::Mpint("x"),
];

/// Length of each half of a raw signature.
const COMPONENT_LEN: usize = 20;

/// Capability provider for DSA keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DsaProvider;

fn uint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

fn verifying_key(material: &KeyMaterial) -> Result<VerifyingKey, KeyError> {
    let components = Components::from_components(
        uint(material.require(0, "p")?),
        uint(material.require(1, "q")?),
        uint(material.require(2, "g")?),
    )
    .map_err(|_| KeyError::invalid_material("invalid DSA domain parameters"))?;
    VerifyingKey::from_components(components, uint(material.require(3, "y")?))
        .map_err(|_| KeyError::invalid_material("invalid DSA public value"))
}

fn signing_key(private: &KeyMaterial) -> Result<SigningKey, KeyError> {
    let verifying_key = verifying_key(private)?;
    let x = uint(private.require(4, "x")?);
    let components = verifying_key.components();
    // y = g^x mod p
    if components.g().modpow(&x, components.p()) != *verifying_key.y() {
        return Err(KeyError::invalid_material(
            "DSA public value does not match private value",
        ));
    }
    SigningKey::from_components(verifying_key, x)
        .map_err(|_| KeyError::invalid_material("invalid DSA private value"))
}

impl SignatureProvider for DsaProvider {
    fn family(&self) -> Family {
        Family::Dsa
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
        #[allow(deprecated)]
        let components = Components::generate(&mut OsRng, KeySize::DSA_1024_160);
        let signing_key = SigningKey::generate(&mut OsRng, components);
        let verifying_key = signing_key.verifying_key();
        let components = verifying_key.components();

        let public = vec![
            components.p().to_bytes_be(),
            components.q().to_bytes_be(),
            components.g().to_bytes_be(),
            verifying_key.y().to_bytes_be(),
        ];
        let mut private = public.clone();
        private.push(signing_key.x().to_bytes_be());
        Ok((
            KeyMaterial::new(public),
            SecretMaterial::new(KeyMaterial::new(private)),
        ))
    }

    fn derive_public(&self, private: &KeyMaterial) -> Result<KeyMaterial, KeyError> {
        let fields = (0..4)
            .zip(["p", "q", "g", "y"])
            .map(|(index, name)| private.require(index, name).map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(KeyMaterial::new(fields))
    }

    fn sign(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        private: &KeyMaterial,
    ) -> Result<Vec<u8>, KeyError> {
        if algorithm != Algorithm::Dsa {
            return Err(KeyError::signing_failed(format!(
                "{algorithm} is not a DSA algorithm"
            )));
        }
        let key = signing_key(private)?;
        let signature: Signature = key
            .try_sign_digest(Sha1::new_with_prefix(message))
            .map_err(|_| KeyError::signing_failed("DSA signing failed"))?;

        let r = left_pad(&signature.r().to_bytes_be(), COMPONENT_LEN);
        let s = left_pad(&signature.s().to_bytes_be(), COMPONENT_LEN);
        match (r, s) {
            (Some(r), Some(s)) => Ok([r.as_slice(), s.as_slice()].concat()),
            _ => Err(KeyError::signing_failed(
                "DSA subgroup is larger than 160 bits",
            )),
        }
    }

    fn verify(
        &self,
        algorithm: Algorithm,
        message: &[u8],
        signature: &[u8],
        public: &KeyMaterial,
    ) -> bool {
        if algorithm != Algorithm::Dsa || signature.len() != 2 * COMPONENT_LEN {
            return false;
        }
        let Ok(key) = verifying_key(public) else {
            return false;
        };
        let (r, s) = signature.split_at(COMPONENT_LEN);
        let Ok(signature) = Signature::from_components(uint(r), uint(s)) else {
            return false;
        };
        key.verify_digest(Sha1::new_with_prefix(message), &signature)
            .is_ok()
    }

    fn validate_public(&self, public: &KeyMaterial) -> Result<(), DecodeError> {
        verifying_key(public)
            .map(|_| ())
            .map_err(|e| DecodeError::malformed(e.to_string()))
    }

    fn validate_private(&self, private: &KeyMaterial) -> Result<(), DecodeError> {
        signing_key(private)
            .map(|_| ())
            .map_err(|e| DecodeError::malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::unwrap_used)]

    use std::sync::OnceLock;

    use super::*;

    fn keypair() -> &'static (KeyMaterial, SecretMaterial) {
        static KEY: OnceLock<(KeyMaterial, SecretMaterial)> = OnceLock::new();
        KEY.get_or_init(|| {
            DsaProvider
                .generate(&GenerationConfig::default())
                .expect("generation should succeed")
        })
    }

    #[test]
    fn test_generated_parameters_are_ssh_sized() {
        let (public, private) = keypair();
        assert_eq!(public.len(), 4);
        assert_eq!(private.expose().len(), 5);
        assert_eq!(public.field(1).unwrap().len(), 20);
        assert_eq!(&DsaProvider.derive_public(private.expose()).unwrap(), public);
    }

    #[test]
    fn test_sign_verify() {
        let (public, private) = keypair();
        let sig = DsaProvider.sign(Algorithm::Dsa, b"hello, world!", private.expose()).unwrap();
        assert_eq!(sig.len(), 40);
        assert!(DsaProvider.verify(Algorithm::Dsa, b"hello, world!", &sig, public));
        assert!(!DsaProvider.verify(Algorithm::Dsa, b"goodbye", &sig, public));
    }

    #[test]
    fn test_malformed_signature_is_false() {
        let (public, _) = keypair();
        assert!(!DsaProvider.verify(Algorithm::Dsa, b"msg", &[0u8; 39], public));
        assert!(!DsaProvider.verify(Algorithm::Dsa, b"msg", &[0u8; 40], public));
    }

    #[test]
    fn test_validate_private_checks_public_value() {
        let (_, private) = keypair();
        assert!(DsaProvider.validate_private(private.expose()).is_ok());

        let mut fields = private.expose().fields().to_vec();
        fields[4] = vec![0x01, 0x02, 0x03];
        let mismatched = KeyMaterial::new(fields);
        assert!(DsaProvider.validate_private(&mismatched).is_err());
        assert!(DsaProvider.sign(Algorithm::Dsa, b"msg", &mismatched).is_err());
    }

    #[test]
    fn test_wrong_identifier_is_rejected() {
        let (_, private) = keypair();
        assert!(DsaProvider.sign(Algorithm::Rsa, b"msg", private.expose()).is_err());
    }
}
