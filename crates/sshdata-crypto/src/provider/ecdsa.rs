//! ECDSA providers for the NIST curves.
//!
//! Public material is `[curve name, SEC1 uncompressed point]`; private
//! material appends the scalar. The digest follows the curve size (SHA-256,
//! SHA-384 and SHA-512 respectively), and the raw signature is `mpint r`
//! followed by `mpint s`.

use rand::rngs::OsRng;
use signature::{Signer, Verifier};
use zeroize::Zeroizing;

use sshdata_core::{Algorithm, DecodeError, Family, GenerationConfig, KeyError, Reader, Writer};

use super::{left_pad, trim_magnitude, MaterialField, SignatureProvider};
use crate::material::{KeyMaterial, SecretMaterial};

const PUBLIC_SCHEMA: &[MaterialField] = &[MaterialField::String("curve"), MaterialField::String("Q")];

const PRIVATE_SCHEMA: &[MaterialField] = &[
    MaterialField::String("curve"),
    MaterialField::String("Q"),
    MaterialField::Mpint("d"),
];

fn check_curve(family: Family, material: &KeyMaterial) -> Result<(), DecodeError> {
    let expected = family.curve_name().unwrap_or_default();
    match material.field(0) {
        Some(curve) if curve == expected.as_bytes() => Ok(()),
        Some(curve) => Err(DecodeError::malformed(format!(
            "curve {} does not match {}",
            String::from_utf8_lossy(curve),
            family.primary()
        ))),
        None => Err(DecodeError::malformed("missing curve name")),
    }
}

/// Split a raw `mpint r, mpint s` signature into fixed-width `r ‖ s`.
fn fixed_width_signature(signature: &[u8], scalar_len: usize) -> Option<Vec<u8>> {
    let mut reader = Reader::new(signature);
    let r = reader.read_mpint().ok()?;
    let s = reader.read_mpint().ok()?;
    reader.finish().ok()?;
    let r = left_pad(r, scalar_len)?;
    let s = left_pad(s, scalar_len)?;
    Some([r.as_slice(), s.as_slice()].concat())
}

macro_rules! ecdsa_provider {
    ($(#[$meta:meta])* $name:ident, $curve:ident, $family:expr, $algorithm:expr, $scalar_len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $name {
            fn signing_key(private: &KeyMaterial) -> Result<$curve::ecdsa::SigningKey, KeyError> {
                let scalar = left_pad(private.require(2, "d")?, $scalar_len)
                    .ok_or_else(|| KeyError::invalid_material("ECDSA scalar is too long"))?;
                $curve::ecdsa::SigningKey::from_slice(&scalar)
                    .map_err(|_| KeyError::invalid_material("invalid ECDSA scalar"))
            }

            fn verifying_key(public: &KeyMaterial) -> Option<$curve::ecdsa::VerifyingKey> {
                $curve::ecdsa::VerifyingKey::from_sec1_bytes(public.field(1)?).ok()
            }
        }

        impl SignatureProvider for $name {
            fn family(&self) -> Family {
                $family
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
                let signing_key = $curve::ecdsa::SigningKey::random(&mut OsRng);
                let verifying_key = $curve::ecdsa::VerifyingKey::from(&signing_key);
                let curve = $family.curve_name().unwrap_or_default().as_bytes().to_vec();
                let point = verifying_key.to_encoded_point(false).as_bytes().to_vec();
                let scalar = Zeroizing::new(signing_key.to_bytes().to_vec());

                let public = KeyMaterial::new(vec![curve.clone(), point.clone()]);
                let private = SecretMaterial::new(KeyMaterial::new(vec![
                    curve,
                    point,
                    trim_magnitude(&scalar),
                ]));
                Ok((public, private))
            }

            fn derive_public(&self, private: &KeyMaterial) -> Result<KeyMaterial, KeyError> {
                let curve = private.require(0, "curve")?;
                let point = private.require(1, "Q")?;
                Ok(KeyMaterial::new(vec![curve.to_vec(), point.to_vec()]))
            }

            fn sign(
                &self,
                algorithm: Algorithm,
                message: &[u8],
                private: &KeyMaterial,
            ) -> Result<Vec<u8>, KeyError> {
                if algorithm != $algorithm {
                    return Err(KeyError::signing_failed(format!(
                        "{algorithm} does not match {}",
                        $algorithm
                    )));
                }
                let key = Self::signing_key(private)?;
                let signature: $curve::ecdsa::Signature = key
                    .try_sign(message)
                    .map_err(|_| KeyError::signing_failed("ECDSA signing failed"))?;
                let (r, s) = signature.split_bytes();
                let mut writer = Writer::new();
                writer.mpint(&r).mpint(&s);
                Ok(writer.into_bytes())
            }

            fn verify(
                &self,
                algorithm: Algorithm,
                message: &[u8],
                signature: &[u8],
                public: &KeyMaterial,
            ) -> bool {
                if algorithm != $algorithm {
                    return false;
                }
                let Some(key) = Self::verifying_key(public) else {
                    return false;
                };
                let Some(fixed) = fixed_width_signature(signature, $scalar_len) else {
                    return false;
                };
                let Ok(signature) = $curve::ecdsa::Signature::from_slice(&fixed) else {
                    return false;
                };
                key.verify(message, &signature).is_ok()
            }

            fn validate_public(&self, public: &KeyMaterial) -> Result<(), DecodeError> {
                check_curve($family, public)?;
                Self::verifying_key(public)
                    .map(|_| ())
                    .ok_or_else(|| DecodeError::malformed("invalid ECDSA point"))
            }

            fn validate_private(&self, private: &KeyMaterial) -> Result<(), DecodeError> {
                check_curve($family, private)?;
                let key = Self::signing_key(private)
                    .map_err(|e| DecodeError::malformed(e.to_string()))?;
                let point = $curve::ecdsa::VerifyingKey::from(&key)
                    .to_encoded_point(false);
                if private.field(1) == Some(point.as_bytes()) {
                    Ok(())
                } else {
                    Err(DecodeError::malformed("ECDSA point does not match scalar"))
                }
            }
        }
    };
}

ecdsa_provider!(
    /// Capability provider for `ecdsa-sha2-nistp256`.
    EcdsaP256Provider,
    p256,
    Family::EcdsaP256,
    Algorithm::EcdsaP256,
    32
);

ecdsa_provider!(
    /// Capability provider for `ecdsa-sha2-nistp384`.
    EcdsaP384Provider,
    p384,
    Family::EcdsaP384,
    Algorithm::EcdsaP384,
    48
);

ecdsa_provider!(
    /// Capability provider for `ecdsa-sha2-nistp521`.
    EcdsaP521Provider,
    p521,
    Family::EcdsaP521,
    Algorithm::EcdsaP521,
    66
);
