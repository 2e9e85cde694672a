//! Unencrypted `openssh-key-v1` private key containers.
//!
//! ```text
//! "openssh-key-v1\0"
//! string    cipher name ("none")
//! string    kdf name ("none")
//! string    kdf options (empty)
//! uint32    number of keys N
//! string    public key blob, N times
//! string    private section:
//!     uint32    check integer
//!     uint32    check integer (equal to the first)
//!     ...       private key record, N times
//!     byte      padding 1, 2, 3, ... up to a multiple of 8
//! ```

use rand::RngCore;
use zeroize::Zeroizing;

use sshdata_core::{DecodeError, KeyError, Reader, Result, Writer};

use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::registry::AlgorithmRegistry;

/// Container magic, including the trailing NUL.
pub const MAGIC: &[u8] = b"openssh-key-v1\0";

const BLOCK_SIZE: usize = 8;

/// Parse a container with the global registry.
///
/// # Errors
///
/// See [`decode_private_keys_with`].
pub fn decode_private_keys(bytes: &[u8]) -> Result<Vec<PrivateKey>> {
    decode_private_keys_with(AlgorithmRegistry::global(), bytes)
}

/// Parse a container of unencrypted private keys.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the magic, check integers or padding are
/// wrong, the keys are encrypted, or a header public key does not match the
/// private key it precedes.
pub fn decode_private_keys_with(
    registry: &AlgorithmRegistry,
    bytes: &[u8],
) -> Result<Vec<PrivateKey>> {
    let mut reader = Reader::new(bytes);
    if reader.read_raw(MAGIC.len())? != MAGIC {
        return Err(DecodeError::malformed("missing openssh-key-v1 magic").into());
    }
    let cipher = reader.read_string()?;
    let kdf = reader.read_string()?;
    let _kdf_options = reader.read_bytes()?;
    if cipher != "none" || kdf != "none" {
        return Err(DecodeError::malformed(format!(
            "encrypted keys are not supported (cipher {cipher}, kdf {kdf})"
        ))
        .into());
    }

    let count = reader.read_u32()?;
    let mut public_keys = Vec::new();
    for _ in 0..count {
        public_keys.push(PublicKey::decode_with(registry, reader.read_bytes()?)?);
    }
    let private_section = reader.read_bytes()?;
    reader.finish()?;

    let mut private = Reader::new(private_section);
    if private.read_u32()? != private.read_u32()? {
        return Err(DecodeError::malformed("check integers do not match").into());
    }

    let mut keys = Vec::with_capacity(public_keys.len());
    for public_key in &public_keys {
        let key = PrivateKey::read_from(registry, &mut private)?;
        if key.public_key() != public_key {
            return Err(DecodeError::malformed("public key does not match private key").into());
        }
        keys.push(key);
    }

    let padding = private.remaining();
    if padding.len() >= BLOCK_SIZE || !padding.iter().copied().eq((1u8..).take(padding.len())) {
        return Err(DecodeError::malformed("invalid private section padding").into());
    }

    tracing::debug!(count = keys.len(), "decoded private key container");

    Ok(keys)
}

/// Encode keys as an unencrypted container.
///
/// # Errors
///
/// Returns [`KeyError::Released`] if any key has been released.
pub fn encode_private_keys(keys: &[&PrivateKey]) -> Result<Zeroizing<Vec<u8>>> {
    let count = u32::try_from(keys.len())
        .map_err(|_| KeyError::invalid_material("too many keys for one container"))?;
    let check = rand::rngs::OsRng.next_u32();

    let mut private = Writer::new();
    private.u32(check).u32(check);
    for key in keys {
        private.raw(&key.encode()?);
    }
    let mut pad = 1u8;
    while private.len() % BLOCK_SIZE != 0 {
        private.u8(pad);
        pad += 1;
    }
    let private = Zeroizing::new(private.into_bytes());

    let mut writer = Writer::new();
    writer
        .raw(MAGIC)
        .string("none")
        .string("none")
        .bytes(&[])
        .u32(count);
    for key in keys {
        writer.bytes(&key.public_key().encode());
    }
    writer.bytes(&private);
    Ok(Zeroizing::new(writer.into_bytes()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::unwrap_used)]

    use sshdata_core::{Error, Family};

    use super::*;

    fn container(keys: &[&PrivateKey]) -> Vec<u8> {
        encode_private_keys(keys).unwrap().to_vec()
    }

    #[test]
    fn test_round_trip_multiple_keys() {
        let mut a = PrivateKey::generate(Family::Ed25519).unwrap();
        a.set_comment("first");
        let b = PrivateKey::generate(Family::EcdsaP384).unwrap();
        let bytes = container(&[&a, &b]);
        assert!(bytes.starts_with(MAGIC));

        let keys = decode_private_keys(&bytes).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], a);
        assert_eq!(keys[0].comment(), "first");
        assert_eq!(keys[1], b);
    }

    #[test]
    fn test_empty_container() {
        let bytes = container(&[]);
        assert!(decode_private_keys(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_private_section_is_block_aligned() {
        let key = PrivateKey::generate(Family::Ed25519).unwrap();
        let bytes = container(&[&key]);
        let mut reader = Reader::new(&bytes);
        reader.read_raw(MAGIC.len()).unwrap();
        reader.read_string().unwrap();
        reader.read_string().unwrap();
        reader.read_bytes().unwrap();
        assert_eq!(reader.read_u32().unwrap(), 1);
        reader.read_bytes().unwrap();
        let private = reader.read_bytes().unwrap();
        assert_eq!(private.len() % BLOCK_SIZE, 0);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let key = PrivateKey::generate(Family::Ed25519).unwrap();
        let mut bytes = container(&[&key]);
        bytes[0] = b'X';
        assert!(decode_private_keys(&bytes).unwrap_err().is_decode());
    }

    #[test]
    fn test_encrypted_container_is_rejected() {
        let mut writer = Writer::new();
        writer
            .raw(MAGIC)
            .string("aes256-ctr")
            .string("bcrypt")
            .bytes(b"salt")
            .u32(0)
            .bytes(&[]);
        let err = decode_private_keys(writer.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Malformed { .. })));
    }

    #[test]
    fn test_mismatched_check_integers_are_rejected() {
        let mut private = Writer::new();
        private.u32(1).u32(2);
        let mut writer = Writer::new();
        writer
            .raw(MAGIC)
            .string("none")
            .string("none")
            .bytes(&[])
            .u32(0)
            .bytes(private.as_bytes());
        assert!(decode_private_keys(writer.as_bytes()).unwrap_err().is_decode());
    }

    #[test]
    fn test_mismatched_public_key_is_rejected() {
        let a = PrivateKey::generate(Family::Ed25519).unwrap();
        let b = PrivateKey::generate(Family::Ed25519).unwrap();

        let mut private = Writer::new();
        private.u32(9).u32(9).raw(&a.encode().unwrap());
        let mut pad = 1u8;
        while private.len() % BLOCK_SIZE != 0 {
            private.u8(pad);
            pad += 1;
        }
        let mut writer = Writer::new();
        writer
            .raw(MAGIC)
            .string("none")
            .string("none")
            .bytes(&[])
            .u32(1)
            .bytes(&b.public_key().encode())
            .bytes(private.as_bytes());
        assert!(decode_private_keys(writer.as_bytes()).unwrap_err().is_decode());
    }

    #[test]
    fn test_released_key_cannot_be_exported() {
        let mut key = PrivateKey::generate(Family::Ed25519).unwrap();
        key.release();
        assert!(matches!(
            encode_private_keys(&[&key]),
            Err(Error::Key(KeyError::Released))
        ));
    }
}
