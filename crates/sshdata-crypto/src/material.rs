//! Key material containers.
//!
//! Key material is an ordered list of wire fields whose meaning is fixed by
//! the family's schema (see [`crate::provider::MaterialField`]). Integers are
//! stored as minimal big-endian magnitudes; byte strings are stored verbatim.
//!
//! # Security
//!
//! - [`SecretMaterial`] does not implement `Clone`
//! - Debug output of secret material is redacted
//! - Secret material is compared in constant time and zeroized on drop

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use sshdata_core::KeyError;

/// An ordered list of key fields.
///
/// ```
/// use sshdata_crypto::material::KeyMaterial;
///
/// let material = KeyMaterial::new(vec![vec![0x01, 0x00, 0x01], vec![0xc3; 4]]);
/// assert_eq!(material.len(), 2);
/// assert_eq!(material.field(0), Some(&[0x01, 0x00, 0x01][..]));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default, Zeroize)]
pub struct KeyMaterial {
    fields: Vec<Vec<u8>>,
}

impl KeyMaterial {
    /// Wrap an ordered field list.
    #[must_use]
    pub const fn new(fields: Vec<Vec<u8>>) -> Self {
        Self { fields }
    }

    /// All fields, in schema order.
    #[must_use]
    pub fn fields(&self) -> &[Vec<u8>] {
        &self.fields
    }

    /// The field at `index`, if present.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&[u8]> {
        self.fields.get(index).map(Vec::as_slice)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the material holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field at `index`, or an error naming it.
    pub(crate) fn require(&self, index: usize, name: &str) -> Result<&[u8], KeyError> {
        self.field(index)
            .ok_or_else(|| KeyError::invalid_material(format!("missing field {name}")))
    }

    /// Overwrite every field with zeros, then drop them.
    pub(crate) fn wipe(&mut self) {
        self.fields.zeroize();
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(hex::encode))
            .finish()
    }
}

impl From<Vec<Vec<u8>>> for KeyMaterial {
    fn from(fields: Vec<Vec<u8>>) -> Self {
        Self::new(fields)
    }
}

/// Private key material with zeroization on release and drop.
///
/// **Important**: This type intentionally does not implement `Clone`.
///
/// ```
/// use sshdata_crypto::material::{KeyMaterial, SecretMaterial};
///
/// let mut secret = SecretMaterial::new(KeyMaterial::new(vec![vec![0x42; 32]]));
/// assert_eq!(format!("{secret:?}"), "SecretMaterial([REDACTED])");
///
/// secret.release();
/// assert!(secret.is_released());
/// assert!(secret.expose().is_empty());
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretMaterial {
    inner: KeyMaterial,
}

impl SecretMaterial {
    /// Take ownership of private fields.
    #[must_use]
    pub const fn new(inner: KeyMaterial) -> Self {
        Self { inner }
    }

    /// Borrow the fields for an immediate cryptographic operation.
    #[must_use]
    pub const fn expose(&self) -> &KeyMaterial {
        &self.inner
    }

    /// Zero every field and release the storage. Idempotent.
    pub fn release(&mut self) {
        self.inner.wipe();
    }

    /// Whether [`release`](Self::release) has emptied the material.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.is_empty()
    }
}

// Prevent accidental debug printing of secrets
impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretMaterial([REDACTED])")
    }
}

// Constant-time over field contents; field count and lengths are not secret.
impl PartialEq for SecretMaterial {
    fn eq(&self, other: &Self) -> bool {
        let ours = self.inner.fields();
        let theirs = other.inner.fields();
        if ours.len() != theirs.len() {
            return false;
        }
        let mut equal = subtle::Choice::from(1u8);
        for (a, b) in ours.iter().zip(theirs) {
            equal &= a.as_slice().ct_eq(b.as_slice());
        }
        equal.into()
    }
}

impl Eq for SecretMaterial {}
