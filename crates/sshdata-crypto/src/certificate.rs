//! OpenSSH certificates (`*-cert-v01@openssh.com`).
//!
//! # Wire layout
//!
//! ```text
//! string    certificate type
//! string    nonce
//! ...       subject public fields (no key-type name)
//! uint64    serial
//! uint32    type (1 = user, 2 = host)
//! string    key id
//! string    valid principals (nested strings)
//! uint64    valid after
//! uint64    valid before
//! string    critical options (nested name/data pairs)
//! string    extensions (nested name/data pairs)
//! string    reserved
//! string    signature key (CA public key blob)
//! string    signature (over every preceding byte)
//! ```
//!
//! # Verification
//!
//! Decoding verifies the CA signature unless [`VerifyMode::UnsafeNoVerify`]
//! is passed. Validity windows, principals, critical options and CA trust are
//! policy and checked separately, or all at once with [`Certificate::verify`].

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

use sshdata_core::{
    decode_signature, Algorithm, AlgorithmError, DecodeError, Error, Family, Reader, Result,
    VerifyFailure, Writer,
};

use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::registry::AlgorithmRegistry;

/// Named options: a name with either no data (a flag) or a string value.
pub type CertOptions = Vec<(String, Option<String>)>;

/// Certificate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CertType {
    /// Authenticates a user to a host.
    #[default]
    User,
    /// Authenticates a host to a user.
    Host,
}

impl CertType {
    /// The wire value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::User => 1,
            Self::Host => 2,
        }
    }
}

impl TryFrom<u32> for CertType {
    type Error = DecodeError;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::User),
            2 => Ok(Self::Host),
            other => Err(DecodeError::malformed(format!(
                "unknown certificate type {other}"
            ))),
        }
    }
}

/// Whether decoding checks the CA signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Verify the signature; a bad signature fails the decode.
    #[default]
    Verify,
    /// Skip the cryptographic check. Structural checks still run.
    UnsafeNoVerify,
}

/// Parameters for [`PrivateKey::issue_certificate`].
///
/// ```
/// use sshdata_crypto::{CertType, CertificateOptions};
///
/// let options = CertificateOptions::new("some ident")
///     .with_type(CertType::Host)
///     .with_principals(["host.example.com"])
///     .with_validity(1_700_000_000, 1_800_000_000);
/// assert_eq!(options.key_id, "some ident");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateOptions {
    /// Free-form identifier logged by servers.
    pub key_id: String,
    /// Serial number.
    pub serial: u64,
    /// User or host certificate.
    pub cert_type: CertType,
    /// Allowed principals; empty means any.
    pub principals: Vec<String>,
    /// Start of validity, seconds since the Unix epoch (inclusive).
    pub valid_after: u64,
    /// End of validity, seconds since the Unix epoch (exclusive).
    pub valid_before: u64,
    /// Options the relying party must understand.
    pub critical_options: CertOptions,
    /// Informational extensions.
    pub extensions: CertOptions,
    /// Signature identifier; defaults to [`PrivateKey::default_algorithm`] of the CA.
    pub signature_algorithm: Option<Algorithm>,
    /// Fixed nonce; a random one of the configured length otherwise.
    pub nonce: Option<Vec<u8>>,
}

impl Default for CertificateOptions {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            serial: 0,
            cert_type: CertType::User,
            principals: Vec::new(),
            valid_after: 0,
            valid_before: u64::MAX,
            critical_options: Vec::new(),
            extensions: Vec::new(),
            signature_algorithm: None,
            nonce: None,
        }
    }
}

impl CertificateOptions {
    /// Defaults with the given key id.
    #[must_use]
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            ..Self::default()
        }
    }

    /// Set the serial number.
    #[must_use]
    pub const fn with_serial(mut self, serial: u64) -> Self {
        self.serial = serial;
        self
    }

    /// Set the certificate type.
    #[must_use]
    pub const fn with_type(mut self, cert_type: CertType) -> Self {
        self.cert_type = cert_type;
        self
    }

    /// Set the allowed principals.
    #[must_use]
    pub fn with_principals<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principals = principals.into_iter().map(Into::into).collect();
        self
    }

    /// Set the validity window.
    #[must_use]
    pub const fn with_validity(mut self, valid_after: u64, valid_before: u64) -> Self {
        self.valid_after = valid_after;
        self.valid_before = valid_before;
        self
    }

    /// Add a critical option.
    #[must_use]
    pub fn with_critical_option(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.critical_options.push((name.into(), value));
        self
    }

    /// Add an extension.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.extensions.push((name.into(), value));
        self
    }

    /// Choose the signature identifier.
    #[must_use]
    pub const fn with_signature_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.signature_algorithm = Some(algorithm);
        self
    }
}

/// A parsed or issued certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    nonce: Vec<u8>,
    public_key: PublicKey,
    serial: u64,
    cert_type: CertType,
    key_id: String,
    principals: Vec<String>,
    valid_after: u64,
    valid_before: u64,
    critical_options: CertOptions,
    extensions: CertOptions,
    reserved: Vec<u8>,
    ca_key: PublicKey,
    signature: Vec<u8>,
}

pub(crate) fn issue(
    ca: &PrivateKey,
    subject: &PublicKey,
    options: CertificateOptions,
) -> Result<Certificate> {
    ca.ensure_live()?;
    let signature_algorithm = options
        .signature_algorithm
        .unwrap_or_else(|| ca.default_algorithm());
    if !ca.family().contains(signature_algorithm) {
        return Err(AlgorithmError::family_mismatch(ca.family(), signature_algorithm).into());
    }

    let nonce = options.nonce.unwrap_or_else(|| {
        let mut nonce = vec![0u8; ca.registry().certificate_config().nonce_len];
        rand::rngs::OsRng.fill_bytes(&mut nonce);
        nonce
    });

    let mut certificate = Certificate {
        nonce,
        public_key: subject.clone(),
        serial: options.serial,
        cert_type: options.cert_type,
        key_id: options.key_id,
        principals: options.principals,
        valid_after: options.valid_after,
        valid_before: options.valid_before,
        critical_options: options.critical_options,
        extensions: options.extensions,
        reserved: Vec::new(),
        ca_key: ca.public_key().clone(),
        signature: Vec::new(),
    };
    certificate.signature = ca.sign(&certificate.signed_data(), Some(signature_algorithm))?;

    tracing::debug!(
        cert_type = ?certificate.cert_type,
        key_id = %certificate.key_id,
        algorithm = %signature_algorithm,
        "issued certificate"
    );

    Ok(certificate)
}

fn write_options(writer: &mut Writer, options: &[(String, Option<String>)]) {
    writer.nested(|list| {
        for (name, value) in options {
            list.string(name);
            match value {
                Some(value) => list.nested(|data| {
                    data.string(value);
                }),
                None => list.bytes(&[]),
            };
        }
    });
}

fn read_options(reader: &mut Reader<'_>) -> std::result::Result<CertOptions, DecodeError> {
    let mut list = reader.read_nested()?;
    let mut options: CertOptions = Vec::new();
    while !list.is_empty() {
        let name = list.read_string()?.to_string();
        let mut data = list.read_nested()?;
        let value = if data.is_empty() {
            None
        } else {
            let value = data.read_string()?.to_string();
            data.finish()?;
            Some(value)
        };
        if options.iter().any(|(existing, _)| *existing == name) {
            return Err(DecodeError::malformed(format!("duplicate option {name}")));
        }
        options.push((name, value));
    }
    Ok(options)
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

impl Certificate {
    /// Parse and verify a certificate blob with the global registry.
    ///
    /// # Errors
    ///
    /// See [`decode_with`](Self::decode_with).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with(AlgorithmRegistry::global(), bytes, VerifyMode::Verify)
    }

    /// Parse a certificate blob.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for malformed input and
    /// [`Error::Verification`] when the signature is malformed, mismatched or,
    /// unless `mode` is [`VerifyMode::UnsafeNoVerify`], invalid.
    pub fn decode_with(registry: &AlgorithmRegistry, bytes: &[u8], mode: VerifyMode) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let family = Family::from_certificate_type(reader.read_string()?)?;
        let nonce = reader.read_bytes()?.to_vec();
        let public_key = PublicKey::read_fields(registry, family, &mut reader)?;
        let serial = reader.read_u64()?;
        let cert_type = CertType::try_from(reader.read_u32()?)?;
        let key_id = reader.read_string()?.to_string();
        let principals = reader.read_string_list()?;
        let valid_after = reader.read_u64()?;
        let valid_before = reader.read_u64()?;
        let critical_options = read_options(&mut reader)?;
        let extensions = read_options(&mut reader)?;
        let reserved = reader.read_bytes()?.to_vec();
        let ca_key = PublicKey::decode_with(registry, reader.read_bytes()?)?;
        let signature = reader.read_bytes()?.to_vec();
        reader.finish()?;

        let certificate = Self {
            nonce,
            public_key,
            serial,
            cert_type,
            key_id,
            principals,
            valid_after,
            valid_before,
            critical_options,
            extensions,
            reserved,
            ca_key,
            signature,
        };

        match mode {
            VerifyMode::Verify => certificate.verify_signature()?,
            VerifyMode::UnsafeNoVerify => {
                tracing::warn!(
                    key_id = %certificate.key_id,
                    "decoding certificate without verifying its signature"
                );
                certificate.check_signature_structure()?;
            }
        }
        Ok(certificate)
    }

    /// Encode as a certificate blob.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write_signed_data(&mut writer);
        writer.bytes(&self.signature);
        writer.into_bytes()
    }

    /// The bytes covered by the CA signature.
    #[must_use]
    pub fn signed_data(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write_signed_data(&mut writer);
        writer.into_bytes()
    }

    fn write_signed_data(&self, writer: &mut Writer) {
        writer
            .string(self.public_key.family().certificate_type())
            .bytes(&self.nonce);
        self.public_key.write_fields(writer);
        writer
            .u64(self.serial)
            .u32(self.cert_type.as_u32())
            .string(&self.key_id)
            .string_list(&self.principals)
            .u64(self.valid_after)
            .u64(self.valid_before);
        write_options(writer, &self.critical_options);
        write_options(writer, &self.extensions);
        writer
            .bytes(&self.reserved)
            .bytes(&self.ca_key.encode());
    }

    /// Check that the signature blob parses and names an identifier in the
    /// CA key's family.
    fn check_signature_structure(&self) -> std::result::Result<Algorithm, VerifyFailure> {
        let (algorithm, _, rest) =
            decode_signature(&self.signature).map_err(|_| VerifyFailure::MalformedSignature)?;
        if !rest.is_empty() {
            return Err(VerifyFailure::MalformedSignature);
        }
        if !self.ca_key.family().contains(algorithm) {
            return Err(VerifyFailure::AlgorithmMismatch {
                signature: algorithm,
                ca_key: self.ca_key.algorithm(),
            });
        }
        Ok(algorithm)
    }

    /// Verify the CA signature over the certificate.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyFailure`] describing why the signature was not
    /// accepted.
    pub fn verify_signature(&self) -> std::result::Result<(), VerifyFailure> {
        let algorithm = self.check_signature_structure()?;
        match self.ca_key.verify(&self.signed_data(), &self.signature) {
            Ok(true) => Ok(()),
            Ok(false) => Err(VerifyFailure::BadSignature),
            Err(Error::Algorithm(AlgorithmError::Unregistered { .. })) => {
                Err(VerifyFailure::UnsupportedAlgorithm(algorithm))
            }
            Err(_) => Err(VerifyFailure::MalformedSignature),
        }
    }

    /// Check the validity window at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyFailure::NotYetValid`] or [`VerifyFailure::Expired`].
    pub fn check_validity(&self, now: SystemTime) -> std::result::Result<(), VerifyFailure> {
        self.check_validity_at(unix_seconds(now))
    }

    /// Check the validity window at `now` seconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyFailure::NotYetValid`] or [`VerifyFailure::Expired`].
    pub const fn check_validity_at(&self, now: u64) -> std::result::Result<(), VerifyFailure> {
        if now < self.valid_after {
            return Err(VerifyFailure::NotYetValid {
                valid_after: self.valid_after,
            });
        }
        if now >= self.valid_before {
            return Err(VerifyFailure::Expired {
                valid_before: self.valid_before,
            });
        }
        Ok(())
    }

    /// Check that `principal` may use the certificate. An empty principal
    /// list allows anyone.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyFailure::PrincipalNotAllowed`].
    pub fn check_principal(&self, principal: &str) -> std::result::Result<(), VerifyFailure> {
        if self.principals.is_empty() || self.principals.iter().any(|p| p == principal) {
            Ok(())
        } else {
            Err(VerifyFailure::PrincipalNotAllowed(principal.to_string()))
        }
    }

    /// Check that every critical option is in `understood`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyFailure::UnrecognizedCriticalOption`] naming the first
    /// unknown option.
    pub fn check_critical_options(
        &self,
        understood: &[&str],
    ) -> std::result::Result<(), VerifyFailure> {
        match self
            .critical_options
            .iter()
            .find(|(name, _)| !understood.contains(&name.as_str()))
        {
            Some((name, _)) => Err(VerifyFailure::UnrecognizedCriticalOption(name.clone())),
            None => Ok(()),
        }
    }

    /// Verify the signature, the CA trust and the validity window.
    ///
    /// # Errors
    ///
    /// Returns the first [`VerifyFailure`] encountered, in that order.
    pub fn verify<F>(&self, is_trusted_ca: F, now: SystemTime) -> std::result::Result<(), VerifyFailure>
    where
        F: FnOnce(&PublicKey) -> bool,
    {
        self.verify_signature()?;
        if !is_trusted_ca(&self.ca_key) {
            return Err(VerifyFailure::UntrustedCa);
        }
        self.check_validity(now)
    }

    /// The certificate key-type name.
    #[must_use]
    pub const fn cert_type_name(&self) -> &'static str {
        self.public_key.family().certificate_type()
    }

    /// The nonce.
    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// The certified (subject) public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The serial number.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// User or host.
    #[must_use]
    pub const fn cert_type(&self) -> CertType {
        self.cert_type
    }

    /// The key id.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Allowed principals; empty means any.
    #[must_use]
    pub fn principals(&self) -> &[String] {
        &self.principals
    }

    /// Start of validity (inclusive).
    #[must_use]
    pub const fn valid_after(&self) -> u64 {
        self.valid_after
    }

    /// End of validity (exclusive).
    #[must_use]
    pub const fn valid_before(&self) -> u64 {
        self.valid_before
    }

    /// Critical options, in wire order.
    #[must_use]
    pub fn critical_options(&self) -> &[(String, Option<String>)] {
        &self.critical_options
    }

    /// Extensions, in wire order.
    #[must_use]
    pub fn extensions(&self) -> &[(String, Option<String>)] {
        &self.extensions
    }

    /// The reserved field.
    #[must_use]
    pub fn reserved(&self) -> &[u8] {
        &self.reserved
    }

    /// The CA public key.
    #[must_use]
    pub const fn ca_key(&self) -> &PublicKey {
        &self.ca_key
    }

    /// The CA signature blob.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The identifier named in the signature blob, if it parses.
    #[must_use]
    pub fn signature_algorithm(&self) -> Option<Algorithm> {
        decode_signature(&self.signature).ok().map(|(algo, _, _)| algo)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use super::*;

    fn ca() -> PrivateKey {
        PrivateKey::generate(Family::Ed25519).expect("generation should succeed")
    }

    fn issued(options: CertificateOptions) -> (PrivateKey, Certificate) {
        let ca = ca();
        let subject = PrivateKey::generate(Family::EcdsaP256).unwrap();
        let cert = ca.issue_certificate(subject.public_key(), options).unwrap();
        (ca, cert)
    }

    #[test]
    fn test_issue_defaults() {
        let (ca, cert) = issued(CertificateOptions::new("some ident"));
        assert_eq!(cert.key_id(), "some ident");
        assert_eq!(cert.cert_type(), CertType::User);
        assert_eq!(cert.serial(), 0);
        assert!(cert.principals().is_empty());
        assert_eq!(cert.valid_after(), 0);
        assert_eq!(cert.valid_before(), u64::MAX);
        assert_eq!(cert.nonce().len(), 32);
        assert_eq!(cert.ca_key(), ca.public_key());
        assert_eq!(cert.signature_algorithm(), Some(Algorithm::Ed25519));
        assert_eq!(
            cert.cert_type_name(),
            "ecdsa-sha2-nistp256-cert-v01@openssh.com"
        );
        assert!(cert.verify_signature().is_ok());
    }

    #[test]
    fn test_encode_decode() {
        let options = CertificateOptions::new("host key")
            .with_serial(42)
            .with_type(CertType::Host)
            .with_principals(["a.example.com", "b.example.com"])
            .with_validity(100, 200)
            .with_critical_option("source-address", Some("10.0.0.0/8".to_string()))
            .with_extension("permit-pty", None);
        let (_, cert) = issued(options);
        let decoded = Certificate::decode(&cert.encode()).unwrap();
        assert_eq!(decoded, cert);
        assert_eq!(
            decoded.critical_options(),
            &[("source-address".to_string(), Some("10.0.0.0/8".to_string()))]
        );
        assert_eq!(decoded.extensions(), &[("permit-pty".to_string(), None)]);
    }

    #[test]
    fn test_fixed_nonce_is_used() {
        let options = CertificateOptions {
            nonce: Some(vec![7; 16]),
            ..CertificateOptions::new("n")
        };
        let (_, cert) = issued(options);
        assert_eq!(cert.nonce(), &[7; 16]);
    }

    #[test]
    fn test_tampered_certificate_fails_to_decode() {
        let (_, cert) = issued(CertificateOptions::new("some ident").with_serial(1));
        let mut tampered = cert.clone();
        tampered.serial = 2;
        let bytes = tampered.encode();
        assert!(matches!(
            Certificate::decode(&bytes),
            Err(Error::Verification(VerifyFailure::BadSignature))
        ));

        let unchecked =
            Certificate::decode_with(AlgorithmRegistry::global(), &bytes, VerifyMode::UnsafeNoVerify)
                .unwrap();
        assert_eq!(unchecked.serial(), 2);
        assert_eq!(unchecked.verify_signature(), Err(VerifyFailure::BadSignature));
    }

    #[test]
    fn test_mismatched_signature_algorithm_is_reported() {
        let (_, cert) = issued(CertificateOptions::new("x"));
        let mut forged = cert;
        forged.signature = sshdata_core::encode_signature(Algorithm::RsaSha2_256, &[0; 64]);
        let expected = VerifyFailure::AlgorithmMismatch {
            signature: Algorithm::RsaSha2_256,
            ca_key: Algorithm::Ed25519,
        };
        assert_eq!(forged.verify_signature(), Err(expected.clone()));
        assert!(matches!(
            Certificate::decode_with(
                AlgorithmRegistry::global(),
                &forged.encode(),
                VerifyMode::UnsafeNoVerify
            ),
            Err(Error::Verification(failure)) if failure == expected
        ));
    }

    #[test]
    fn test_unknown_certificate_type_is_decode_error() {
        let (_, cert) = issued(CertificateOptions::new("x"));
        let mut bytes = cert.encode();
        // Replace the type name with an unknown one of the same length.
        bytes[4] = b'x';
        assert!(Certificate::decode(&bytes).unwrap_err().is_decode());
    }

    #[test]
    fn test_cert_type_values() {
        assert!(CertType::try_from(3).is_err());
        assert_eq!(CertType::try_from(2), Ok(CertType::Host));
    }

    #[test]
    fn test_validity_bounds() {
        let (_, cert) = issued(CertificateOptions::new("x").with_validity(100, 200));
        assert_eq!(
            cert.check_validity_at(99),
            Err(VerifyFailure::NotYetValid { valid_after: 100 })
        );
        assert!(cert.check_validity_at(100).is_ok());
        assert!(cert.check_validity_at(199).is_ok());
        assert_eq!(
            cert.check_validity_at(200),
            Err(VerifyFailure::Expired { valid_before: 200 })
        );
        let at = UNIX_EPOCH + Duration::from_secs(150);
        assert!(cert.check_validity(at).is_ok());
    }

    #[test]
    fn test_principals() {
        let (_, open) = issued(CertificateOptions::new("x"));
        assert!(open.check_principal("anyone").is_ok());

        let (_, limited) = issued(CertificateOptions::new("x").with_principals(["alice"]));
        assert!(limited.check_principal("alice").is_ok());
        assert_eq!(
            limited.check_principal("bob"),
            Err(VerifyFailure::PrincipalNotAllowed("bob".to_string()))
        );
    }

    #[test]
    fn test_critical_options_must_be_understood() {
        let (_, cert) = issued(
            CertificateOptions::new("x").with_critical_option("force-command", Some("ls".into())),
        );
        assert!(cert.check_critical_options(&["force-command"]).is_ok());
        assert_eq!(
            cert.check_critical_options(&["source-address"]),
            Err(VerifyFailure::UnrecognizedCriticalOption(
                "force-command".to_string()
            ))
        );
    }

    #[test]
    fn test_verify_applies_trust_and_time() {
        let (ca, cert) = issued(CertificateOptions::new("x").with_validity(100, 200));
        let at = UNIX_EPOCH + Duration::from_secs(150);
        assert!(cert.verify(|key| key == ca.public_key(), at).is_ok());
        assert_eq!(cert.verify(|_| false, at), Err(VerifyFailure::UntrustedCa));
        assert_eq!(
            cert.verify(|_| true, UNIX_EPOCH + Duration::from_secs(300)),
            Err(VerifyFailure::Expired { valid_before: 200 })
        );
    }

    #[test]
    fn test_duplicate_options_are_rejected() {
        let options = vec![
            ("permit-pty".to_string(), None),
            ("permit-pty".to_string(), None),
        ];
        let mut writer = Writer::new();
        write_options(&mut writer, &options);
        let mut reader = Reader::new(writer.as_bytes());
        assert!(read_options(&mut reader).is_err());
    }

    #[test]
    fn test_option_wire_layout() {
        let options = vec![
            ("a".to_string(), None),
            ("b".to_string(), Some("v".to_string())),
        ];
        let mut writer = Writer::new();
        write_options(&mut writer, &options);
        let expected: &[u8] = &[
            0, 0, 0, 23, // list
            0, 0, 0, 1, b'a', 0, 0, 0, 0, // flag
            0, 0, 0, 1, b'b', 0, 0, 0, 5, 0, 0, 0, 1, b'v', // value
        ];
        assert_eq!(writer.as_bytes(), expected);
    }

    #[test]
    fn test_issue_with_released_ca_fails() {
        let mut ca = ca();
        let subject = PrivateKey::generate(Family::Ed25519).unwrap();
        ca.release();
        assert!(matches!(
            ca.issue_certificate(subject.public_key(), CertificateOptions::new("x")),
            Err(Error::Key(sshdata_core::KeyError::Released))
        ));
    }

    #[test]
    fn test_issue_with_foreign_algorithm_fails() {
        let ca = ca();
        let subject = PrivateKey::generate(Family::Ed25519).unwrap();
        let err = ca
            .issue_certificate(
                subject.public_key(),
                CertificateOptions::new("x").with_signature_algorithm(Algorithm::Dsa),
            )
            .unwrap_err();
        assert!(err.is_algorithm());
    }
}
