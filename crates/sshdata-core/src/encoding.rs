//! SSH field encoding (RFC 4251 §5).
//!
//! Every structure in this workspace is built from a handful of primitive
//! wire types:
//!
//! | Type | Encoding |
//! |---|---|
//! | `byte` | 1 byte |
//! | `boolean` | 1 byte, 0 or 1 |
//! | `uint32` / `uint64` | big-endian |
//! | `string` | `uint32` length followed by the bytes |
//! | `mpint` | `string` holding a minimal big-endian two's-complement integer |
//! | nested | a field list encoded on its own, then written as one `string` |
//!
//! [`Writer`] and [`Reader`] are the workhorses; [`encode_fields`] and
//! [`decode`] offer the same grammar as a list of typed [`Field`]s.
//!
//! # Example
//!
//! ```
//! use sshdata_core::encoding::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.string("ssh-rsa").mpint(&[0x01, 0x00, 0x01]);
//! let bytes = writer.into_bytes();
//!
//! let mut reader = Reader::new(&bytes);
//! assert_eq!(reader.read_string().unwrap(), "ssh-rsa");
//! assert_eq!(reader.read_mpint().unwrap(), &[0x01, 0x00, 0x01]);
//! assert!(reader.finish().is_ok());
//! ```
//!
//! Decoding never reads past the supplied buffer: a length prefix that
//! claims more bytes than remain yields [`DecodeError::Truncated`].

use crate::error::DecodeError;

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

// ============================================================================
// Writer
// ============================================================================

/// Appends SSH wire fields to a byte buffer.
///
/// Methods return `&mut Self` so fields can be chained in wire order.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Write a single byte.
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    /// Write a big-endian `uint32`.
    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Write a big-endian `uint64`.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Write a boolean as a single 0/1 byte.
    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u8(u8::from(value))
    }

    /// Write a length-prefixed byte string.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than `u32::MAX` bytes, which the wire
    /// format cannot represent.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        #[allow(clippy::expect_used)]
        let len = u32::try_from(data.len()).expect("SSH string longer than u32::MAX");
        self.u32(len);
        self.buf.extend_from_slice(data);
        self
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn string(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes())
    }

    /// Write a non-negative integer given as big-endian magnitude bytes.
    ///
    /// Leading zero bytes are stripped; a single `0x00` is prepended when the
    /// most significant bit of the first remaining byte is set. Zero encodes
    /// as the empty string.
    ///
    /// # Panics
    ///
    /// Panics if the encoded integer is longer than `u32::MAX` bytes.
    pub fn mpint(&mut self, magnitude: &[u8]) -> &mut Self {
        let start = magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(magnitude.len());
        let trimmed = &magnitude[start..];

        match trimmed.first() {
            Some(&first) if first & 0x80 != 0 => {
                #[allow(clippy::expect_used)]
                let len = u32::try_from(trimmed.len() + 1).expect("mpint longer than u32::MAX");
                self.u32(len);
                self.buf.push(0);
                self.buf.extend_from_slice(trimmed);
                self
            }
            _ => self.bytes(trimmed),
        }
    }

    /// Write a field list as a single length-prefixed blob.
    pub fn nested<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut Writer),
    {
        let mut inner = Writer::new();
        build(&mut inner);
        self.bytes(&inner.buf)
    }

    /// Write a list of strings as a nested blob of consecutive strings.
    pub fn string_list<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.nested(|w| {
            for item in items {
                w.string(item.as_ref());
            }
        })
    }

    /// Append bytes verbatim, without a length prefix.
    pub fn raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer, returning the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Reads SSH wire fields from a borrowed buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Create a reader over `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// The unread portion of the buffer.
    #[must_use]
    pub const fn remaining(&self) -> &'a [u8] {
        self.buf
    }

    /// Number of unread bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if n > self.buf.len() {
            return Err(DecodeError::truncated(n, self.buf.len()));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the buffer is empty.
    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Read a big-endian `uint32`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.take_array().map(u32::from_be_bytes)
    }

    /// Read a big-endian `uint64`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        self.take_array().map(u64::from_be_bytes)
    }

    /// Read a boolean byte.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidBool`] for bytes other than 0 and 1.
    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    /// Read a length-prefixed byte string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the prefix or the body is cut short.
    pub fn read_bytes(&mut self) -> DecodeResult<&'a [u8]> {
        let len = self.read_u32()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::truncated(usize::MAX, self.len()))?;
        self.take(len)
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidUtf8`] if the body is not UTF-8.
    pub fn read_string(&mut self) -> DecodeResult<&'a str> {
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Read a non-negative `mpint`, returning its minimal magnitude bytes.
    ///
    /// Zero decodes to an empty slice.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NegativeMpint`] when the sign bit is set and
    /// [`DecodeError::Malformed`] for non-minimal encodings.
    pub fn read_mpint(&mut self) -> DecodeResult<&'a [u8]> {
        let bytes = self.read_bytes()?;
        match bytes {
            [] => Ok(bytes),
            [first, ..] if first & 0x80 != 0 => Err(DecodeError::NegativeMpint),
            [0, rest @ ..] => match rest.first() {
                Some(&next) if next & 0x80 != 0 => Ok(rest),
                _ => Err(DecodeError::malformed("non-minimal mpint")),
            },
            _ => Ok(bytes),
        }
    }

    /// Read a length-prefixed blob and return a reader over its contents.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the blob is cut short.
    pub fn read_nested(&mut self) -> DecodeResult<Reader<'a>> {
        self.read_bytes().map(Reader::new)
    }

    /// Read a nested blob of consecutive strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob or any string inside it is malformed.
    pub fn read_string_list(&mut self) -> DecodeResult<Vec<String>> {
        let mut inner = self.read_nested()?;
        let mut items = Vec::new();
        while !inner.is_empty() {
            items.push(inner.read_string()?.to_string());
        }
        Ok(items)
    }

    /// Read `n` bytes verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if fewer than `n` bytes remain.
    pub fn read_raw(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        self.take(n)
    }

    /// Ensure the whole buffer was consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TrailingBytes`] if anything is left over.
    pub fn finish(self) -> DecodeResult<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes {
                count: self.buf.len(),
            })
        }
    }
}

// ============================================================================
// Typed field lists
// ============================================================================

/// The wire type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single byte.
    U8,
    /// A `uint32`.
    U32,
    /// A `uint64`.
    U64,
    /// A boolean byte.
    Bool,
    /// An opaque length-prefixed byte string.
    Bytes,
    /// A length-prefixed UTF-8 string.
    String,
    /// A non-negative multi-precision integer.
    Mpint,
    /// A nested blob of strings.
    StringList,
    /// A nested field list, returned undecoded.
    Nested,
}

/// A value to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<'a> {
    /// A single byte.
    U8(u8),
    /// A `uint32`.
    U32(u32),
    /// A `uint64`.
    U64(u64),
    /// A boolean byte.
    Bool(bool),
    /// An opaque byte string.
    Bytes(&'a [u8]),
    /// A UTF-8 string.
    String(&'a str),
    /// A non-negative integer as big-endian magnitude bytes.
    Mpint(&'a [u8]),
    /// A list of strings, nested.
    StringList(&'a [String]),
    /// A field list encoded as a single nested blob.
    List(Vec<Field<'a>>),
}

/// A decoded value, borrowing from the input where possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// A single byte.
    U8(u8),
    /// A `uint32`.
    U32(u32),
    /// A `uint64`.
    U64(u64),
    /// A boolean byte.
    Bool(bool),
    /// An opaque byte string.
    Bytes(&'a [u8]),
    /// A UTF-8 string.
    String(&'a str),
    /// Magnitude bytes of a non-negative integer.
    Mpint(&'a [u8]),
    /// A list of strings.
    StringList(Vec<String>),
    /// The contents of a nested blob.
    Nested(&'a [u8]),
}

impl Writer {
    /// Write a single typed field.
    pub fn field(&mut self, field: &Field<'_>) -> &mut Self {
        match field {
            Field::U8(v) => self.u8(*v),
            Field::U32(v) => self.u32(*v),
            Field::U64(v) => self.u64(*v),
            Field::Bool(v) => self.bool(*v),
            Field::Bytes(v) => self.bytes(v),
            Field::String(v) => self.string(v),
            Field::Mpint(v) => self.mpint(v),
            Field::StringList(v) => self.string_list(v.iter()),
            Field::List(fields) => self.nested(|w| {
                for f in fields {
                    w.field(f);
                }
            }),
        }
    }
}

impl<'a> Reader<'a> {
    /// Read a single field of the given kind.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying primitive read.
    pub fn read_field(&mut self, kind: FieldKind) -> DecodeResult<FieldValue<'a>> {
        Ok(match kind {
            FieldKind::U8 => FieldValue::U8(self.read_u8()?),
            FieldKind::U32 => FieldValue::U32(self.read_u32()?),
            FieldKind::U64 => FieldValue::U64(self.read_u64()?),
            FieldKind::Bool => FieldValue::Bool(self.read_bool()?),
            FieldKind::Bytes => FieldValue::Bytes(self.read_bytes()?),
            FieldKind::String => FieldValue::String(self.read_string()?),
            FieldKind::Mpint => FieldValue::Mpint(self.read_mpint()?),
            FieldKind::StringList => FieldValue::StringList(self.read_string_list()?),
            FieldKind::Nested => FieldValue::Nested(self.read_bytes()?),
        })
    }
}

/// Encode an ordered list of fields.
///
/// ```
/// use sshdata_core::encoding::{encode_fields, Field};
///
/// let bytes = encode_fields(&[Field::String("a"), Field::Mpint(&[0x80])]);
/// assert_eq!(bytes, [0, 0, 0, 1, b'a', 0, 0, 0, 2, 0x00, 0x80]);
/// ```
#[must_use]
pub fn encode_fields(fields: &[Field<'_>]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.field(field);
    }
    writer.into_bytes()
}

/// Decode one field from the front of `bytes`, returning the rest.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the field is truncated or malformed.
pub fn decode(bytes: &[u8], kind: FieldKind) -> DecodeResult<(FieldValue<'_>, &[u8])> {
    let mut reader = Reader::new(bytes);
    let value = reader.read_field(kind)?;
    Ok((value, reader.remaining()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_integers_are_big_endian() {
        let mut w = Writer::new();
        w.u8(0xab).u32(0x0102_0304).u64(0x0506_0708_090a_0b0c).bool(true);
        assert_eq!(
            w.as_bytes(),
            &[0xab, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 1]
        );

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0xab);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.read_u64().unwrap(), 0x0506_0708_090a_0b0c);
        assert!(r.read_bool().unwrap());
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_mpint_encoding_rfc4251_examples() {
        // Examples from RFC 4251 section 5.
        let cases: [(&[u8], &[u8]); 3] = [
            (&[], &[0, 0, 0, 0]),
            (
                &[0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7],
                &[0, 0, 0, 8, 0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7],
            ),
            (&[0x80], &[0, 0, 0, 2, 0x00, 0x80]),
        ];
        for (magnitude, expected) in cases {
            let mut w = Writer::new();
            w.mpint(magnitude);
            assert_eq!(w.as_bytes(), expected);
        }
    }

    #[test]
    fn test_mpint_strips_leading_zeros() {
        let mut w = Writer::new();
        w.mpint(&[0, 0, 0x7f]);
        assert_eq!(w.as_bytes(), &[0, 0, 0, 1, 0x7f]);

        let mut w = Writer::new();
        w.mpint(&[0, 0, 0]);
        assert_eq!(w.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_read_mpint_strips_sign_byte() {
        let data = [0, 0, 0, 2, 0x00, 0x80];
        assert_eq!(Reader::new(&data).read_mpint().unwrap(), &[0x80]);
    }

    #[test]
    fn test_read_mpint_rejects_negative() {
        let data = [0, 0, 0, 1, 0x80];
        assert_eq!(
            Reader::new(&data).read_mpint(),
            Err(DecodeError::NegativeMpint)
        );
    }

    #[test]
    fn test_read_mpint_rejects_non_minimal() {
        let data = [0, 0, 0, 2, 0x00, 0x01];
        assert!(matches!(
            Reader::new(&data).read_mpint(),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_truncated_length_prefix() {
        let data = [0, 0, 1];
        assert_eq!(
            Reader::new(&data).read_bytes(),
            Err(DecodeError::truncated(4, 3))
        );
    }

    #[test]
    fn test_length_prefix_longer_than_buffer() {
        let data = [0, 0, 0, 10, 1, 2];
        assert_eq!(
            Reader::new(&data).read_bytes(),
            Err(DecodeError::truncated(10, 2))
        );
    }

    #[test]
    fn test_huge_length_prefix_does_not_overread() {
        let data = [0xff, 0xff, 0xff, 0xff, 1];
        assert!(matches!(
            Reader::new(&data).read_bytes(),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let data = [0, 0, 0, 1, 0xff];
        assert_eq!(
            Reader::new(&data).read_string(),
            Err(DecodeError::InvalidUtf8)
        );
    }

    #[test]
    fn test_invalid_bool() {
        assert_eq!(Reader::new(&[2]).read_bool(), Err(DecodeError::InvalidBool(2)));
    }

    #[test]
    fn test_finish_reports_trailing_bytes() {
        let r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.finish(), Err(DecodeError::TrailingBytes { count: 3 }));
    }

    #[test]
    fn test_nested_and_string_list() {
        let principals = vec!["alice".to_string(), "bob".to_string()];
        let mut w = Writer::new();
        w.string_list(&principals).nested(|inner| {
            inner.u32(7);
        });
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_string_list().unwrap(), principals);
        let mut inner = r.read_nested().unwrap();
        assert_eq!(inner.read_u32().unwrap(), 7);
        assert!(inner.finish().is_ok());
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_encode_fields_with_nested_list() {
        let bytes = encode_fields(&[
            Field::String("x"),
            Field::List(vec![Field::U8(1), Field::Bool(false)]),
        ]);
        assert_eq!(bytes, [0, 0, 0, 1, b'x', 0, 0, 0, 2, 1, 0]);
    }

    #[test]
    fn test_decode_returns_remaining_bytes() {
        let bytes = encode_fields(&[Field::String("ssh-ed25519"), Field::U32(9)]);
        let (value, rest) = decode(&bytes, FieldKind::String).unwrap();
        assert_eq!(value, FieldValue::String("ssh-ed25519"));
        let (value, rest) = decode(rest, FieldKind::U32).unwrap();
        assert_eq!(value, FieldValue::U32(9));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_nested_is_raw() {
        let bytes = encode_fields(&[Field::List(vec![Field::U8(5)])]);
        let (value, rest) = decode(&bytes, FieldKind::Nested).unwrap();
        assert_eq!(value, FieldValue::Nested(&[5]));
        assert!(rest.is_empty());
    }
}
