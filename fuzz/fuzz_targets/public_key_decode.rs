//! Fuzz target for public key and signature blobs.
//!
//! # Running
//!
//! ```bash
//! cargo +nightly fuzz run public_key_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sshdata::{PublicKey, Reader, Signature};

fuzz_target!(|data: &[u8]| {
    // A length-prefixed key blob followed by a signature attempt.
    let mut reader = Reader::new(data);
    let Ok(key_blob) = reader.read_bytes() else {
        return;
    };
    if let Ok(key) = PublicKey::decode(key_blob) {
        let _ = key.verify(b"fuzz", reader.remaining());
    }
    let _ = Signature::decode(reader.remaining());
});
