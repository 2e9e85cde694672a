//! Fuzz target for `openssh-key-v1` containers and private key records.
//!
//! # Running
//!
//! ```bash
//! cargo +nightly fuzz run openssh_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sshdata::openssh::MAGIC;
use sshdata::{decode_private_keys, PrivateKey};

fuzz_target!(|data: &[u8]| {
    let _ = PrivateKey::decode(data);

    // Prefix the magic so coverage is not spent rediscovering it.
    let mut container = MAGIC.to_vec();
    container.extend_from_slice(data);
    if let Ok(keys) = decode_private_keys(&container) {
        for key in &keys {
            let _ = key.sign(b"fuzz", None);
        }
    }
});
