//! Fuzz target for certificate parsing.
//!
//! # Running
//!
//! ```bash
//! cargo +nightly fuzz run certificate_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sshdata::{AlgorithmRegistry, Certificate, VerifyMode};

fuzz_target!(|data: &[u8]| {
    let registry = AlgorithmRegistry::global();

    // Skipping verification reaches the structural checks on inputs whose
    // signature would never verify.
    if let Ok(cert) = Certificate::decode_with(registry, data, VerifyMode::UnsafeNoVerify) {
        let _ = cert.verify_signature();
        let _ = cert.check_validity_at(0);
        let _ = cert.check_critical_options(&[]);
    }
    let _ = Certificate::decode_with(registry, data, VerifyMode::Verify);
});
