//! # Test Utilities for `sshdata`
//!
//! Shared keys and proptest strategies for the integration tests.
//!
//! ## Functions
//!
//! - [`registry`] - A registry with every identifier and fast RSA generation
//! - [`rsa_key`] - A cached 1024-bit RSA key
//! - [`key`] - A fresh key of any family
//! - [`cached_key`] - One shared key per family
//!
//! ## Proptest Strategies
//!
//! - [`key_id`] - Printable key identifiers
//! - [`principals`] - Lists of principal names
//! - [`options`] - Option lists with unique names

#![allow(dead_code)]
// Allow expect() in test utilities since panicking on setup failures is acceptable in tests
#![allow(clippy::expect_used)]

use std::sync::OnceLock;

use proptest::prelude::*;
use sshdata::{AlgorithmRegistry, Config, Family, PrivateKey};

/// A registry enabling everything, with 1024-bit RSA keys.
pub fn registry() -> &'static AlgorithmRegistry {
    static REGISTRY: OnceLock<AlgorithmRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let config = Config::builder()
            .rsa_bits(1024)
            .build()
            .expect("valid configuration");
        AlgorithmRegistry::from_config(&config)
    })
}

/// A cached RSA key. Generation is slow, so tests share one.
pub fn rsa_key() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    KEY.get_or_init(|| key(Family::Rsa))
}

/// A second cached RSA key, unrelated to [`rsa_key`].
pub fn other_rsa_key() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    KEY.get_or_init(|| key(Family::Rsa))
}

/// A freshly generated key.
pub fn key(family: Family) -> PrivateKey {
    PrivateKey::generate_with(registry(), family).expect("key generation should succeed")
}

/// A shared key of `family`, generated on first use.
pub fn cached_key(family: Family) -> &'static PrivateKey {
    static KEYS: OnceLock<Vec<PrivateKey>> = OnceLock::new();
    let keys = KEYS.get_or_init(|| Family::ALL.into_iter().map(key).collect());
    let index = Family::ALL
        .iter()
        .position(|candidate| *candidate == family)
        .expect("every family is listed");
    &keys[index]
}

/// Strategy for printable key identifiers.
pub fn key_id() -> impl Strategy<Value = String> {
    "[ -~]{0,64}"
}

/// Strategy for principal lists.
pub fn principals() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9.-]{0,30}", 0..5)
}

/// Strategy for option lists with unique names.
pub fn options() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::btree_map("[a-z-]{1,20}", prop::option::of("[ -~]{1,40}"), 0..4)
        .prop_map(|map| map.into_iter().collect())
}
