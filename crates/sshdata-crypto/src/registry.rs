//! Algorithm registry for runtime provider lookup.
//!
//! The [`AlgorithmRegistry`] maps every key family to its
//! [`SignatureProvider`] and records which algorithm identifiers are enabled.
//! Keys and certificates resolve providers through a registry, so disabling
//! an identifier (for example SHA-1 `ssh-rsa` signatures) is a configuration
//! change rather than a code change.
//!
//! # Design
//!
//! - **Thread-safe**: `Arc` internally, cloning is cheap
//! - **Immutable once built**: [`AlgorithmRegistry::global`] is initialized once
//! - **Testable**: [`AlgorithmRegistry::empty`] and [`AlgorithmRegistry::register`]
//!
//! # Example
//!
//! ```
//! use sshdata_core::{Algorithm, Config, Family};
//! use sshdata_crypto::AlgorithmRegistry;
//!
//! let config = Config::builder()
//!     .algorithms([Algorithm::RsaSha2_256, Algorithm::RsaSha2_512, Algorithm::Ed25519])
//!     .build()
//!     .unwrap();
//! let registry = AlgorithmRegistry::from_config(&config);
//!
//! assert!(registry.supports(Algorithm::RsaSha2_512));
//! assert!(!registry.supports(Algorithm::Rsa));
//! assert_eq!(
//!     registry.identifiers_in_family(Family::Rsa),
//!     vec![Algorithm::RsaSha2_256, Algorithm::RsaSha2_512]
//! );
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use sshdata_core::{
    Algorithm, AlgorithmError, CertificateConfig, Config, Family, GenerationConfig,
};

use crate::provider::{
    DilithiumProvider, DsaProvider, EcdsaP256Provider, EcdsaP384Provider, EcdsaP521Provider,
    Ed25519Provider, RsaProvider, SignatureProvider,
};

static GLOBAL: OnceLock<AlgorithmRegistry> = OnceLock::new();

/// Registry of signature providers and enabled identifiers.
#[derive(Clone)]
pub struct AlgorithmRegistry {
    providers: Arc<HashMap<Family, Arc<dyn SignatureProvider>>>,
    enabled: Arc<BTreeSet<Algorithm>>,
    generation: GenerationConfig,
    certificates: CertificateConfig,
}

impl AlgorithmRegistry {
    /// Create a registry with every provider and every identifier enabled.
    ///
    /// ```
    /// use sshdata_core::Algorithm;
    /// use sshdata_crypto::AlgorithmRegistry;
    ///
    /// let registry = AlgorithmRegistry::new();
    /// assert_eq!(registry.supported_algorithms(), Algorithm::ALL.to_vec());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create a registry with no providers (for testing).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            providers: Arc::new(HashMap::new()),
            enabled: Arc::new(BTreeSet::new()),
            generation: GenerationConfig::default(),
            certificates: CertificateConfig::default(),
        }
    }

    /// Create a registry with every provider, enabling only the configured
    /// identifiers.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::empty();
        registry.register(RsaProvider);
        registry.register(DsaProvider);
        registry.register(EcdsaP256Provider);
        registry.register(EcdsaP384Provider);
        registry.register(EcdsaP521Provider);
        registry.register(Ed25519Provider);
        registry.register(DilithiumProvider);

        registry.enabled = Arc::new(config.registry.algorithms.iter().copied().collect());
        registry.generation = config.generation;
        registry.certificates = config.certificates;
        registry
    }

    /// The process-wide registry.
    ///
    /// Uses the configuration passed to [`install_global`](Self::install_global)
    /// if that ran first, otherwise the defaults.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    /// Install the process-wide registry.
    ///
    /// # Errors
    ///
    /// Returns the registry back if the global one is already initialized.
    pub fn install_global(registry: Self) -> Result<(), Self> {
        GLOBAL.set(registry)
    }

    /// Register a provider, replacing any provider for the same family and
    /// enabling all of the family's identifiers.
    pub fn register<P: SignatureProvider + 'static>(&mut self, provider: P) {
        let family = provider.family();
        Arc::make_mut(&mut self.providers).insert(family, Arc::new(provider));
        Arc::make_mut(&mut self.enabled).extend(family.algorithms().iter().copied());
    }

    /// Disable one identifier while keeping its provider.
    pub fn disable(&mut self, algorithm: Algorithm) {
        Arc::make_mut(&mut self.enabled).remove(&algorithm);
    }

    /// Resolve the provider for an enabled identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unregistered`] if the identifier is disabled
    /// or its family has no provider.
    pub fn resolve(&self, algorithm: Algorithm) -> Result<&dyn SignatureProvider, AlgorithmError> {
        if !self.enabled.contains(&algorithm) {
            return Err(AlgorithmError::unregistered(algorithm));
        }
        self.providers
            .get(&algorithm.family())
            .map(|provider| &**provider)
            .ok_or_else(|| AlgorithmError::unregistered(algorithm))
    }

    /// Resolve the provider for a family, for parsing and generating keys.
    ///
    /// A family resolves while at least one of its identifiers is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unregistered`] naming the family's primary
    /// identifier otherwise.
    pub fn resolve_family(&self, family: Family) -> Result<&dyn SignatureProvider, AlgorithmError> {
        self.family_entry(family).map(|provider| &**provider)
    }

    /// As [`resolve_family`](Self::resolve_family), returning a handle that
    /// outlives the registry borrow.
    pub(crate) fn family_provider(
        &self,
        family: Family,
    ) -> Result<Arc<dyn SignatureProvider>, AlgorithmError> {
        self.family_entry(family).map(Arc::clone)
    }

    fn family_entry(&self, family: Family) -> Result<&Arc<dyn SignatureProvider>, AlgorithmError> {
        let unregistered = || AlgorithmError::unregistered(family.primary());
        if self.identifiers_in_family(family).is_empty() {
            return Err(unregistered());
        }
        self.providers.get(&family).ok_or_else(unregistered)
    }

    /// The identifier used when a caller does not name one: the first
    /// enabled identifier of the family, or the primary one if none is.
    ///
    /// ```
    /// use sshdata_core::{Algorithm, Family};
    /// use sshdata_crypto::AlgorithmRegistry;
    ///
    /// let mut registry = AlgorithmRegistry::new();
    /// assert_eq!(registry.default_algorithm(Family::Rsa), Algorithm::Rsa);
    /// registry.disable(Algorithm::Rsa);
    /// assert_eq!(registry.default_algorithm(Family::Rsa), Algorithm::RsaSha2_256);
    /// ```
    #[must_use]
    pub fn default_algorithm(&self, family: Family) -> Algorithm {
        self.identifiers_in_family(family)
            .first()
            .copied()
            .unwrap_or_else(|| family.primary())
    }

    /// The family an identifier belongs to.
    #[must_use]
    pub const fn family_of(&self, algorithm: Algorithm) -> Family {
        algorithm.family()
    }

    /// The enabled identifiers of a family, in stable order.
    #[must_use]
    pub fn identifiers_in_family(&self, family: Family) -> Vec<Algorithm> {
        family
            .algorithms()
            .iter()
            .copied()
            .filter(|algo| self.supports(*algo))
            .collect()
    }

    /// Whether an identifier is enabled and has a provider.
    #[must_use]
    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.enabled.contains(&algorithm) && self.providers.contains_key(&algorithm.family())
    }

    /// Every supported identifier, in stable order.
    #[must_use]
    pub fn supported_algorithms(&self) -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|algo| self.supports(*algo))
            .collect()
    }

    /// Parameters used when generating keys.
    #[must_use]
    pub const fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Parameters used when issuing certificates.
    #[must_use]
    pub const fn certificate_config(&self) -> &CertificateConfig {
        &self.certificates
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("algorithms", &self.supported_algorithms())
            .field("generation", &self.generation)
            .field("certificates", &self.certificates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_new_supports_everything() {
        let registry = AlgorithmRegistry::new();
        for algo in Algorithm::ALL {
            assert!(registry.supports(algo), "{algo}");
            assert_eq!(registry.resolve(algo).unwrap().family(), algo.family());
        }
    }

    #[test]
    fn test_empty_resolves_nothing() {
        let registry = AlgorithmRegistry::empty();
        assert!(registry.supported_algorithms().is_empty());
        assert_eq!(
            registry.resolve(Algorithm::Ed25519).err(),
            Some(AlgorithmError::unregistered(Algorithm::Ed25519))
        );
        assert!(registry.resolve_family(Family::Ed25519).is_err());
    }

    #[test]
    fn test_register_enables_family() {
        let mut registry = AlgorithmRegistry::empty();
        registry.register(RsaProvider);
        assert_eq!(
            registry.supported_algorithms(),
            vec![Algorithm::Rsa, Algorithm::RsaSha2_256, Algorithm::RsaSha2_512]
        );
        assert!(!registry.supports(Algorithm::Dsa));
    }

    #[test]
    fn test_disabled_identifier_keeps_family_resolvable() {
        let mut registry = AlgorithmRegistry::new();
        registry.disable(Algorithm::Rsa);
        assert!(registry.resolve(Algorithm::Rsa).is_err());
        assert!(registry.resolve(Algorithm::RsaSha2_256).is_ok());
        assert!(registry.resolve_family(Family::Rsa).is_ok());
        assert_eq!(
            registry.identifiers_in_family(Family::Rsa),
            vec![Algorithm::RsaSha2_256, Algorithm::RsaSha2_512]
        );
    }

    #[test]
    fn test_fully_disabled_family_does_not_resolve() {
        let config = Config::builder().algorithms([Algorithm::Ed25519]).build().unwrap();
        let registry = AlgorithmRegistry::from_config(&config);
        assert_eq!(
            registry.resolve_family(Family::Dsa).err(),
            Some(AlgorithmError::unregistered(Algorithm::Dsa))
        );
    }

    #[test]
    fn test_from_config_carries_parameters() {
        let config = Config::builder().rsa_bits(3072).nonce_len(16).build().unwrap();
        let registry = AlgorithmRegistry::from_config(&config);
        assert_eq!(registry.generation_config().rsa_bits, 3072);
        assert_eq!(registry.certificate_config().nonce_len, 16);
    }

    #[test]
    fn test_clone_shares_providers() {
        let registry = AlgorithmRegistry::new();
        let clone = registry.clone();
        assert!(Arc::ptr_eq(&registry.providers, &clone.providers));

        let handle = std::thread::spawn(move || clone.supported_algorithms().len());
        assert_eq!(handle.join().unwrap(), Algorithm::ALL.len());
    }

    #[test]
    fn test_default_algorithm_skips_disabled_identifiers() {
        let mut registry = AlgorithmRegistry::new();
        assert_eq!(registry.default_algorithm(Family::Rsa), Algorithm::Rsa);

        registry.disable(Algorithm::Rsa);
        assert_eq!(registry.default_algorithm(Family::Rsa), Algorithm::RsaSha2_256);
        registry.disable(Algorithm::RsaSha2_256);
        assert_eq!(registry.default_algorithm(Family::Rsa), Algorithm::RsaSha2_512);

        registry.disable(Algorithm::RsaSha2_512);
        assert_eq!(registry.default_algorithm(Family::Rsa), Algorithm::Rsa);
        assert_eq!(registry.default_algorithm(Family::Ed25519), Algorithm::Ed25519);
    }

    #[test]
    fn test_family_provider_outlives_registry() {
        let provider = {
            let registry = AlgorithmRegistry::new();
            registry.family_provider(Family::Dsa).unwrap()
        };
        assert_eq!(provider.family(), Family::Dsa);
        assert!(AlgorithmRegistry::empty()
            .family_provider(Family::Dsa)
            .is_err());
    }

    #[test]
    fn test_family_of() {
        let registry = AlgorithmRegistry::empty();
        assert_eq!(registry.family_of(Algorithm::RsaSha2_512), Family::Rsa);
    }

    #[test]
    fn test_global_is_shared() {
        let a: *const AlgorithmRegistry = AlgorithmRegistry::global();
        let b: *const AlgorithmRegistry = AlgorithmRegistry::global();
        assert_eq!(a, b);
    }
}
