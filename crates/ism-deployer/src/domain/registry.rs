//! # Domain Registry
//!
//! Chain name to protocol domain resolution. Routing configs key their
//! sub-modules by chain name; the wire talks in numeric domains.

use std::collections::HashMap;

/// Bidirectional chain name <-> protocol domain map.
///
/// Populated by the caller; this engine ships no static chain metadata.
#[derive(Clone, Debug, Default)]
pub struct DomainRegistry {
    by_name: HashMap<String, u32>,
    by_domain: HashMap<u32, String>,
}

impl DomainRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(name, domain)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (name, domain) in pairs {
            registry.register(name, domain);
        }
        registry
    }

    /// Register one chain. Re-registering a name replaces its domain.
    pub fn register(&mut self, name: impl Into<String>, domain: u32) {
        let name = name.into();
        self.by_domain.insert(domain, name.clone());
        self.by_name.insert(name, domain);
    }

    /// Resolve a chain name to its protocol domain.
    pub fn domain(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Reverse lookup for logging.
    pub fn name(&self, domain: u32) -> Option<&str> {
        self.by_domain.get(&domain).map(String::as_str)
    }
}
