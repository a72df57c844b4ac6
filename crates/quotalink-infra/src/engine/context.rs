use crate::store::KeyStore;

/// Outbound link resolved to a registry slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLink {
    pub(crate) target: usize,
    pub(crate) weight: f64,
}

impl ResolvedLink {
    /// Index of the linked context in its registry.
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A named quota domain: its own key store plus outbound links.
pub struct Context {
    name: String,
    store: KeyStore,
    links: Vec<ResolvedLink>,
}

impl Context {
    pub(crate) fn new(name: String, store: KeyStore, links: Vec<ResolvedLink>) -> Self {
        Self { name, store, links }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum consumption units per window.
    pub fn limit(&self) -> u64 {
        self.store.limit()
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn links(&self) -> &[ResolvedLink] {
        &self.links
    }
}
