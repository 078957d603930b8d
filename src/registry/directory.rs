use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::providers::providers::ProviderKey;
use crate::providers::{ModelHandle, Provider};

/// The providers known to this process, keyed by provider key. Built once at
/// startup and read-only afterwards.
#[derive(Default)]
pub(crate) struct ProviderDirectory {
    providers: BTreeMap<ProviderKey, Arc<dyn Provider>>,
    credential_overrides: HashMap<ProviderKey, bool>,
}

impl ProviderDirectory {
    pub(crate) fn new() -> ProviderDirectory {
        ProviderDirectory::default()
    }

    pub(crate) fn add_provider(&mut self, provider: Arc<dyn Provider>) {
        let key = provider.key();

        if self.providers.insert(key.clone(), provider).is_some() {
            tracing::warn!(provider = %key, "provider registered twice, keeping the last one");
        }
    }

    /// Record credential presence explicitly. Overrides take precedence over
    /// the provider's own check.
    pub(crate) fn override_credential(&mut self, key: ProviderKey, present: bool) {
        self.credential_overrides.insert(key, present);
    }

    pub(crate) fn contains(&self, key: &ProviderKey) -> bool {
        self.providers.contains_key(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &ProviderKey> {
        self.providers.keys()
    }

    /// Build a handle for `model` through the provider's factory.
    pub(crate) fn factory(&self, key: &ProviderKey, model: &str) -> Option<ModelHandle> {
        self.providers.get(key)?.build_handle(model)
    }

    pub(crate) fn has_credential(&self, key: &ProviderKey) -> bool {
        if let Some(present) = self.credential_overrides.get(key) {
            return *present;
        }

        self.providers
            .get(key)
            .map(|provider| provider.has_credential())
            .unwrap_or(false)
    }

    /// Providers taking part in live refreshes.
    pub(crate) fn live_providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers
            .values()
            .filter(|provider| provider.lists_live_models())
            .cloned()
            .collect()
    }
}
