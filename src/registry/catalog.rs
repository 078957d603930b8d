//! The in-memory model catalog.
//!
//! Handles, metadata and the reverse index live behind a single lock so the
//! three stores can never disagree: every key with a handle has exactly one
//! metadata record, and every indexed handle id points at a key whose current
//! handle has that id.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::defaults;
use super::registry::ModelKey;
use crate::providers::providers::ProviderKey;
use crate::providers::{HandleId, ModelHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModelMetadata {
    /// Only set when it differs from the model name
    pub display_name: Option<String>,
    pub tool_call_unsupported: bool,
    pub image_input_unsupported: bool,
}

/// Capabilities supplied at registration. Flags left unset are filled in from
/// the built-in defaults.
#[derive(Debug, Clone, Default)]
pub(crate) struct Capabilities {
    pub display_name: Option<String>,
    pub tool_call_unsupported: Option<bool>,
    pub image_input_unsupported: Option<bool>,
}

impl Capabilities {
    pub(crate) fn with_display_name(display_name: Option<String>) -> Capabilities {
        Capabilities {
            display_name,
            ..Default::default()
        }
    }

    fn resolve(self, key: &ModelKey) -> ModelMetadata {
        ModelMetadata {
            display_name: self
                .display_name
                .filter(|name| !name.is_empty() && *name != key.model),
            tool_call_unsupported: self
                .tool_call_unsupported
                .unwrap_or_else(|| defaults::tool_call_unsupported(&key.provider, &key.model)),
            image_input_unsupported: self
                .image_input_unsupported
                .unwrap_or_else(|| defaults::image_input_unsupported(&key.provider)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub is_tool_call_unsupported: bool,
    pub is_image_input_unsupported: bool,
}

impl ModelSummary {
    /// The name shown to users.
    pub(crate) fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ProviderSummary {
    pub provider: ProviderKey,
    #[serde(rename = "hasAPIKey")]
    pub has_api_key: bool,
    pub models: Vec<ModelSummary>,
}

/// A model to register during a provider replacement.
pub(crate) struct Registration {
    pub model: String,
    pub handle: Option<ModelHandle>,
    pub capabilities: Capabilities,
}

#[derive(Default)]
struct CatalogInner {
    handles: HashMap<ModelKey, ModelHandle>,
    metadata: HashMap<ModelKey, ModelMetadata>,
    reverse: HashMap<HandleId, ModelKey>,
}

impl CatalogInner {
    fn register(&mut self, key: ModelKey, handle: ModelHandle, capabilities: Capabilities) {
        let metadata = capabilities.resolve(&key);

        self.reverse.insert(handle.id(), key.clone());

        if let Some(previous) = self.handles.insert(key.clone(), handle) {
            self.unindex(&previous, &key);
        }

        self.metadata.insert(key, metadata);
    }

    // Re-registering the same handle must keep its reverse entry
    fn unindex(&mut self, previous: &ModelHandle, key: &ModelKey) {
        let still_current = self
            .handles
            .get(key)
            .is_some_and(|current| current.id() == previous.id());

        if !still_current {
            self.reverse.remove(&previous.id());
        }
    }

    fn clear_provider(&mut self, provider: &ProviderKey) -> usize {
        let keys: Vec<ModelKey> = self
            .handles
            .keys()
            .filter(|key| key.provider == *provider)
            .cloned()
            .collect();

        for key in &keys {
            if let Some(handle) = self.handles.remove(key) {
                self.reverse.remove(&handle.id());
            }

            self.metadata.remove(key);
        }

        keys.len()
    }
}

/// Registered (provider, model) pairs with their handles and metadata.
#[derive(Default)]
pub(crate) struct Catalog {
    inner: RwLock<CatalogInner>,
}

impl Catalog {
    pub(crate) fn new() -> Catalog {
        Catalog::default()
    }

    /// Insert or overwrite an entry. Returns false without touching the
    /// catalog when no handle could be built.
    pub(crate) fn register(
        &self,
        key: ModelKey,
        handle: Option<ModelHandle>,
        capabilities: Capabilities,
    ) -> bool {
        let handle = match handle {
            Some(handle) => handle,
            None => return false,
        };

        self.inner.write().register(key, handle, capabilities);

        true
    }

    /// Clear a provider and register its new entries under one write lock, so
    /// readers observe either the previous or the new set.
    pub(crate) fn replace_provider(
        &self,
        provider: &ProviderKey,
        registrations: Vec<Registration>,
    ) -> usize {
        let mut inner = self.inner.write();

        let removed = inner.clear_provider(provider);
        let mut added = 0;

        for Registration {
            model,
            handle,
            capabilities,
        } in registrations
        {
            if let Some(handle) = handle {
                inner.register(ModelKey::new(provider.clone(), model), handle, capabilities);
                added += 1;
            }
        }

        tracing::debug!(provider = %provider, removed, added, "replaced catalog entries");

        added
    }

    pub(crate) fn get(&self, key: &ModelKey) -> Option<ModelHandle> {
        self.inner.read().handles.get(key).cloned()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &ModelKey) -> bool {
        self.inner.read().handles.contains_key(key)
    }

    pub(crate) fn metadata(&self, key: &ModelKey) -> Option<ModelMetadata> {
        self.inner.read().metadata.get(key).cloned()
    }

    /// The key a handle is registered under, if it is still registered.
    pub(crate) fn key_of(&self, handle: &ModelHandle) -> Option<ModelKey> {
        self.inner.read().reverse.get(&handle.id()).cloned()
    }

    /// Unknown handles are assumed to support tool calls.
    pub(crate) fn is_tool_call_unsupported(&self, handle: &ModelHandle) -> bool {
        let inner = self.inner.read();

        inner
            .reverse
            .get(&handle.id())
            .and_then(|key| inner.metadata.get(key))
            .map(|metadata| metadata.tool_call_unsupported)
            .unwrap_or(false)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().handles.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summaries of every provider with entries plus every provider in
    /// `known`. Providers are sorted by key, models case-insensitively by
    /// label.
    pub(crate) fn summary<I, F>(&self, known: I, has_credential: F) -> Vec<ProviderSummary>
    where
        I: IntoIterator<Item = ProviderKey>,
        F: Fn(&ProviderKey) -> bool,
    {
        let mut providers: BTreeMap<ProviderKey, Vec<ModelSummary>> =
            known.into_iter().map(|key| (key, Vec::new())).collect();

        {
            let inner = self.inner.read();

            for (key, metadata) in &inner.metadata {
                providers
                    .entry(key.provider.clone())
                    .or_default()
                    .push(ModelSummary {
                        name: key.model.clone(),
                        display_name: metadata.display_name.clone(),
                        is_tool_call_unsupported: metadata.tool_call_unsupported,
                        is_image_input_unsupported: metadata.image_input_unsupported,
                    });
            }
        }

        providers
            .into_iter()
            .map(|(provider, mut models)| {
                models.sort_by(|a, b| {
                    a.label()
                        .to_lowercase()
                        .cmp(&b.label().to_lowercase())
                        .then_with(|| a.name.cmp(&b.name))
                });

                ProviderSummary {
                    has_api_key: has_credential(&provider),
                    provider,
                    models,
                }
            })
            .collect()
    }
}
