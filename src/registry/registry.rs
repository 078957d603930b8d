use core::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::catalog::{Capabilities, Catalog, ProviderSummary};
use super::directory::ProviderDirectory;
use super::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::providers::providers::ProviderKey;
use crate::providers::ModelHandle;

#[derive(Error, Debug)]
pub(crate) enum Error {
    /// The reference is not of the form `<provider>/<model>`
    #[error("model \"{0}\" is not of the form <provider>/<model>")]
    MalformedReference(String),
    /// Neither the catalog nor the provider factory can produce the fallback
    #[error("fallback model \"{0}\" cannot be built; check that its provider is configured")]
    FallbackUnavailable(ModelKey),
    #[error("invalid API base for provider \"{0}\": {1}")]
    InvalidApiBase(ProviderKey, #[source] url::ParseError),
}

/// A (provider, model) pair identifying one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ModelKey {
    pub provider: ProviderKey,
    pub model: String,
}

impl ModelKey {
    pub(crate) fn new<S: Into<String>>(provider: ProviderKey, model: S) -> ModelKey {
        ModelKey {
            provider,
            model: model.into(),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Parses `<provider>/<model>`. Only the first '/' separates the two, so model
/// names such as `meta-llama/Llama-3.3-70B` survive intact.
impl FromStr for ModelKey {
    type Err = Error;

    fn from_str(reference: &str) -> Result<ModelKey, Error> {
        match reference.split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
                Ok(ModelKey::new(provider.into(), model))
            }
            _ => Err(Error::MalformedReference(reference.to_string())),
        }
    }
}

/// The model registry: providers, the catalog of their models, and the
/// coordinator keeping the catalog in step with the providers' live listings.
pub(crate) struct Registry {
    directory: Arc<ProviderDirectory>,
    catalog: Arc<Catalog>,
    refresher: RefreshCoordinator,
    fallback: ModelKey,
}

impl Registry {
    pub(crate) fn new(directory: ProviderDirectory, catalog: Catalog, fallback: ModelKey) -> Registry {
        Registry {
            directory: Arc::new(directory),
            catalog: Arc::new(catalog),
            refresher: RefreshCoordinator::new(),
            fallback,
        }
    }

    #[cfg(test)]
    pub(crate) fn directory(&self) -> &ProviderDirectory {
        &self.directory
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn fallback(&self) -> &ModelKey {
        &self.fallback
    }

    /// Refresh the catalog from the providers' live listings. Unless forced,
    /// this does nothing within five minutes of the last refresh.
    pub(crate) async fn refresh(&self, force: bool) -> RefreshOutcome {
        self.refresher
            .refresh(force, &self.directory, &self.catalog)
            .await
    }

    /// Snapshot of the catalog without refreshing it.
    pub(crate) fn list_summary(&self) -> Vec<ProviderSummary> {
        self.catalog.summary(self.directory.keys().cloned(), |key| {
            self.directory.has_credential(key)
        })
    }

    /// Snapshot of the catalog, refreshing it first if it has gone stale.
    pub(crate) async fn summary(&self) -> Vec<ProviderSummary> {
        self.refresh(false).await;
        self.list_summary()
    }

    /// Resolve a reference to a handle. Missing references, unknown
    /// providers and models the factory refuses all resolve to the fallback.
    pub(crate) fn get_model(&self, reference: Option<&ModelKey>) -> Result<ModelHandle, Error> {
        let key = match reference {
            Some(key) => key,
            None => return self.fallback_model(),
        };

        if let Some(handle) = self.catalog.get(key) {
            return Ok(handle);
        }

        match self.build_and_register(key) {
            Some(handle) => Ok(handle),
            None => {
                tracing::info!(model = %key, fallback = %self.fallback, "model unavailable, using fallback");
                self.fallback_model()
            }
        }
    }

    /// Resolve a textual `<provider>/<model>` reference. A malformed
    /// reference resolves to the fallback, like a missing one.
    pub(crate) fn resolve(&self, reference: Option<&str>) -> Result<ModelHandle, Error> {
        match reference.map(str::parse::<ModelKey>) {
            Some(Ok(key)) => self.get_model(Some(&key)),
            Some(Err(err)) => {
                tracing::warn!(error = %err, fallback = %self.fallback, "using fallback");
                self.fallback_model()
            }
            None => self.get_model(None),
        }
    }

    pub(crate) fn fallback_model(&self) -> Result<ModelHandle, Error> {
        if let Some(handle) = self.catalog.get(&self.fallback) {
            return Ok(handle);
        }

        self.build_and_register(&self.fallback)
            .ok_or_else(|| Error::FallbackUnavailable(self.fallback.clone()))
    }

    pub(crate) fn is_tool_call_unsupported(&self, handle: &ModelHandle) -> bool {
        self.catalog.is_tool_call_unsupported(handle)
    }

    fn build_and_register(&self, key: &ModelKey) -> Option<ModelHandle> {
        let handle = self.directory.factory(&key.provider, &key.model)?;

        self.catalog
            .register(key.clone(), Some(handle.clone()), Capabilities::default());

        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ErrorKind, Provider};
    use crate::registry::refresh::FetchOutcome;
    use crate::registry::testing::FakeProvider;
    use std::time::Duration;

    fn key(provider: &str, model: &str) -> ModelKey {
        ModelKey::new(provider.into(), model)
    }

    fn registry(providers: Vec<Arc<FakeProvider>>) -> Registry {
        let mut directory = ProviderDirectory::new();

        for provider in providers {
            directory.add_provider(provider);
        }

        Registry::new(directory, Catalog::new(), key("openai", "gpt-4.1-mini"))
    }

    #[test]
    fn test_parse_model_key() {
        let parsed: ModelKey = "together/meta-llama/Llama-3.3-70B".parse().unwrap();
        assert_eq!(parsed, key("together", "meta-llama/Llama-3.3-70B"));
        assert_eq!(parsed.to_string(), "together/meta-llama/Llama-3.3-70B");

        for malformed in ["gpt-4.1", "/gpt-4.1", "openai/", ""] {
            assert!(matches!(
                malformed.parse::<ModelKey>(),
                Err(Error::MalformedReference(_))
            ));
        }
    }

    #[test]
    fn test_catalogued_model_returns_same_handle() {
        let registry = registry(vec![Arc::new(FakeProvider::new("openai"))]);
        let gpt = key("openai", "gpt-4.1");

        let first = registry.get_model(Some(&gpt)).unwrap();
        let second = registry.get_model(Some(&gpt)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.id(), second.id());
        assert_eq!(first.model(), "gpt-4.1");
    }

    #[test]
    fn test_lazy_build_registers_entry() {
        let registry = registry(vec![Arc::new(FakeProvider::new("ollama"))]);
        let gemma = key("ollama", "gemma3:1b");

        assert!(!registry.catalog().contains(&gemma));

        let handle = registry.get_model(Some(&gemma)).unwrap();

        assert!(registry.catalog().contains(&gemma));
        assert_eq!(registry.catalog().key_of(&handle), Some(gemma));
        assert!(registry.is_tool_call_unsupported(&handle));
    }

    #[test]
    fn test_unknown_provider_falls_back() {
        let registry = registry(vec![Arc::new(FakeProvider::new("openai"))]);

        let fallback = registry.get_model(None).unwrap();
        let resolved = registry.get_model(Some(&key("unknown-provider", "x"))).unwrap();

        assert_eq!(resolved, fallback);
        assert_eq!(resolved.model(), "gpt-4.1-mini");
        assert!(!registry.catalog().contains(&key("unknown-provider", "x")));
    }

    #[test]
    fn test_factory_refusal_falls_back() {
        let registry = registry(vec![Arc::new(FakeProvider::new("openai"))]);

        let resolved = registry.get_model(Some(&key("openai", ""))).unwrap();

        assert_eq!(resolved.model(), "gpt-4.1-mini");
    }

    #[test]
    fn test_missing_fallback_is_fatal() {
        let registry = registry(vec![Arc::new(FakeProvider::new("anthropic"))]);

        assert!(matches!(
            registry.get_model(None),
            Err(Error::FallbackUnavailable(_))
        ));
        assert!(matches!(
            registry.get_model(Some(&key("xai", "grok-4"))),
            Err(Error::FallbackUnavailable(_))
        ));

        // Known models still resolve
        assert!(registry
            .get_model(Some(&key("anthropic", "claude-sonnet-4-0")))
            .is_ok());
    }

    #[test]
    fn test_resolve_text() {
        let registry = registry(vec![Arc::new(FakeProvider::new("openai"))]);

        assert_eq!(registry.resolve(Some("openai/o3")).unwrap().model(), "o3");
        assert_eq!(registry.resolve(None).unwrap().model(), "gpt-4.1-mini");
        assert_eq!(registry.resolve(Some("o3")).unwrap().model(), "gpt-4.1-mini");
        assert_eq!(registry.resolve(Some("openai/")).unwrap().model(), "gpt-4.1-mini");
    }

    #[test]
    fn test_unregistered_handle_supports_tools() {
        let provider = FakeProvider::new("ollama");
        let registry = registry(vec![]);

        let handle = provider.build_handle("gemma3:1b").unwrap();

        assert!(!registry.is_tool_call_unsupported(&handle));
    }

    #[tokio::test]
    async fn test_refresh_replaces_lazy_handles() {
        let openai = Arc::new(FakeProvider::new("openai").with_models(&["gpt-4.1", "o3"]));
        let registry = registry(vec![openai]);
        let gpt = key("openai", "gpt-4.1");

        let before = registry.get_model(Some(&gpt)).unwrap();
        registry.refresh(true).await;
        let after = registry.get_model(Some(&gpt)).unwrap();

        assert_ne!(before, after);
        assert_eq!(registry.catalog().key_of(&before), None);
        assert_eq!(registry.catalog().key_of(&after), Some(gpt));
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_refreshes_when_stale() {
        let openai = Arc::new(FakeProvider::new("openai").with_models(&["gpt-4.1"]));
        let xai = Arc::new(
            FakeProvider::new("xai")
                .with_models(&["grok-4"])
                .without_credential(),
        );
        let registry = registry(vec![openai.clone(), xai.clone()]);

        let summary = registry.summary().await;
        registry.summary().await;

        assert_eq!(openai.fetches(), 1);
        assert_eq!(xai.fetches(), 0);

        let providers: Vec<(&str, bool, usize)> = summary
            .iter()
            .map(|p| (p.provider.as_str(), p.has_api_key, p.models.len()))
            .collect();

        assert_eq!(providers, [("openai", true, 1), ("xai", false, 0)]);

        tokio::time::advance(Duration::from_secs(301)).await;
        registry.summary().await;

        assert_eq!(openai.fetches(), 2);
    }

    #[tokio::test]
    async fn test_configured_only_providers_are_not_fetched() {
        let together = Arc::new(
            FakeProvider::new("together")
                .with_models(&["llama-3.3-70b"])
                .configured_only(),
        );
        let registry = registry(vec![together.clone()]);

        match registry.refresh(true).await {
            RefreshOutcome::Refreshed(report) => assert!(report.providers.is_empty()),
            RefreshOutcome::Throttled => panic!("forced refresh was throttled"),
        }

        assert_eq!(together.fetches(), 0);
    }

    #[tokio::test]
    async fn test_failed_provider_keeps_resolving() {
        let openai = Arc::new(FakeProvider::new("openai").with_models(&["gpt-4.1", "gpt-4.1-mini"]));
        let registry = registry(vec![openai.clone()]);

        registry.refresh(true).await;
        let handle = registry.get_model(Some(&key("openai", "gpt-4.1"))).unwrap();

        openai.fail_with(ErrorKind::Connection);

        let report = match registry.refresh(true).await {
            RefreshOutcome::Refreshed(report) => report,
            RefreshOutcome::Throttled => panic!("forced refresh was throttled"),
        };

        assert!(matches!(
            report.outcome(&"openai".into()),
            Some(FetchOutcome::Failed { .. })
        ));
        assert_eq!(registry.get_model(Some(&key("openai", "gpt-4.1"))).unwrap(), handle);
    }
}
