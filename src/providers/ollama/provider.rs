use async_trait::async_trait;

use super::api;
use crate::providers::{
    dedup_models, providers::ProviderIdentifier, providers::ProviderKey, Error, LiveModel,
    ModelHandle, Provider,
};

impl From<api::Tag> for LiveModel {
    fn from(value: api::Tag) -> Self {
        LiveModel::new(value.name, None)
    }
}

pub(crate) struct OllamaProvider {
    api: api::OllamaApi,
}

impl OllamaProvider {
    pub(crate) fn with_api_base(api_base: &str) -> Result<OllamaProvider, url::ParseError> {
        Ok(OllamaProvider {
            api: api::OllamaApi::with_api_base(api_base)?,
        })
    }

    pub(crate) fn new(api_base: Option<&str>) -> Result<OllamaProvider, url::ParseError> {
        Self::with_api_base(api_base.unwrap_or(api::OLLAMA_DEFAULT_ENDPOINT))
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn key(&self) -> ProviderKey {
        ProviderIdentifier::Ollama.into()
    }

    // A local server needs no key
    fn has_credential(&self) -> bool {
        true
    }

    fn build_handle(&self, model: &str) -> Option<ModelHandle> {
        Some(ModelHandle::new(self.key(), model, self.api.endpoint().clone()))
    }

    async fn fetch_live_models(&self) -> Result<Vec<LiveModel>, Error> {
        let tags = self.api.tags().await?;

        Ok(dedup_models(tags.into_iter().map(LiveModel::from).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ErrorKind;

    #[tokio::test]
    async fn test_unreachable_server() {
        // Port 9 (discard) is closed on any sane test host
        let provider = OllamaProvider::new(Some("http://127.0.0.1:9")).unwrap();

        assert!(provider.has_credential());

        let err = provider.fetch_live_models().await.unwrap_err();

        assert!(matches!(
            err.kind(),
            ErrorKind::Connection | ErrorKind::TimedOut | ErrorKind::UnspecifiedError
        ));
    }
}
