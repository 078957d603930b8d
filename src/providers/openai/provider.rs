use async_trait::async_trait;

use crate::providers::openai::api;
use crate::providers::{
    dedup_models, providers::ProviderIdentifier, providers::ProviderKey, Error, ErrorKind,
    LiveModel, ModelHandle, Provider,
};

pub(crate) struct OpenAIProvider {
    api: api::OpenAIApi,
    has_key: bool,
}

impl OpenAIProvider {
    pub(crate) fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
    ) -> Result<OpenAIProvider, url::ParseError> {
        let api_key = api_key.filter(|key| !key.is_empty());

        Ok(OpenAIProvider {
            api: api::OpenAIApi::new(api_key, api_base.unwrap_or(api::DEFAULT_API_BASE))?,
            has_key: api_key.is_some(),
        })
    }
}

impl From<api::ModelObject> for LiveModel {
    fn from(value: api::ModelObject) -> Self {
        LiveModel::new(value.id, None)
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn key(&self) -> ProviderKey {
        ProviderIdentifier::OpenAI.into()
    }

    fn has_credential(&self) -> bool {
        self.has_key
    }

    fn build_handle(&self, model: &str) -> Option<ModelHandle> {
        Some(ModelHandle::new(self.key(), model, self.api.endpoint().clone()))
    }

    async fn fetch_live_models(&self) -> Result<Vec<LiveModel>, Error> {
        if !self.has_key {
            return Err(Error::from_kind(ErrorKind::MissingCredential));
        }

        let models = self.api.models().await?;

        Ok(dedup_models(models.into_iter().map(LiveModel::from).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new(Some(""), Some(&server.uri())).unwrap();

        assert!(!provider.has_credential());

        let err = provider.fetch_live_models().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[tokio::test]
    async fn test_listing_is_deduplicated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "gpt-4.1"}, {"id": "o3"}, {"id": "gpt-4.1"}]
            })))
            .mount(&server)
            .await;

        let base = format!("{}/v1", server.uri());
        let provider = OpenAIProvider::new(Some("sk-test"), Some(&base)).unwrap();

        let models = provider.fetch_live_models().await.unwrap();

        assert_eq!(
            models,
            vec![LiveModel::new("gpt-4.1", None), LiveModel::new("o3", None)]
        );
    }

    #[test]
    fn test_handle_carries_endpoint() {
        let provider = OpenAIProvider::new(Some("sk-test"), None).unwrap();

        let handle = provider.build_handle("gpt-4.1").unwrap();

        assert_eq!(handle.provider().as_str(), "openai");
        assert_eq!(handle.model(), "gpt-4.1");
        assert_eq!(
            handle.endpoint().api_base().as_str(),
            "https://api.openai.com/v1/"
        );
    }
}
