use async_trait::async_trait;

use super::api;
use crate::providers::{
    dedup_models, providers::ProviderIdentifier, providers::ProviderKey, Error, ErrorKind,
    LiveModel, ModelHandle, Provider,
};

impl From<api::ModelInfo> for LiveModel {
    fn from(value: api::ModelInfo) -> Self {
        LiveModel::new(value.id, value.display_name)
    }
}

pub(crate) struct AnthropicProvider {
    api: api::AnthropicApi,
    has_key: bool,
}

impl AnthropicProvider {
    pub(crate) fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
    ) -> Result<AnthropicProvider, url::ParseError> {
        let api_key = api_key.filter(|key| !key.is_empty());

        Ok(AnthropicProvider {
            api: api::AnthropicApi::new(api_key, api_base.unwrap_or(api::DEFAULT_API_BASE))?,
            has_key: api_key.is_some(),
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn key(&self) -> ProviderKey {
        ProviderIdentifier::Anthropic.into()
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
    async fn test_prefers_display_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": "claude-sonnet-4-0", "display_name": "Claude Sonnet 4"},
                    {"id": "claude-2.1"}
                ],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let base = format!("{}/v1", server.uri());
        let provider = AnthropicProvider::new(Some("sk-ant-test"), Some(&base)).unwrap();

        let models = provider.fetch_live_models().await.unwrap();

        assert_eq!(
            models,
            vec![
                LiveModel::new("claude-sonnet-4-0", Some("Claude Sonnet 4".to_string())),
                LiveModel::new("claude-2.1", None),
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(Some("bad"), Some(&server.uri())).unwrap();

        let err = provider.fetch_live_models().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
    }
}
