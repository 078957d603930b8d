//! The xAI provider. Its API is OpenAI-compatible, so the OpenAI listing
//! client is reused with a different base.

use async_trait::async_trait;

use super::openai::api::OpenAIApi;
use super::providers::{ProviderIdentifier, ProviderKey};
use super::{dedup_models, Error, ErrorKind, LiveModel, ModelHandle, Provider};

const DEFAULT_API_BASE: &str = "https://api.x.ai/v1/";

pub(crate) struct XaiProvider {
    api: OpenAIApi,
    has_key: bool,
}

impl XaiProvider {
    pub(crate) fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
    ) -> Result<XaiProvider, url::ParseError> {
        let api_key = api_key.filter(|key| !key.is_empty());

        Ok(XaiProvider {
            api: OpenAIApi::new(api_key, api_base.unwrap_or(DEFAULT_API_BASE))?,
            has_key: api_key.is_some(),
        })
    }
}

#[async_trait]
impl Provider for XaiProvider {
    fn key(&self) -> ProviderKey {
        ProviderIdentifier::Xai.into()
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

        let models = self
            .api
            .models()
            .await?
            .into_iter()
            .map(|m| LiveModel::new(m.id, None))
            .collect();

        Ok(dedup_models(models))
    }
}
