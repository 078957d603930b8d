use async_trait::async_trait;

use super::api;
use crate::providers::{
    dedup_models, providers::ProviderIdentifier, providers::ProviderKey, Error, ErrorKind,
    LiveModel, ModelHandle, Provider,
};

const MODEL_PREFIX: &str = "models/";

impl api::ModelInfo {
    /// Embedding and other non-chat models do not advertise `generateContent`.
    /// A model listing no methods at all is kept.
    fn generates_content(&self) -> bool {
        self.supported_generation_methods.is_empty()
            || self
                .supported_generation_methods
                .iter()
                .any(|m| m == "generateContent")
    }
}

impl From<api::ModelInfo> for LiveModel {
    fn from(value: api::ModelInfo) -> Self {
        let id = value
            .name
            .strip_prefix(MODEL_PREFIX)
            .unwrap_or(&value.name)
            .to_string();

        LiveModel::new(id, value.display_name)
    }
}

pub(crate) struct GoogleProvider {
    api: api::GoogleApi,
    has_key: bool,
}

impl GoogleProvider {
    pub(crate) fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
    ) -> Result<GoogleProvider, url::ParseError> {
        let api_key = api_key.filter(|key| !key.is_empty());

        Ok(GoogleProvider {
            api: api::GoogleApi::new(api_key, api_base.unwrap_or(api::DEFAULT_API_BASE))?,
            has_key: api_key.is_some(),
        })
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    fn key(&self) -> ProviderKey {
        ProviderIdentifier::Google.into()
    }

    fn has_credential(&self) -> bool {
        self.has_key
    }

    fn build_handle(&self, model: &str) -> Option<ModelHandle> {
        let model = model.strip_prefix(MODEL_PREFIX).unwrap_or(model);

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
            .filter(|m| m.generates_content())
            .map(LiveModel::from)
            .collect();

        Ok(dedup_models(models))
    }
}
