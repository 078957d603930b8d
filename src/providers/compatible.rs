//! OpenAI-compatible providers configured at startup (e.g. Together, Groq,
//! a local vLLM). Their model lists come from configuration rather than a
//! live listing.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

use super::openai::api::OpenAIApi;
use super::providers::ProviderKey;
use super::{dedup_models, Error, ErrorKind, LiveModel, ModelHandle, Provider};

/// A configured model: either a bare name or a table with details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum CompatibleModel {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, rename = "displayName")]
        display_name: Option<String>,
        #[serde(default, rename = "toolCallUnsupported")]
        tool_call_unsupported: bool,
    },
}

impl CompatibleModel {
    pub(crate) fn name(&self) -> &str {
        match self {
            CompatibleModel::Name(name) => name,
            CompatibleModel::Detailed { name, .. } => name,
        }
    }

    fn display_name(&self) -> Option<&str> {
        match self {
            CompatibleModel::Name(_) => None,
            CompatibleModel::Detailed { display_name, .. } => display_name.as_deref(),
        }
    }

    fn tool_call_unsupported(&self) -> bool {
        matches!(
            self,
            CompatibleModel::Detailed {
                tool_call_unsupported: true,
                ..
            }
        )
    }
}

/// Handles built for a compatible provider, along with the names of the
/// models that cannot make tool calls.
#[derive(Debug, Default)]
pub(crate) struct CompatibleModels {
    pub handles: Vec<(ModelHandle, Option<String>)>,
    pub tool_call_unsupported: HashSet<String>,
}

pub(crate) struct CompatibleProvider {
    key: ProviderKey,
    api: OpenAIApi,
    has_key: bool,
}

impl CompatibleProvider {
    pub(crate) fn new(
        key: ProviderKey,
        base_url: &str,
        api_key: Option<&str>,
    ) -> Result<CompatibleProvider, url::ParseError> {
        let api_key = api_key.filter(|k| !k.is_empty());

        Ok(CompatibleProvider {
            key,
            api: OpenAIApi::new(api_key, base_url)?,
            has_key: api_key.is_some(),
        })
    }

    pub(crate) fn build_handles(&self, models: &[CompatibleModel]) -> CompatibleModels {
        let mut built = CompatibleModels::default();

        for model in models {
            let name = model.name().trim();

            if name.is_empty() {
                continue;
            }

            if model.tool_call_unsupported() {
                built.tool_call_unsupported.insert(name.to_string());
            }

            if let Some(handle) = self.build_handle(name) {
                let display_name = model.display_name().map(str::to_string);

                built.handles.push((handle, display_name));
            }
        }

        built
    }
}

#[async_trait]
impl Provider for CompatibleProvider {
    fn key(&self) -> ProviderKey {
        self.key.clone()
    }

    fn has_credential(&self) -> bool {
        self.has_key
    }

    fn build_handle(&self, model: &str) -> Option<ModelHandle> {
        Some(ModelHandle::new(self.key(), model, self.api.endpoint().clone()))
    }

    fn lists_live_models(&self) -> bool {
        false
    }

    /// Lists the endpoint's models on demand. Refreshes never call this; the
    /// configured model list is authoritative for compatible providers.
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
