//! Concrete types for providers, along with their provider key variants

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The `ProviderIdentifier` names a built-in provider. Every built-in provider
/// has a live model listing and a factory in the directory.
///
/// The `to_string` and `FromStr` forms double as provider keys and should
/// remain stable.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ProviderIdentifier {
    OpenAI,
    Anthropic,
    Google,
    Xai,
    Ollama,
}

/// A provider key identifies any provider known to the registry, either a
/// built-in one or a compatible provider configured at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct ProviderKey(String);

impl ProviderKey {
    pub(crate) fn new<S: Into<String>>(key: S) -> ProviderKey {
        ProviderKey(key.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// The built-in provider this key refers to, if any.
    pub(crate) fn builtin(&self) -> Option<ProviderIdentifier> {
        ProviderIdentifier::from_str(&self.0).ok()
    }
}

impl From<ProviderIdentifier> for ProviderKey {
    fn from(value: ProviderIdentifier) -> Self {
        ProviderKey(value.to_string())
    }
}

impl From<&str> for ProviderKey {
    fn from(value: &str) -> Self {
        ProviderKey::new(value)
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<ProviderIdentifier> for ProviderKey {
    fn eq(&self, other: &ProviderIdentifier) -> bool {
        self.builtin() == Some(*other)
    }
}

pub(crate) use super::anthropic::AnthropicProvider;
pub(crate) use super::compatible::CompatibleProvider;
pub(crate) use super::google::GoogleProvider;
pub(crate) use super::ollama::OllamaProvider;
pub(crate) use super::openai::OpenAIProvider;
pub(crate) use super::xai::XaiProvider;
