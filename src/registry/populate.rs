//! Startup population of the registry: built-in providers, the static seed
//! catalog and compatible providers described by configuration.

use serde::Deserialize;
use std::sync::Arc;

use super::catalog::{Capabilities, Catalog};
use super::directory::ProviderDirectory;
use super::registry::{Error, ModelKey, Registry};
use crate::config::{env_var, Config};
use crate::providers::providers::{
    AnthropicProvider, CompatibleProvider, GoogleProvider, OllamaProvider, OpenAIProvider,
    ProviderIdentifier, ProviderKey, XaiProvider,
};
use crate::providers::{CompatibleModel, Provider};

pub(crate) const DEFAULT_FALLBACK_MODEL: &str = "openai/gpt-4.1-mini";

const OPENAI_KEY_VARS: &[&str] = &["OPENAI_API_KEY"];
const ANTHROPIC_KEY_VARS: &[&str] = &["ANTHROPIC_API_KEY"];
const GOOGLE_KEY_VARS: &[&str] = &["GOOGLE_GENERATIVE_AI_API_KEY", "GEMINI_API_KEY"];
const XAI_KEY_VARS: &[&str] = &["XAI_API_KEY"];

/// Models catalogued before the first live refresh, with their display names.
const SEED_MODELS: &[(ProviderIdentifier, &str, Option<&str>)] = &[
    (ProviderIdentifier::OpenAI, "gpt-4.1", Some("GPT-4.1")),
    (ProviderIdentifier::OpenAI, "gpt-4.1-mini", Some("GPT-4.1 mini")),
    (ProviderIdentifier::OpenAI, "gpt-4.1-nano", Some("GPT-4.1 nano")),
    (ProviderIdentifier::OpenAI, "gpt-4o", Some("GPT-4o")),
    (ProviderIdentifier::OpenAI, "o3", None),
    (ProviderIdentifier::OpenAI, "o4-mini", None),
    (ProviderIdentifier::Anthropic, "claude-opus-4-1", Some("Claude Opus 4.1")),
    (ProviderIdentifier::Anthropic, "claude-sonnet-4-0", Some("Claude Sonnet 4")),
    (ProviderIdentifier::Anthropic, "claude-3-5-haiku-latest", Some("Claude Haiku 3.5")),
    (ProviderIdentifier::Google, "gemini-2.5-pro", Some("Gemini 2.5 Pro")),
    (ProviderIdentifier::Google, "gemini-2.5-flash", Some("Gemini 2.5 Flash")),
    (ProviderIdentifier::Xai, "grok-4", Some("Grok 4")),
    (ProviderIdentifier::Xai, "grok-3-mini", Some("Grok 3 Mini")),
    (ProviderIdentifier::Ollama, "llama3.1:8b", None),
    (ProviderIdentifier::Ollama, "gemma3:1b", None),
];

/// One OpenAI-compatible provider described by the external payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompatibleProviderConfig {
    pub provider: String,
    #[serde(alias = "baseURL")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub models: Vec<CompatibleModel>,
}

fn api_key(configured: Option<&String>, vars: &[&str]) -> Option<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .cloned()
        .or_else(|| vars.iter().find_map(|var| env_var(var)))
}

fn invalid_api_base(id: ProviderIdentifier) -> impl FnOnce(url::ParseError) -> Error {
    move |err| Error::InvalidApiBase(id.into(), err)
}

/// Construct the built-in providers, taking credentials from the config file
/// or the environment.
pub(crate) fn builtin_providers(config: &Config) -> Result<Vec<Arc<dyn Provider>>, Error> {
    let providers = &config.providers;

    let openai = OpenAIProvider::new(
        api_key(providers.openai.api_key.as_ref(), OPENAI_KEY_VARS).as_deref(),
        providers.openai.api_base.as_deref(),
    )
    .map_err(invalid_api_base(ProviderIdentifier::OpenAI))?;

    let anthropic = AnthropicProvider::new(
        api_key(providers.anthropic.api_key.as_ref(), ANTHROPIC_KEY_VARS).as_deref(),
        providers.anthropic.api_base.as_deref(),
    )
    .map_err(invalid_api_base(ProviderIdentifier::Anthropic))?;

    let google = GoogleProvider::new(
        api_key(providers.google.api_key.as_ref(), GOOGLE_KEY_VARS).as_deref(),
        providers.google.api_base.as_deref(),
    )
    .map_err(invalid_api_base(ProviderIdentifier::Google))?;

    let xai = XaiProvider::new(
        api_key(providers.xai.api_key.as_ref(), XAI_KEY_VARS).as_deref(),
        providers.xai.api_base.as_deref(),
    )
    .map_err(invalid_api_base(ProviderIdentifier::Xai))?;

    let ollama = OllamaProvider::new(providers.ollama.api_base.as_deref())
        .map_err(invalid_api_base(ProviderIdentifier::Ollama))?;

    Ok(vec![
        Arc::new(openai),
        Arc::new(anthropic),
        Arc::new(google),
        Arc::new(xai),
        Arc::new(ollama),
    ])
}

/// Parse the compatible-provider payload. An absent or malformed payload
/// yields no providers; malformed entries are skipped individually.
pub(crate) fn parse_compatible_providers(payload: Option<&str>) -> Vec<CompatibleProviderConfig> {
    let payload = match payload.map(str::trim) {
        Some(payload) if !payload.is_empty() => payload,
        _ => return Vec::new(),
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(payload) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed compatible provider configuration");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping malformed compatible provider");
                None
            }
        })
        .collect()
}

fn seed_catalog(directory: &ProviderDirectory, catalog: &Catalog) {
    for &(id, model, display_name) in SEED_MODELS {
        let key = ModelKey::new(id.into(), model);
        let handle = directory.factory(&key.provider, model);

        catalog.register(
            key,
            handle,
            Capabilities::with_display_name(display_name.map(str::to_string)),
        );
    }
}

fn add_compatible_providers(
    directory: &mut ProviderDirectory,
    catalog: &Catalog,
    configs: Vec<CompatibleProviderConfig>,
) {
    for config in configs {
        let name = config.provider.trim();

        if name.is_empty() {
            tracing::warn!("skipping compatible provider without an identifier");
            continue;
        }

        if name.contains('/') {
            tracing::warn!(provider = name, "skipping compatible provider, identifiers cannot contain '/'");
            continue;
        }

        let key = ProviderKey::new(name);

        if ProviderKey::new(name.to_lowercase()).builtin().is_some() || directory.contains(&key) {
            tracing::warn!(provider = %key, "skipping compatible provider, the identifier is already taken");
            continue;
        }

        let provider = match CompatibleProvider::new(key.clone(), &config.base_url, config.api_key.as_deref()) {
            Ok(provider) => provider,
            Err(err) => {
                tracing::warn!(provider = %key, error = %err, "skipping compatible provider with an invalid base URL");
                continue;
            }
        };

        let built = provider.build_handles(&config.models);
        let mut registered = 0;

        for (handle, display_name) in built.handles {
            let model = handle.model().to_string();

            let capabilities = Capabilities {
                display_name,
                tool_call_unsupported: Some(built.tool_call_unsupported.contains(&model)),
                image_input_unsupported: Some(true),
            };

            if catalog.register(ModelKey::new(key.clone(), model), Some(handle), capabilities) {
                registered += 1;
            }
        }

        tracing::debug!(provider = %key, models = registered, "added compatible provider");

        directory.override_credential(key, provider.has_credential());
        directory.add_provider(Arc::new(provider));
    }
}

/// Build a registry from already constructed providers.
pub(crate) fn seeded_registry(
    providers: Vec<Arc<dyn Provider>>,
    compatible_payload: Option<&str>,
    fallback: ModelKey,
) -> Registry {
    let mut directory = ProviderDirectory::new();

    for provider in providers {
        directory.add_provider(provider);
    }

    let catalog = Catalog::new();

    seed_catalog(&directory, &catalog);

    add_compatible_providers(
        &mut directory,
        &catalog,
        parse_compatible_providers(compatible_payload),
    );

    Registry::new(directory, catalog, fallback)
}

/// Populate a registry from the configuration and environment.
pub(crate) fn populated_registry(config: &Config) -> Result<Registry, Error> {
    let fallback: ModelKey = config
        .fallback_model
        .as_deref()
        .unwrap_or(DEFAULT_FALLBACK_MODEL)
        .parse()?;

    let providers = builtin_providers(config)?;
    let payload = config.compatible_payload();

    Ok(seeded_registry(providers, payload.as_deref(), fallback))
}
