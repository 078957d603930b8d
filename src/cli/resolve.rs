use serde::Serialize;

use super::table::Table;
use super::{format_output, registry_or_die};
use crate::config::Config;
use crate::die;
use crate::providers::providers::ProviderKey;
use crate::providers::ModelHandle;
use crate::registry::Registry;
use crate::ResolveArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolved {
    provider: ProviderKey,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    api_base: String,
    is_tool_call_unsupported: bool,
    is_image_input_unsupported: bool,
    /// Whether the requested model was replaced by the fallback
    fallback: bool,
}

impl From<Resolved> for Table {
    fn from(value: Resolved) -> Self {
        let mut tab = Table::new(vec!["FIELD", "VALUE"]);

        tab.add_row(vec!["provider".to_string(), value.provider.to_string()]);
        tab.add_row(vec!["model".to_string(), value.model]);
        tab.add_row(vec!["name".to_string(), value.display_name.unwrap_or_default()]);
        tab.add_row(vec!["api_base".to_string(), value.api_base]);
        tab.add_row(vec![
            "tool_calls".to_string(),
            (!value.is_tool_call_unsupported).to_string(),
        ]);
        tab.add_row(vec![
            "image_input".to_string(),
            (!value.is_image_input_unsupported).to_string(),
        ]);
        tab.add_row(vec!["fallback".to_string(), value.fallback.to_string()]);

        tab
    }
}

fn describe(registry: &Registry, requested: Option<&str>, handle: &ModelHandle) -> Resolved {
    let key = registry.catalog().key_of(handle);
    let metadata = key.as_ref().and_then(|key| registry.catalog().metadata(key));

    let fallback_key = registry.fallback().to_string();
    let fallback =
        key.as_ref() == Some(registry.fallback()) && requested != Some(fallback_key.as_str());

    Resolved {
        provider: handle.provider().clone(),
        model: handle.model().to_string(),
        display_name: metadata.as_ref().and_then(|m| m.display_name.clone()),
        api_base: handle.endpoint().api_base().to_string(),
        is_tool_call_unsupported: registry.is_tool_call_unsupported(handle),
        is_image_input_unsupported: metadata
            .map(|m| m.image_input_unsupported)
            .unwrap_or(true),
        fallback,
    }
}

pub(crate) fn resolve_cmd(config: &Config, args: &ResolveArgs) {
    let registry = registry_or_die(config);

    let requested = args.model.as_deref();

    let handle = match registry.resolve(requested) {
        Ok(handle) => handle,
        Err(err) => die!("failed to resolve model: {}", err),
    };

    format_output(describe(&registry, requested, &handle), args.format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::providers::{OllamaProvider, OpenAIProvider};
    use crate::providers::Provider;
    use crate::registry::populate::seeded_registry;
    use std::sync::Arc;

    fn registry() -> Registry {
        let providers: Vec<Arc<dyn Provider>> = vec![
            Arc::new(OpenAIProvider::new(Some("sk-test"), None).unwrap()),
            Arc::new(OllamaProvider::new(None).unwrap()),
        ];

        seeded_registry(providers, None, "openai/gpt-4.1-mini".parse().unwrap())
    }

    #[test]
    fn test_describe_requested_model() {
        let registry = registry();
        let handle = registry.resolve(Some("ollama/gemma3:1b")).unwrap();

        let resolved = describe(&registry, Some("ollama/gemma3:1b"), &handle);

        assert_eq!(resolved.provider.as_str(), "ollama");
        assert!(resolved.is_tool_call_unsupported);
        assert!(resolved.is_image_input_unsupported);
        assert!(!resolved.fallback);
        assert_eq!(resolved.api_base, "http://localhost:11434/");
    }

    #[test]
    fn test_describe_fallback() {
        let registry = registry();
        let handle = registry.resolve(Some("mistral/large")).unwrap();

        let resolved = describe(&registry, Some("mistral/large"), &handle);

        assert_eq!(resolved.model, "gpt-4.1-mini");
        assert_eq!(resolved.display_name.as_deref(), Some("GPT-4.1 mini"));
        assert!(!resolved.is_image_input_unsupported);
        assert!(resolved.fallback);
    }
}
