use crate::providers::providers::{ProviderIdentifier, ProviderKey};

/// Models known to reject tool definitions.
const TOOL_CALL_UNSUPPORTED: &[(ProviderIdentifier, &str)] = &[
    (ProviderIdentifier::Ollama, "gemma3:1b"),
    (ProviderIdentifier::Ollama, "gemma3:4b"),
    (ProviderIdentifier::Ollama, "gemma3:12b"),
    (ProviderIdentifier::Ollama, "deepseek-r1:1.5b"),
    (ProviderIdentifier::Ollama, "deepseek-r1:8b"),
    (ProviderIdentifier::Ollama, "phi3:mini"),
    (ProviderIdentifier::OpenAI, "o1-mini"),
    (ProviderIdentifier::Google, "gemma-3-27b-it"),
];

/// Providers whose chat models accept image input.
const IMAGE_INPUT_PROVIDERS: &[ProviderIdentifier] = &[
    ProviderIdentifier::OpenAI,
    ProviderIdentifier::Anthropic,
    ProviderIdentifier::Google,
    ProviderIdentifier::Xai,
];

pub(crate) fn tool_call_unsupported(provider: &ProviderKey, model: &str) -> bool {
    TOOL_CALL_UNSUPPORTED
        .iter()
        .any(|(id, name)| provider == id && *name == model)
}

pub(crate) fn image_input_unsupported(provider: &ProviderKey) -> bool {
    !IMAGE_INPUT_PROVIDERS.iter().any(|id| provider == id)
}
