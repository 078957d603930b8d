use serde::Serialize;

use super::table::Table;
use super::{format_output, registry_or_die};
use crate::config::Config;
use crate::die;
use crate::providers::providers::ProviderKey;
use crate::registry::catalog::ProviderSummary;
use crate::{ListArgs, ListObject};

fn flag(unsupported: bool) -> &'static str {
    if unsupported {
        "no"
    } else {
        "yes"
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct Models(Vec<ProviderSummary>);

impl From<Models> for Table {
    fn from(value: Models) -> Self {
        let mut tab = Table::new(vec!["PROVIDER", "MODEL", "TOOLS", "IMAGES", "NAME"]);

        for provider in value.0 {
            for model in provider.models {
                tab.add_row(vec![
                    provider.provider.to_string(),
                    model.name,
                    flag(model.is_tool_call_unsupported).to_string(),
                    flag(model.is_image_input_unsupported).to_string(),
                    model.display_name.unwrap_or_default(),
                ]);
            }
        }

        tab
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Provider {
    provider: ProviderKey,
    #[serde(rename = "hasAPIKey")]
    has_api_key: bool,
    builtin: bool,
    models: usize,
}

impl From<Vec<Provider>> for Table {
    fn from(value: Vec<Provider>) -> Self {
        let mut tab = Table::new(vec!["PROVIDER", "KIND", "API_KEY", "MODELS"]);

        for provider in value {
            tab.add_row(vec![
                provider.provider.to_string(),
                if provider.builtin {
                    "builtin".to_string()
                } else {
                    "compatible".to_string()
                },
                if provider.has_api_key {
                    "present".to_string()
                } else {
                    "missing".to_string()
                },
                provider.models.to_string(),
            ]);
        }

        tab
    }
}

fn get_providers(summary: Vec<ProviderSummary>) -> Vec<Provider> {
    summary
        .into_iter()
        .map(|p| Provider {
            builtin: p.provider.builtin().is_some(),
            has_api_key: p.has_api_key,
            models: p.models.len(),
            provider: p.provider,
        })
        .collect()
}

fn only_provider(summary: Vec<ProviderSummary>, provider: &str) -> Vec<ProviderSummary> {
    let filtered: Vec<ProviderSummary> = summary
        .into_iter()
        .filter(|p| p.provider.as_str() == provider)
        .collect();

    if filtered.is_empty() {
        die!("failed to list models: provider \"{}\" does not exist", provider);
    }

    filtered
}

pub(crate) async fn list_cmd(config: &Config, args: &ListArgs) {
    let format = args.format;

    let registry = registry_or_die(config);

    match &args.object {
        ListObject::Models(args) => {
            let summary = if args.offline {
                registry.list_summary()
            } else {
                registry.summary().await
            };

            let summary = match &args.provider {
                Some(provider) => only_provider(summary, provider),
                None => summary,
            };

            format_output(Models(summary), format);
        }
        ListObject::Providers => {
            let providers = get_providers(registry.list_summary());
            format_output(providers, format);
        }
    }
}
