use serde::Serialize;

use super::table::Table;
use super::{format_output, registry_or_die};
use crate::config::Config;
use crate::registry::refresh::{FetchOutcome, RefreshOutcome, RefreshReport};
use crate::RefreshArgs;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report {
    Throttled,
    Refreshed(RefreshReport),
}

impl From<Report> for Table {
    fn from(value: Report) -> Self {
        let mut tab = Table::new(vec!["PROVIDER", "STATUS", "MODELS", "DETAIL"]);

        let report = match value {
            Report::Throttled => return tab,
            Report::Refreshed(report) => report,
        };

        for provider in report.providers {
            let (status, models, detail) = match &provider.outcome {
                FetchOutcome::Listed { models } => ("listed", models.to_string(), String::new()),
                FetchOutcome::MissingCredential => ("skipped", String::new(), provider.outcome.to_string()),
                FetchOutcome::Failed { reason } => ("failed", String::new(), reason.clone()),
            };

            tab.add_row(vec![
                provider.provider.to_string(),
                status.to_string(),
                models,
                detail,
            ]);
        }

        tab
    }
}

pub(crate) async fn refresh_cmd(config: &Config, args: &RefreshArgs) {
    let registry = registry_or_die(config);

    let report = match registry.refresh(args.force).await {
        RefreshOutcome::Throttled => Report::Throttled,
        RefreshOutcome::Refreshed(report) => Report::Refreshed(report.as_ref().clone()),
    };

    format_output(report, args.format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ColorMode;
    use crate::color::configure_color;
    use crate::registry::refresh::ProviderRefresh;

    #[test]
    fn test_report_table() {
        configure_color(ColorMode::Off);

        let report = Report::Refreshed(RefreshReport {
            providers: vec![
                ProviderRefresh {
                    provider: "anthropic".into(),
                    outcome: FetchOutcome::Failed {
                        reason: "timeout".to_string(),
                    },
                },
                ProviderRefresh {
                    provider: "openai".into(),
                    outcome: FetchOutcome::Listed { models: 42 },
                },
            ],
        });

        let tab: Table = report.into();

        assert_eq!(
            tab.to_string(),
            "PROVIDER   STATUS  MODELS  DETAIL\n\
             anthropic  failed  -       timeout\n\
             openai     listed  42      -\n"
        );
    }

    #[test]
    fn test_throttled_json() {
        assert_eq!(
            serde_json::to_value(&Report::Throttled).unwrap(),
            serde_json::json!({"status": "throttled"})
        );
    }
}
