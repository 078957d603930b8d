use reqwest::Client;
use serde::Deserialize;

use crate::providers::apireq::{self, Auth, Endpoint, ReqwestError};

pub(super) const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1/";

const API_VERSION: &str = "2023-06-01";

const PAGE_SIZE: &str = "1000";

// Guards against a server that keeps reporting more pages
const MAX_PAGES: usize = 10;

/* Structures to deserialize /models */

#[derive(Deserialize, Debug)]
pub(super) struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ModelPage {
    data: Vec<ModelInfo>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

pub(super) struct AnthropicApi {
    client: Client,
    endpoint: Endpoint,
}

impl AnthropicApi {
    pub(super) fn new(api_key: Option<&str>, api_base: &str) -> Result<AnthropicApi, url::ParseError> {
        let auth = match api_key {
            Some(key) => Auth::Header {
                name: "x-api-key",
                value: key.to_string(),
            },
            None => Auth::None,
        };

        Ok(AnthropicApi {
            client: apireq::client(),
            endpoint: Endpoint::new(api_base, auth)?,
        })
    }

    pub(super) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// List all models, following `has_more`/`last_id` pagination.
    pub(super) async fn models(&self) -> Result<Vec<ModelInfo>, ReqwestError> {
        let mut models = Vec::new();
        let mut after_id: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut req = apireq::get(&self.client, &self.endpoint, "models")?
                .header("anthropic-version", API_VERSION)
                .query(&[("limit", PAGE_SIZE)]);

            if let Some(after_id) = &after_id {
                req = req.query(&[("after_id", after_id.as_str())]);
            }

            let page: ModelPage = apireq::send_json(req).await?;

            models.extend(page.data);

            match (page.has_more, page.last_id) {
                (true, Some(last_id)) => after_id = Some(last_id),
                _ => break,
            }
        }

        Ok(models)
    }
}
