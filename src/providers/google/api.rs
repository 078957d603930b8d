use reqwest::Client;
use serde::Deserialize;

use crate::providers::apireq::{self, Auth, Endpoint, ReqwestError};

pub(super) const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/";

const PAGE_SIZE: &str = "1000";

const MAX_PAGES: usize = 10;

/* Structures to deserialize /models */

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-pro`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ModelPage {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

pub(super) struct GoogleApi {
    client: Client,
    endpoint: Endpoint,
}

impl GoogleApi {
    pub(super) fn new(api_key: Option<&str>, api_base: &str) -> Result<GoogleApi, url::ParseError> {
        let auth = match api_key {
            Some(key) => Auth::Header {
                name: "x-goog-api-key",
                value: key.to_string(),
            },
            None => Auth::None,
        };

        Ok(GoogleApi {
            client: apireq::client(),
            endpoint: Endpoint::new(api_base, auth)?,
        })
    }

    pub(super) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub(super) async fn models(&self) -> Result<Vec<ModelInfo>, ReqwestError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut req =
                apireq::get(&self.client, &self.endpoint, "models")?.query(&[("pageSize", PAGE_SIZE)]);

            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let page: ModelPage = apireq::send_json(req).await?;

            models.extend(page.models);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}
