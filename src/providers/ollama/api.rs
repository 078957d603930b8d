use reqwest::Client;
use serde::Deserialize;

use crate::providers::apireq::{self, Auth, Endpoint, ReqwestError};

pub(super) const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434";

// Structures to deserialize /api/tags

#[derive(Debug, Deserialize)]
pub(super) struct Tag {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsList {
    models: Vec<Tag>,
}

pub(super) struct OllamaApi {
    client: Client,
    endpoint: Endpoint,
}

impl OllamaApi {
    pub(super) fn with_api_base(api_base: &str) -> Result<OllamaApi, url::ParseError> {
        Ok(OllamaApi {
            client: apireq::client(),
            endpoint: Endpoint::new(api_base, Auth::None)?,
        })
    }

    pub(super) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub(super) async fn tags(&self) -> Result<Vec<Tag>, ReqwestError> {
        let req = apireq::get(&self.client, &self.endpoint, "api/tags")?;

        let tags: TagsList = apireq::send_json(req).await?;

        Ok(tags.models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::apireq::ReqwestErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_models_list() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{
                    "name": "gemma3:1b",
                    "model": "gemma3:1b",
                    "modified_at": "2025-05-10T08:06:48.639712648-07:00",
                    "size": 815319791,
                    "digest": "8648f39daa8fbf5b18c7b4e6a8fb4990c692751d49917417b8842ca5758e7ffc",
                    "details": {
                        "parent_model": "",
                        "format": "gguf",
                        "family": "gemma3",
                        "families": null,
                        "parameter_size": "999.89M",
                        "quantization_level": "Q4_K_M"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let api = OllamaApi::with_api_base(&server.uri()).unwrap();

        let tags = api.tags().await.unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "gemma3:1b");
    }

    #[tokio::test]
    async fn test_api_error_deserialization() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "not found"})),
            )
            .mount(&server)
            .await;

        let api = OllamaApi::with_api_base(&server.uri()).unwrap();

        let err = api.tags().await.unwrap_err();

        assert_eq!(
            err.kind(),
            ReqwestErrorKind::Status(reqwest::StatusCode::NOT_FOUND)
        );
        assert_eq!(err.to_string(), "404 Not Found: not found");
    }
}
