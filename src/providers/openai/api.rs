//! Client for the OpenAI `/models` listing. xAI and compatible providers
//! speak the same protocol and reuse it.

use reqwest::Client;
use serde::Deserialize;

use crate::providers::apireq::{self, Auth, Endpoint, ReqwestError};

pub(crate) const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";

/* Structures to deserialize /models */

#[derive(Deserialize, Debug)]
pub(crate) struct ModelObject {
    pub id: String,
}

#[derive(Deserialize, Debug)]
struct ModelList {
    data: Vec<ModelObject>,
}

pub(crate) struct OpenAIApi {
    client: Client,
    endpoint: Endpoint,
}

impl OpenAIApi {
    pub(crate) fn new(api_key: Option<&str>, api_base: &str) -> Result<OpenAIApi, url::ParseError> {
        let auth = match api_key {
            Some(key) => Auth::Bearer(key.to_string()),
            None => Auth::None,
        };

        Ok(OpenAIApi {
            client: apireq::client(),
            endpoint: Endpoint::new(api_base, auth)?,
        })
    }

    pub(crate) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub(crate) async fn models(&self) -> Result<Vec<ModelObject>, ReqwestError> {
        let req = apireq::get(&self.client, &self.endpoint, "models")?;

        let list: ModelList = apireq::send_json(req).await?;

        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::apireq::ReqwestErrorKind as ErrorKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_models_list() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "gpt-4.1", "object": "model", "owned_by": "system"},
                    {"id": "gpt-4o-mini", "object": "model", "owned_by": "system"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = OpenAIApi::new(Some("sk-test"), &format!("{}/v1", server.uri())).unwrap();

        let models = api.models().await.unwrap();

        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["gpt-4.1", "gpt-4o-mini"]);
    }

    #[tokio::test]
    async fn test_invalid_creds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let api = OpenAIApi::new(Some("not_a_valid_key"), &format!("{}/v1", server.uri())).unwrap();

        let err = api.models().await.unwrap_err();

        assert_eq!(
            err.kind(),
            ErrorKind::Status(reqwest::StatusCode::UNAUTHORIZED)
        );
        assert!(err.to_string().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let api = OpenAIApi::new(Some("sk-test"), &format!("{}/v1", server.uri())).unwrap();

        let err = api.models().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DecodingFailed);
    }
}
