//! A utility module with helpers for making and parsing API requests.

mod endpoint;
mod error;
mod provider;

pub(crate) use endpoint::{Auth, Endpoint};
pub(crate) use error::Error as ReqwestError;
pub(crate) use error::ErrorKind as ReqwestErrorKind;

use reqwest::header::{HeaderValue, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Upper bound on a single listing request, connection included.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by all requests a provider makes.
pub(crate) fn client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to configure http client, using defaults");
            Client::new()
        })
}

/// Start an uncached GET request against `path`, relative to the endpoint's
/// API base, with the endpoint's authentication applied.
pub(crate) fn get(
    client: &Client,
    endpoint: &Endpoint,
    path: &str,
) -> Result<RequestBuilder, ReqwestError> {
    let url = endpoint.join(path)?;

    let req = client
        .get(url)
        .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Ok(endpoint.auth().apply(req))
}

/// Send a request and deserialize a successful JSON response. Any
/// non-success status is returned as an error carrying the body's message.
pub(crate) async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ReqwestError> {
    let res = req.send().await?;

    let status = res.status();

    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();

        return Err(ReqwestError::from_status(status, &body));
    }

    Ok(res.json().await?)
}
