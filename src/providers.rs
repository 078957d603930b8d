//! Traits and type definitions for model providers.
//!
//! The `providers` module contains the components that talk to upstream model
//! APIs. Every provider is accessed through the [`Provider`] trait, a general
//! interface for building callable model handles and listing the models a
//! provider currently serves.
//!
//! ## Providers
//!
//! Each API provider (e.g., OpenAI or Ollama) must implement the [`Provider`] trait to
//! be usable by the registry. Providers must support three essential operations:
//! - Handles: Turn a raw model name into a [`ModelHandle`] which carries the endpoint
//!   and credentials needed to call the model.
//! - Credentials: Report whether the minimum credential needed to serve traffic is
//!   present. Local providers which need no key always report true.
//! - Live Models: Query the provider's model listing endpoint.
//!
//! Compatible providers are configured at startup with a fixed model list. They
//! opt out of live listing through [`Provider::lists_live_models`].
//!
//! ## Error Handling
//!
//! Each API has its own bespoke error payloads. Requests are made through the
//! `apireq` helpers, whose errors are categorized into [`Error`] with an
//! [`ErrorKind`] giving an indication of what went wrong.

mod anthropic;
mod apireq;
mod compatible;
mod google;
mod handle;
mod ollama;
mod openai;
mod xai;

pub(crate) mod providers;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;

pub(crate) use self::apireq::{Auth, Endpoint};
pub(crate) use self::compatible::CompatibleModel;
pub(crate) use self::handle::{HandleId, ModelHandle};
use self::providers::ProviderKey;

/// This is a list specifying general categories of errors that
/// can be returned by a [`Provider`]. This list may be updated
/// as providers are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Failed to connect to the underlying API service.
    /// This could be due to network issues like DNS
    /// resolution, connectivity issues, or routing problems.
    Connection,
    /// A request timed out.
    TimedOut,
    /// The API rejected the credential or service-specific
    /// permissions are needed.
    Authentication,
    /// No credential is configured, so no request was made.
    MissingCredential,
    /// A rate limit was reached or a quota was exceeded.
    ExcessUsage,
    /// The servers are overloaded. This is non-fatal
    /// and indicates that a retry may be needed later.
    ApiOverloaded,
    /// The requested resource was not found.
    NotFound,
    /// The request was malformed or is otherwise improper. This
    /// often corresponds to errors with HTTP status codes in
    /// the 400s.
    BadRequest,
    /// The server encountered an error. This often corresponds to
    /// errors with HTTP status codes in the 500s.
    InternalError,
    /// An API response was unable to be deserialized, malformed,
    /// or otherwise violated the assumptions of the client.
    UnexpectedResponse,
    /// An error that does not fit into any of the other categories.
    UnspecifiedError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub(crate) fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the API service",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::Authentication => "authentication failed",
            ErrorKind::MissingCredential => "no API key is configured",
            ErrorKind::ExcessUsage => "rate limit exceeded or quota crossed",
            ErrorKind::ApiOverloaded => "API server(s) are currently overloaded",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::InternalError => "the server encountered an internal error",
            ErrorKind::UnexpectedResponse => "API response was unexpected or malformed",
            ErrorKind::UnspecifiedError => "an unspecified error occurred",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message(), source),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

/// One entry of a provider's live model listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiveModel {
    /// The ID of the model. This must be an acceptable parameter to
    /// [`Provider::build_handle`].
    pub id: String,
    /// A human readable name, if the provider reports one.
    pub display_name: Option<String>,
}

impl LiveModel {
    pub(crate) fn new<S: Into<String>>(id: S, display_name: Option<String>) -> LiveModel {
        let id = id.into();

        // A display name identical to the id carries no information
        let display_name = display_name.filter(|name| !name.is_empty() && *name != id);

        LiveModel { id, display_name }
    }
}

/// Drop repeated ids from a listing, keeping the first occurrence.
pub(crate) fn dedup_models(models: Vec<LiveModel>) -> Vec<LiveModel> {
    let mut seen = std::collections::HashSet::new();

    models
        .into_iter()
        .filter(|model| seen.insert(model.id.clone()))
        .collect()
}

/// A trait implemented by all model providers.
#[async_trait]
pub(crate) trait Provider: Send + Sync {
    /// Returns the provider key.
    fn key(&self) -> ProviderKey;

    /// Returns true if the credential needed to serve traffic is present.
    fn has_credential(&self) -> bool;

    /// Builds a callable handle for the raw model name, or None if the
    /// provider cannot serve it.
    fn build_handle(&self, model: &str) -> Option<ModelHandle>;

    /// Whether the provider takes part in live refreshes.
    fn lists_live_models(&self) -> bool {
        true
    }

    /// Lists the models the provider currently serves.
    async fn fetch_live_models(&self) -> Result<Vec<LiveModel>, Error>;
}
