//! Where a provider lives and how to authenticate against it

use reqwest::{RequestBuilder, Url};
use std::fmt;

/// Authentication scheme used by a provider's API.
#[derive(Clone)]
pub(crate) enum Auth {
    /// No authentication (local servers)
    None,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// A provider-specific header carrying the key, e.g. `x-api-key`
    Header { name: &'static str, value: String },
}

impl Auth {
    pub(crate) fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Auth::None => req,
            Auth::Bearer(token) => req.bearer_auth(token),
            Auth::Header { name, value } => req.header(*name, value),
        }
    }
}

// Never print the secret.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => write!(f, "None"),
            Auth::Bearer(_) => write!(f, "Bearer(<redacted>)"),
            Auth::Header { name, .. } => write!(f, "Header({}: <redacted>)", name),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    api_base: Url,
    auth: Auth,
}

impl Endpoint {
    /// Parse an API base. The base is treated as a directory: a missing
    /// trailing slash is added so relative paths are appended to it rather
    /// than replacing its last segment.
    pub(crate) fn new(api_base: &str, auth: Auth) -> Result<Endpoint, url::ParseError> {
        let mut api_base = Url::parse(api_base)?;

        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        Ok(Endpoint { api_base, auth })
    }

    pub(crate) fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub(crate) fn auth(&self) -> &Auth {
        &self.auth
    }

    pub(crate) fn join(&self, path: &str) -> Result<Url, url::ParseError> {
        self.api_base.join(path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keeps_base_path() {
        let endpoint = Endpoint::new("https://api.together.xyz/v1", Auth::None).unwrap();

        assert_eq!(
            endpoint.join("models").unwrap().as_str(),
            "https://api.together.xyz/v1/models"
        );
        assert_eq!(
            endpoint.join("/models").unwrap().as_str(),
            "https://api.together.xyz/v1/models"
        );
    }

    #[test]
    fn test_bare_host() {
        let endpoint = Endpoint::new("http://localhost:11434", Auth::None).unwrap();

        assert_eq!(endpoint.api_base().as_str(), "http://localhost:11434/");
    }

    #[test]
    fn test_invalid_base() {
        assert!(Endpoint::new("not a url", Auth::None).is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let auth = Auth::Header {
            name: "x-api-key",
            value: "sk-secret".to_string(),
        };

        let printed = format!("{:?} {:?}", auth, Auth::Bearer("sk-secret".to_string()));

        assert!(!printed.contains("sk-secret"));
    }
}
