//! services/client/src/adapters/http.rs
//!
//! The shared HTTP plumbing used by every remote adapter: base URL handling,
//! bearer authentication, request ids, and the mapping from HTTP status codes
//! onto `PortError`.

use docgen_core::{Identity, PortError, PortResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;

//=========================================================================================
// The Shared Client
//=========================================================================================

/// A client for the remote authoring service. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    identity: Option<Identity>,
}

impl ApiClient {
    /// Creates a client without an identity; only public endpoints will work.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            identity: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    /// Returns a client that authenticates as `identity`.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    fn url(&self, path: &str) -> PortResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortError::Unexpected(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Builds a request for an endpoint that does not need a credential.
    pub(crate) fn public(&self, method: Method, path: &str) -> PortResult<RequestBuilder> {
        let url = self.url(path)?;
        let request_id = Uuid::new_v4();
        debug!("{} {} (request {})", method, url, request_id);
        Ok(self
            .http
            .request(method, url)
            .header("x-request-id", request_id.to_string()))
    }

    /// Builds a request carrying the bearer credential. Fails without a network
    /// round trip when there is no identity.
    pub(crate) fn authed(&self, method: Method, path: &str) -> PortResult<RequestBuilder> {
        let identity = self.identity.as_ref().ok_or(PortError::Unauthorized)?;
        Ok(self
            .public(method, path)?
            .bearer_auth(&identity.access_token))
    }

    /// Sends a request and turns non-success statuses into port errors.
    pub(crate) async fn send(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        check_status(response).await
    }

    /// Sends a request and decodes a JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> PortResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("malformed response body: {}", e)))
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn transport_error(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Unexpected("the request timed out".to_string())
    } else if e.is_connect() {
        PortError::Unexpected(format!("could not reach the service: {}", e))
    } else {
        PortError::Unexpected(e.to_string())
    }
}

async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body);
    warn!("{} returned {}: {}", path, status, detail);

    Err(match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => PortError::NotFound(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            PortError::InvalidRequest(detail)
        }
        _ => PortError::Unexpected(format!("{} returned {}: {}", path, status, detail)),
    })
}

/// Pulls the human readable part out of an error body (`{"detail": ...}`).
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned())
        .map(|detail| match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        });
    match detail {
        Some(detail) => detail,
        None if body.trim().is_empty() => "no details".to_string(),
        None => body.trim().chars().take(200).collect(),
    }
}
