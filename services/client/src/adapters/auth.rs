//! services/client/src/adapters/auth.rs
//!
//! This module contains the adapter for the remote authentication endpoints.
//! It implements the `AuthService` port from the `core` crate.

use async_trait::async_trait;
use docgen_core::{AuthService, Identity, PortResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::http::ApiClient;

/// An adapter that implements `AuthService` with the service's token endpoint.
#[derive(Clone)]
pub struct HttpAuthAdapter {
    api: ApiClient,
}

impl HttpAuthAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[async_trait]
impl AuthService for HttpAuthAdapter {
    async fn register(&self, email: &str, password: &str) -> PortResult<()> {
        let request = self
            .api
            .public(Method::POST, "auth/register")?
            .json(&RegisterRequest { email, password });
        self.api.send(request).await?;
        Ok(())
    }

    /// The token endpoint takes an OAuth2 password form, with the email as `username`.
    async fn login(&self, email: &str, password: &str) -> PortResult<Identity> {
        let request = self
            .api
            .public(Method::POST, "auth/token")?
            .form(&[("username", email), ("password", password)]);
        let token: TokenResponse = self.api.send_json(request).await?;
        Ok(Identity {
            access_token: token.access_token,
            email: Some(email.to_string()),
        })
    }
}
