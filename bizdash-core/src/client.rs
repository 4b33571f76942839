//! HTTP client for the dashboard REST API.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::BizdashConfig;
use crate::entity::{EntityDraft, EntityKind};
use crate::import::EntityStore;

/// Errors from a single API request.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No bearer token was supplied; nothing was sent.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status. `message` is the
    /// server's `error` string when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP client for the dashboard API
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    /// `token` is the bearer token from the session provider. Without one,
    /// every request fails locally with [`ClientError::NotAuthenticated`].
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, token)
    }

    pub fn with_timeout(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url, token))
    }

    pub fn from_config(config: &BizdashConfig) -> Result<Self, ClientError> {
        Self::with_timeout(
            &config.api_url,
            config.token.clone(),
            config.request_timeout(),
        )
    }

    fn with_http(http: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(req.bearer_auth(token))
    }

    /// POST /api/{customers|inventory}
    ///
    /// The created entity in the response body is not needed and is ignored.
    pub async fn create_entity(&self, draft: &EntityDraft) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, draft.kind().endpoint());
        let req = self.authorized(self.http.post(&url))?.json(draft);

        check_status(req.send().await?).await?;
        Ok(())
    }

    /// GET /api/{customers|inventory}
    pub async fn list_entities(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        let url = format!("{}{}", self.base_url, kind.endpoint());
        let req = self.authorized(self.http.get(&url))?;

        let resp = check_status(req.send().await?).await?;
        Ok(resp.json().await?)
    }
}

impl EntityStore for Client {
    async fn create(&self, draft: &EntityDraft) -> Result<(), ClientError> {
        self.create_entity(draft).await
    }

    async fn refresh(&self, kind: EntityKind) -> Result<usize, ClientError> {
        Ok(self.list_entities(kind).await?.len())
    }
}

async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorResponse>().await {
        Ok(err) => err.error,
        Err(_) => generic_message(status),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn generic_message(status: StatusCode) -> String {
    format!("Request failed with status {}", status.as_u16())
}
