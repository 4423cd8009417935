//! TigerGraph HTTP client
//!
//! Two servers are involved: REST++ (`base_url`, bearer token auth per graph)
//! and the GSQL server (`gsql_url`, basic auth). Every call takes the run's
//! `RunContext` and clips its timeout to the remaining deadline.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::auth::TokenCache;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Path answering 200 when REST++ is up
pub const PING_PATH: &str = "/api/ping";

/// Connection settings for a TigerGraph instance
#[derive(Debug, Clone)]
pub struct TigerGraphSettings {
    /// REST++ base URL, e.g. `http://localhost:9000`
    pub base_url: String,
    /// GSQL server base URL, e.g. `http://localhost:14240`
    pub gsql_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

/// TigerGraph API client
#[derive(Debug)]
pub struct TigerGraphClient {
    pub(super) http: Client,
    pub(super) base_url: String,
    pub(super) gsql_url: String,
    pub(super) username: String,
    pub(super) password: String,
    pub(super) timeout: Duration,
    pub(super) tokens: Mutex<TokenCache>,
}

impl TigerGraphClient {
    /// Create a new client
    pub fn new(settings: TigerGraphSettings) -> Result<Self> {
        if settings.base_url.is_empty() || settings.gsql_url.is_empty() {
            return Err(Error::Config("TigerGraph URLs cannot be empty".to_string()));
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            gsql_url: settings.gsql_url.trim_end_matches('/').to_string(),
            username: settings.username,
            password: settings.password,
            timeout: settings.timeout,
            tokens: Mutex::new(TokenCache::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gsql_url(&self) -> &str {
        &self.gsql_url
    }

    /// GET a REST++ path authenticated for `graph`, decoding the JSON body
    pub fn get<T: DeserializeOwned>(&self, ctx: &RunContext, path: &str, graph: &str) -> Result<T> {
        let request = self.rest_request(ctx, Method::GET, path, graph)?;
        self.request_into(ctx, request)
    }

    /// POST a JSON body to a REST++ path authenticated for `graph`
    pub fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        ctx: &RunContext,
        path: &str,
        graph: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.rest_request(ctx, Method::POST, path, graph)?.json(body);
        self.request_into(ctx, request)
    }

    /// POST raw bytes to a REST++ path authenticated for `graph`
    pub fn post_raw<T: DeserializeOwned>(
        &self,
        ctx: &RunContext,
        path: &str,
        graph: &str,
        body: Vec<u8>,
    ) -> Result<T> {
        let request = self.rest_request(ctx, Method::POST, path, graph)?.body(body);
        self.request_into(ctx, request)
    }

    /// Check that REST++ is reachable
    pub fn ping(&self, ctx: &RunContext) -> Result<()> {
        let request = self
            .http
            .get(format!("{}{}", self.base_url, PING_PATH));
        let response = self.send(ctx, request)?;
        self.check_response_status(&response)
    }

    /// Build a REST++ request carrying a bearer token for `graph`
    fn rest_request(
        &self,
        ctx: &RunContext,
        method: Method,
        path: &str,
        graph: &str,
    ) -> Result<RequestBuilder> {
        let token = self.token_for(ctx, graph)?;
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }

    /// Build a GSQL server request with basic auth
    pub(super) fn gsql_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.gsql_url, path))
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Send a request, decode a 200 response body as JSON
    pub(super) fn request_into<T: DeserializeOwned>(
        &self,
        ctx: &RunContext,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(ctx, request)?;
        self.check_response_status(&response)?;

        let text = response
            .text()
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            Error::transport(format!(
                "Failed to parse TigerGraph response: {}. Response: {}",
                e, text
            ))
        })
    }

    /// Send a request after checking the run context
    pub(super) fn send(&self, ctx: &RunContext, request: RequestBuilder) -> Result<Response> {
        ctx.check()?;

        let request = request
            .timeout(ctx.request_timeout(self.timeout))
            .build()
            .map_err(|e| Error::transport(format!("Invalid request: {}", e)))?;

        tracing::debug!(method = %request.method(), url = %request.url().path(), "TigerGraph request");

        self.http
            .execute(request)
            .map_err(|e| self.map_request_error(ctx, e))
    }

    /// Map reqwest errors to user-friendly messages
    fn map_request_error(&self, ctx: &RunContext, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            if ctx.remaining().is_some() {
                Error::transport("TigerGraph request timed out or the run deadline was reached")
            } else {
                Error::transport(format!(
                    "Connection timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            }
        } else if error.is_connect() {
            Error::transport("Unable to connect to TigerGraph")
        } else {
            Error::transport(format!("TigerGraph request failed: {}", error))
        }
    }

    /// Anything but 200 is a failure
    pub(super) fn check_response_status(&self, response: &Response) -> Result<()> {
        match response.status().as_u16() {
            200 => Ok(()),
            401 => Err(Error::transport(
                "TigerGraph authentication failed. Check the username and password.",
            )),
            403 => Err(Error::transport(
                "TigerGraph access denied. Check the user's permissions.",
            )),
            404 => Err(Error::transport(format!(
                "TigerGraph endpoint not found: {}",
                response.url().path()
            ))),
            status => Err(Error::transport(format!(
                "TigerGraph returned non-OK status code: HTTP {}",
                status
            ))),
        }
    }
}
