//! REST++ token authentication
//!
//! Tokens are requested per graph with basic auth and cached until they
//! expire. The cache is owned by the client; every lookup re-checks expiry.
//!
//! https://docs.tigergraph.com/tigergraph-server/current/api/built-in-endpoints#_request_a_token

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::client::TigerGraphClient;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};

/// Path for requesting a token
pub const REQUEST_TOKEN_PATH: &str = "/requesttoken";

#[derive(Debug, Serialize)]
struct RequestTokenRequest<'a> {
    graph: &'a str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RequestTokenResults {
    #[serde(default)]
    pub token: String,
}

/// Response body when requesting a token
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RequestTokenResponse {
    #[serde(default)]
    pub code: String,
    /// Expiry in seconds since the epoch
    #[serde(default)]
    pub expiration: i64,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: RequestTokenResults,
}

/// A bearer token and when it stops being valid
#[derive(Debug, Clone)]
pub struct Token {
    pub value: String,
    pub expires: DateTime<Utc>,
}

impl Token {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

/// Per-graph token cache
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: HashMap<String, Token>,
}

impl TokenCache {
    /// The cached token for `graph` if it has not expired at `now`
    pub fn valid_token(&self, graph: &str, now: DateTime<Utc>) -> Option<&Token> {
        self.tokens.get(graph).filter(|token| token.is_valid_at(now))
    }

    pub fn insert(&mut self, graph: &str, token: Token) {
        self.tokens.insert(graph.to_string(), token);
    }
}

impl TigerGraphClient {
    /// Make sure a non-expired token for `graph` is cached, requesting a new
    /// one if needed
    pub fn auth(&self, ctx: &RunContext, graph: &str) -> Result<()> {
        self.token_for(ctx, graph).map(|_| ())
    }

    /// Bearer token for `graph`, from the cache or freshly requested
    pub(super) fn token_for(&self, ctx: &RunContext, graph: &str) -> Result<String> {
        if let Some(token) = self.cached_token(graph)? {
            return Ok(token);
        }

        let request = self
            .http
            .post(format!("{}{}", self.base_url, REQUEST_TOKEN_PATH))
            .basic_auth(&self.username, Some(&self.password))
            .json(&RequestTokenRequest { graph });

        let response: RequestTokenResponse = self.request_into(ctx, request)?;
        if response.error {
            return Err(Error::transport(format!(
                "TigerGraph refused to issue a token for graph {}: {}",
                graph, response.message
            )));
        }

        let expires = Utc
            .timestamp_opt(response.expiration, 0)
            .single()
            .ok_or_else(|| {
                Error::transport(format!(
                    "TigerGraph returned an invalid token expiry: {}",
                    response.expiration
                ))
            })?;

        let token = Token {
            value: response.results.token,
            expires,
        };
        let value = token.value.clone();

        tracing::debug!(graph, expires = %token.expires, "Obtained TigerGraph token");
        self.lock_tokens()?.insert(graph, token);

        Ok(value)
    }

    fn cached_token(&self, graph: &str) -> Result<Option<String>> {
        Ok(self
            .lock_tokens()?
            .valid_token(graph, Utc::now())
            .map(|token| token.value.clone()))
    }

    fn lock_tokens(&self) -> Result<std::sync::MutexGuard<'_, TokenCache>> {
        self.tokens
            .lock()
            .map_err(|_| Error::transport("Token cache lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expired_token_is_not_returned() {
        let now = Utc::now();
        let mut cache = TokenCache::default();
        cache.insert(
            "MyGraph",
            Token {
                value: "old".to_string(),
                expires: now - Duration::minutes(5),
            },
        );

        assert!(cache.valid_token("MyGraph", now).is_none());
    }

    #[test]
    fn test_valid_token_is_returned() {
        let now = Utc::now();
        let mut cache = TokenCache::default();
        cache.insert(
            "MyGraph",
            Token {
                value: "fresh".to_string(),
                expires: now + Duration::minutes(5),
            },
        );

        assert_eq!(cache.valid_token("MyGraph", now).unwrap().value, "fresh");
        assert!(cache.valid_token("OtherGraph", now).is_none());
    }
}
