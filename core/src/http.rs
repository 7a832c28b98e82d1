//! Engine-facing request and response types.
//!
//! # Design
//! `EngineRequest` is what a `Transport` executes. It is produced from a
//! `RequestConfig` by a pure translation step, so everything the engine will
//! see can be checked in tests without touching the network. The URL is
//! parsed here; header names and values are passed through untouched and
//! left for the engine to accept or reject.

use std::time::Duration;

use url::Url;

use crate::config::RequestConfig;
use crate::error::ClientError;

/// A request ready to hand to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub url: Url,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub allow_cellular: bool,
    /// `None` leaves the engine's default timeout in place.
    pub timeout: Option<Duration>,
}

impl EngineRequest {
    /// Translate a `RequestConfig` into an engine request.
    ///
    /// Fails only when `url` does not parse as an absolute URL.
    pub fn from_config(config: &RequestConfig) -> Result<Self, ClientError> {
        let url = Url::parse(&config.url).map_err(|source| ClientError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;

        let headers = config
            .headers
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            url,
            method: config.method.clone(),
            headers,
            body: config.body.clone(),
            allow_cellular: config.allow_cellular,
            timeout: (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)),
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the engine received. Any status code lands here, 4xx and 5xx
/// included; interpreting it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// `None` when the server sent no body bytes.
    pub body: Option<Vec<u8>>,
}
