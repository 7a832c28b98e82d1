//! Request and session configuration.
//!
//! # Design
//! `RequestConfig` describes one request as plain data. Missing fields fall
//! back to the same defaults whether a config is built in code or
//! deserialized from JSON: method `POST`, cellular access allowed, and a
//! timeout of `0`, which means "use the session's default".
//!
//! `SessionConfig` holds the engine-level settings a `Session` is built from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parameters of a single HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
    #[serde(default = "default_true")]
    pub allow_cellular: bool,
    /// Seconds before the engine gives up. `0` keeps the session default.
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_true() -> bool {
    true
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: None,
            body: None,
            allow_cellular: true,
            timeout_secs: 0,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_allow_cellular(mut self, allow: bool) -> Self {
        self.allow_cellular = allow;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Engine-level settings shared by every request issued through a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Applied to requests whose `timeout_secs` is `0`. `0` here disables it.
    pub default_timeout_secs: u64,
    /// Sent as `User-Agent` unless the request sets its own.
    pub user_agent: Option<String>,
    /// Response bodies larger than this fail with a transport error.
    pub max_response_bytes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 60,
            user_agent: Some(concat!("htclient/", env!("CARGO_PKG_VERSION")).to_string()),
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}
