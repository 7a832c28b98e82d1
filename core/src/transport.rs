//! The engine seam: anything that can execute an `EngineRequest`.
//!
//! # Design
//! `Transport::execute` is blocking. The session runs it on a worker thread,
//! so implementations never deal with callbacks or cancellation themselves.
//! `UreqTransport` is the production engine; tests plug in stubs.

use std::fmt;
use std::time::Duration;

use ureq::http;
use ureq::Agent;

use crate::config::SessionConfig;
use crate::error::TransportError;
use crate::http::{EngineRequest, HttpResponse};

/// Executes one request to completion.
pub trait Transport: Send + Sync + fmt::Debug {
    fn execute(&self, request: &EngineRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a `ureq::Agent`.
///
/// The agent owns connection reuse, TLS and redirects. Status codes are
/// never converted to errors.
pub struct UreqTransport {
    agent: Agent,
    user_agent: Option<String>,
    max_response_bytes: u64,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("user_agent", &self.user_agent)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(config: &SessionConfig) -> Self {
        let default_timeout =
            (config.default_timeout_secs > 0).then(|| Duration::from_secs(config.default_timeout_secs));
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(default_timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
            max_response_bytes: config.max_response_bytes,
        }
    }

    fn build(&self, request: &EngineRequest) -> Result<http::Request<()>, TransportError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ua) = &self.user_agent {
            if request.header("user-agent").is_none() {
                builder = builder.header("user-agent", ua.as_str());
            }
        }
        Ok(builder.body(())?)
    }
}

fn expects_body(method: &http::Method) -> bool {
    method == http::Method::POST || method == http::Method::PUT || method == http::Method::PATCH
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &EngineRequest) -> Result<HttpResponse, TransportError> {
        tracing::trace!(allow_cellular = request.allow_cellular, "cellular hint not applicable to ureq");

        let mut req = self.build(request)?;
        if let Some(timeout) = request.timeout {
            req = self
                .agent
                .configure_request(req)
                .timeout_global(Some(timeout))
                .build();
        }

        let mut response = match &request.body {
            Some(body) => self.agent.run(req.map(|()| body.as_slice()))?,
            // ureq frames a bodiless POST/PUT/PATCH as an empty chunked body;
            // an empty slice goes out as `content-length: 0` instead.
            None if expects_body(req.method()) => {
                let empty: &[u8] = &[];
                self.agent.run(req.map(|()| empty))?
            }
            None => self.agent.run(req)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body: (!body.is_empty()).then_some(body),
        })
    }
}
