//! Minimal HTTP client facade over a pluggable engine.
//!
//! # Overview
//! Describe a request with `RequestConfig`, hand it to `Client::dispatch` (or
//! the free `dispatch` with an explicit `Session`), and receive the outcome
//! through a callback that runs exactly once on an engine worker thread.
//!
//! # Design
//! - Translation (`EngineRequest::from_config`) is pure; an invalid URL is
//!   reported synchronously and nothing is sent.
//! - All network I/O lives behind the `Transport` trait. `UreqTransport` is
//!   the default engine and owns TLS, redirects and connection reuse.
//! - Any HTTP status is a successful outcome; only engine failures arrive as
//!   `TransportError`.
//! - The only shared mutable state is the client's session slot, guarded by
//!   a mutex for the duration of a reference swap.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod task;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::{dispatch, Client};
pub use config::{RequestConfig, SessionConfig};
pub use error::{ClientError, TransportError};
pub use http::{EngineRequest, HttpResponse};
pub use session::Session;
pub use task::TaskHandle;
pub use transport::{Transport, UreqTransport};
