//! Client facade: a replaceable session plus request dispatch.
//!
//! # Design
//! `Client` holds at most one explicitly set `Session` behind a mutex. The
//! lock covers only reading or swapping that reference; requests never run
//! under it. With nothing set, the client resolves to `Session::shared()`.
//!
//! There is a single dispatch path. The free function `dispatch` takes an
//! optional session, and `Client::dispatch` forwards to it with whatever
//! session it currently holds, so both entry points translate the full
//! `RequestConfig` the same way.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::RequestConfig;
use crate::error::{ClientError, TransportError};
use crate::http::{EngineRequest, HttpResponse};
use crate::session::Session;
use crate::task::TaskHandle;

/// Translate `request` and start it on `session`, or on the shared default
/// session when `None`.
///
/// Returns the task handle immediately. An invalid URL is reported here and
/// `handler` is never called; otherwise `handler` runs exactly once, on an
/// engine worker thread, with the response or the transport failure.
pub fn dispatch<F>(
    request: &RequestConfig,
    session: Option<&Session>,
    handler: F,
) -> Result<TaskHandle, ClientError>
where
    F: FnOnce(Result<HttpResponse, TransportError>) + Send + 'static,
{
    let engine_request = EngineRequest::from_config(request)?;
    match session {
        Some(session) => session.data_task(engine_request, handler),
        None => Session::shared().data_task(engine_request, handler),
    }
}

#[derive(Debug, Default)]
pub struct Client {
    session: Mutex<Option<Session>>,
}

impl Client {
    /// A client that uses the shared default session until one is set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        // The slot is a plain reference; a panic elsewhere cannot leave it torn.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session requests are sent through: the one set last, or the
    /// shared default.
    pub fn session(&self) -> Session {
        let held = self.slot().clone();
        held.unwrap_or_else(Session::shared)
    }

    /// Replace the held session. Requests already started keep theirs.
    pub fn set_session(&self, session: Session) {
        *self.slot() = Some(session);
    }

    /// Drop the held session and fall back to the shared default.
    pub fn clear_session(&self) {
        *self.slot() = None;
    }

    /// Dispatch `request` through the session currently held.
    pub fn dispatch<F>(&self, request: &RequestConfig, handler: F) -> Result<TaskHandle, ClientError>
    where
        F: FnOnce(Result<HttpResponse, TransportError>) + Send + 'static,
    {
        dispatch(request, Some(&self.session()), handler)
    }
}
