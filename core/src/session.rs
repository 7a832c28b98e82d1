//! Sessions: the engine handle requests are issued through.
//!
//! # Design
//! A `Session` is a cheap, clonable reference to one `Transport`. Clones share
//! the engine, so connection reuse inside the engine spans every request sent
//! through any clone. `Session::shared()` is the process-wide default, built
//! once on first use from `SessionConfig::default()`.
//!
//! Each request runs on its own named worker thread. The worker owns the
//! completion callback and calls it exactly once.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread;

use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{ClientError, TransportError};
use crate::http::{EngineRequest, HttpResponse};
use crate::task::{TaskHandle, TaskState};
use crate::transport::{Transport, UreqTransport};

static SHARED: OnceLock<Session> = OnceLock::new();

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: Uuid,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("transport", &self.inner.transport)
            .finish()
    }
}

impl Session {
    /// A ureq-backed session.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_transport(Arc::new(UreqTransport::new(&config)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                transport,
            }),
        }
    }

    /// The process-wide default session, created on first call.
    pub fn shared() -> Session {
        SHARED
            .get_or_init(|| {
                let session = Session::new(SessionConfig::default());
                tracing::debug!(session = %session.id(), "created shared default session");
                session
            })
            .clone()
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// True when both handles refer to the same session.
    pub fn ptr_eq(a: &Session, b: &Session) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Start `request` on a worker thread and return its handle.
    ///
    /// `handler` runs on the worker, exactly once, even if the transport panics.
    pub fn data_task<F>(&self, request: EngineRequest, handler: F) -> Result<TaskHandle, ClientError>
    where
        F: FnOnce(Result<HttpResponse, TransportError>) + Send + 'static,
    {
        let id = Uuid::new_v4();
        let state = Arc::new(TaskState::default());
        let worker_state = Arc::clone(&state);
        let transport = Arc::clone(&self.inner.transport);
        let session_id = self.inner.id;

        tracing::debug!(task = %id, session = %session_id, method = %request.method, url = %request.url, "dispatching request");

        let worker = thread::Builder::new()
            .name("htclient-task".to_string())
            .spawn(move || {
                let _finished = worker_state.finish_on_drop();
                let outcome = catch_unwind(AssertUnwindSafe(|| run(transport.as_ref(), &request, &worker_state)))
                    .unwrap_or_else(|_| Err(TransportError::Failed("engine panicked".to_string())));
                match &outcome {
                    Ok(response) => tracing::debug!(task = %id, status = response.status, "request completed"),
                    Err(err) => tracing::debug!(task = %id, error = %err, "request failed"),
                }
                handler(outcome);
            })?;

        Ok(TaskHandle::new(id, state, worker))
    }
}

fn run(
    transport: &dyn Transport,
    request: &EngineRequest,
    state: &TaskState,
) -> Result<HttpResponse, TransportError> {
    if state.is_cancelled() {
        return Err(TransportError::Cancelled);
    }
    let outcome = transport.execute(request);
    if state.is_cancelled() {
        return Err(TransportError::Cancelled);
    }
    outcome
}
