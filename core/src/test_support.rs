//! In-memory transports for unit tests.

use std::sync::{Condvar, Mutex};

use crate::error::TransportError;
use crate::http::{EngineRequest, HttpResponse};
use crate::transport::Transport;

pub(crate) fn ok_response(status: u16, body: Option<&[u8]>) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.map(<[u8]>::to_vec),
    }
}

/// Returns a fixed outcome and records every request it sees.
#[derive(Debug)]
pub(crate) struct StubTransport {
    outcome: Result<HttpResponse, TransportError>,
    seen: Mutex<Vec<EngineRequest>>,
}

impl StubTransport {
    pub(crate) fn new(outcome: Result<HttpResponse, TransportError>) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<EngineRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &EngineRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// Blocks inside `execute` until `release` is called.
#[derive(Debug, Default)]
pub(crate) struct GateTransport {
    // (entered, released)
    state: Mutex<(bool, bool)>,
    cond: Condvar,
}

impl GateTransport {
    pub(crate) fn wait_entered(&self) {
        let mut state = self.state.lock().unwrap();
        while !state.0 {
            state = self.cond.wait(state).unwrap();
        }
    }

    pub(crate) fn release(&self) {
        self.state.lock().unwrap().1 = true;
        self.cond.notify_all();
    }
}

impl Transport for GateTransport {
    fn execute(&self, _request: &EngineRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.0 = true;
        self.cond.notify_all();
        while !state.1 {
            state = self.cond.wait(state).unwrap();
        }
        Ok(ok_response(200, Some(b"late")))
    }
}

/// Panics inside `execute`.
#[derive(Debug)]
pub(crate) struct PanickingTransport;

impl Transport for PanickingTransport {
    fn execute(&self, _request: &EngineRequest) -> Result<HttpResponse, TransportError> {
        panic!("engine exploded");
    }
}
