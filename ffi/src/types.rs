//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Clients, sessions, requests and tasks are opaque boxes owned by the C
//! caller. The only data that crosses the boundary by value is the error
//! code and the arguments of the completion callback.

use std::ffi::c_void;
use std::os::raw::c_char;

use htclient_core::{ClientError, TransportError};

/// Opaque handle to a `Client`.
pub struct FfiClient {
    pub(crate) inner: htclient_core::Client,
}

/// Opaque handle to a `Session`.
pub struct FfiSession {
    pub(crate) inner: htclient_core::Session,
}

/// Opaque handle to a `RequestConfig` under construction.
pub struct FfiRequest {
    pub(crate) inner: htclient_core::RequestConfig,
}

/// Opaque handle to an in-flight request.
pub struct FfiTask {
    pub(crate) inner: htclient_core::TaskHandle,
}

/// Status reported to the callback when no response was received.
pub const HTC_STATUS_NONE: u16 = 0;

/// Error codes shared by `htc_dispatch` and the completion callback.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    Spawn = 2,
    Cancelled = 3,
    TimedOut = 4,
    InvalidRequest = 5,
    Transport = 6,
    NullArg = 7,
    Panic = 8,
}

impl From<&ClientError> for FfiErrorCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::InvalidUrl { .. } => FfiErrorCode::InvalidUrl,
            ClientError::Spawn(_) => FfiErrorCode::Spawn,
        }
    }
}

impl From<&TransportError> for FfiErrorCode {
    fn from(err: &TransportError) -> Self {
        match err {
            TransportError::Cancelled => FfiErrorCode::Cancelled,
            TransportError::TimedOut => FfiErrorCode::TimedOut,
            TransportError::InvalidRequest(_) => FfiErrorCode::InvalidRequest,
            TransportError::Failed(_) => FfiErrorCode::Transport,
        }
    }
}

/// Completion callback.
///
/// On success `error_code` is `Ok`, `error_message` is null and `body` points
/// to `body_len` bytes (null when the response had no body). On failure
/// `status` is `HTC_STATUS_NONE`, `body` is null and `error_message` is a
/// NUL-terminated description. Every pointer is valid only during the call.
pub type FfiResponseCallback = extern "C" fn(
    user_data: *mut c_void,
    body: *const u8,
    body_len: usize,
    status: u16,
    error_code: FfiErrorCode,
    error_message: *const c_char,
);

/// Caller context handed back to the callback on the engine thread.
pub(crate) struct UserData(pub(crate) *mut c_void);

// The C caller owns `user_data` and promises it may be used from the engine
// thread for the lifetime of the request.
unsafe impl Send for UserData {}

impl UserData {
    /// Goes through `&self` so closures capture the whole `Send` wrapper.
    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}
