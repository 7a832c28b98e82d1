//! C-ABI wrapper around `htclient-core`.
//!
//! # Overview
//! Lets any language with a C FFI build a request, dispatch it through a
//! client or session, and receive the outcome through a function pointer
//! called on the engine's worker thread.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Requests are built incrementally with `htc_request_set_*`, mirroring the
//!   chainable setters on `RequestConfig`.
//! - `htc_dispatch` uses the client's current session; `htc_session_dispatch`
//!   takes a session directly, null meaning the shared default.
//! - The C caller owns all returned pointers and must call the matching
//!   `htc_*_free` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use htclient_core::{HttpResponse, RequestConfig, Session, SessionConfig, TransportError};

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn set_error(out_error: *mut FfiErrorCode, code: FfiErrorCode) {
    if !out_error.is_null() {
        unsafe { *out_error = code };
    }
}

// ---------------------------------------------------------------------------
// Request lifecycle
// ---------------------------------------------------------------------------

/// Create a request for `url` with default settings (POST, cellular allowed,
/// session timeout).
///
/// The URL is validated at dispatch, not here. Returns null if `url` is null
/// or not UTF-8. Free with `htc_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn htc_request_new(url: *const c_char) -> *mut FfiRequest {
    catch_unwind(|| match read_str(url) {
        Some(url) => Box::into_raw(Box::new(FfiRequest {
            inner: RequestConfig::new(url),
        })),
        None => ptr::null_mut(),
    })
    .unwrap_or(ptr::null_mut())
}

/// Set the HTTP method, copied verbatim. Returns false on null or non-UTF-8
/// arguments.
#[unsafe(no_mangle)]
pub extern "C" fn htc_request_set_method(request: *mut FfiRequest, method: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if request.is_null() {
            return false;
        }
        let Some(method) = read_str(method) else {
            return false;
        };
        let request = unsafe { &mut *request };
        request.inner.method = method.to_string();
        true
    }))
    .unwrap_or(false)
}

/// Set a header, replacing any earlier value under the same name.
#[unsafe(no_mangle)]
pub extern "C" fn htc_request_set_header(
    request: *mut FfiRequest,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if request.is_null() {
            return false;
        }
        let (Some(name), Some(value)) = (read_str(name), read_str(value)) else {
            return false;
        };
        let request = unsafe { &mut *request };
        request
            .inner
            .headers
            .get_or_insert_with(Default::default)
            .insert(name.to_string(), value.to_string());
        true
    }))
    .unwrap_or(false)
}

/// Copy `len` bytes from `data` as the request body. A null `data` clears
/// the body.
#[unsafe(no_mangle)]
pub extern "C" fn htc_request_set_body(request: *mut FfiRequest, data: *const u8, len: usize) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if request.is_null() {
            return false;
        }
        let request = unsafe { &mut *request };
        request.inner.body = if data.is_null() {
            None
        } else {
            Some(unsafe { std::slice::from_raw_parts(data, len) }.to_vec())
        };
        true
    }))
    .unwrap_or(false)
}

/// Set the timeout in seconds. `0` keeps the session default.
#[unsafe(no_mangle)]
pub extern "C" fn htc_request_set_timeout(request: *mut FfiRequest, timeout_secs: u64) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if request.is_null() {
            return false;
        }
        unsafe { &mut *request }.inner.timeout_secs = timeout_secs;
        true
    }))
    .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn htc_request_set_allow_cellular(request: *mut FfiRequest, allow: bool) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if request.is_null() {
            return false;
        }
        unsafe { &mut *request }.inner.allow_cellular = allow;
        true
    }))
    .unwrap_or(false)
}

/// Free a request from `htc_request_new`. Safe to call with null. Requests
/// already dispatched are unaffected.
#[unsafe(no_mangle)]
pub extern "C" fn htc_request_free(request: *mut FfiRequest) {
    if !request.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(request) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Sessions and clients
// ---------------------------------------------------------------------------

/// Create a new engine session. `default_timeout_secs` of `0` disables the
/// session-wide timeout. Free with `htc_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn htc_session_new(default_timeout_secs: u64) -> *mut FfiSession {
    catch_unwind(|| {
        let config = SessionConfig {
            default_timeout_secs,
            ..SessionConfig::default()
        };
        Box::into_raw(Box::new(FfiSession {
            inner: Session::new(config),
        }))
    })
    .unwrap_or(ptr::null_mut())
}

/// Free a session handle. Clients and tasks using it keep working.
#[unsafe(no_mangle)]
pub extern "C" fn htc_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(session) });
        }));
    }
}

/// Create a client that uses the shared default session until
/// `htc_client_set_session` is called. Free with `htc_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn htc_client_new() -> *mut FfiClient {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiClient {
            inner: htclient_core::Client::new(),
        }))
    })
    .unwrap_or(ptr::null_mut())
}

/// Point the client at `session`. Null `session` reverts to the shared
/// default. Returns false if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn htc_client_set_session(client: *const FfiClient, session: *const FfiSession) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        if session.is_null() {
            client.inner.clear_session();
        } else {
            client.inner.set_session(unsafe { &*session }.inner.clone());
        }
        true
    }))
    .unwrap_or(false)
}

/// Free a client from `htc_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn htc_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Build the core completion handler that forwards to a C callback.
fn forward_to(
    callback: FfiResponseCallback,
    user_data: *mut c_void,
) -> impl FnOnce(Result<HttpResponse, TransportError>) + Send + 'static {
    let user_data = UserData(user_data);
    move |outcome| {
        let user_data = user_data.as_ptr();
        match outcome {
            Ok(response) => {
                let (body, body_len) = match &response.body {
                    Some(body) => (body.as_ptr(), body.len()),
                    None => (ptr::null(), 0),
                };
                callback(user_data, body, body_len, response.status, FfiErrorCode::Ok, ptr::null());
            }
            Err(err) => {
                let message = CString::new(err.to_string()).unwrap_or_default();
                callback(
                    user_data,
                    ptr::null(),
                    0,
                    HTC_STATUS_NONE,
                    FfiErrorCode::from(&err),
                    message.as_ptr(),
                );
            }
        }
    }
}

/// Start `request` through the client's current session.
///
/// Returns a task handle, or null with `*out_error` set (when non-null) if an
/// argument is null or the URL is invalid; in that case `callback` is never
/// called. Otherwise `callback` runs exactly once on an engine thread. The
/// request may be freed as soon as this returns. Free the task with
/// `htc_task_free`.
#[unsafe(no_mangle)]
pub extern "C" fn htc_dispatch(
    client: *const FfiClient,
    request: *const FfiRequest,
    callback: Option<FfiResponseCallback>,
    user_data: *mut c_void,
    out_error: *mut FfiErrorCode,
) -> *mut FfiTask {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            set_error(out_error, FfiErrorCode::NullArg);
            return ptr::null_mut();
        }
        let session = unsafe { &*client }.inner.session();
        start(Some(&session), request, callback, user_data, out_error)
    }))
    .unwrap_or_else(|_| {
        set_error(out_error, FfiErrorCode::Panic);
        ptr::null_mut()
    })
}

/// Like `htc_dispatch`, but on an explicit session. Null `session` uses the
/// shared default, so no client is needed for one-off requests.
#[unsafe(no_mangle)]
pub extern "C" fn htc_session_dispatch(
    session: *const FfiSession,
    request: *const FfiRequest,
    callback: Option<FfiResponseCallback>,
    user_data: *mut c_void,
    out_error: *mut FfiErrorCode,
) -> *mut FfiTask {
    catch_unwind(AssertUnwindSafe(|| {
        let session = (!session.is_null()).then(|| unsafe { &(*session).inner });
        start(session, request, callback, user_data, out_error)
    }))
    .unwrap_or_else(|_| {
        set_error(out_error, FfiErrorCode::Panic);
        ptr::null_mut()
    })
}

fn start(
    session: Option<&Session>,
    request: *const FfiRequest,
    callback: Option<FfiResponseCallback>,
    user_data: *mut c_void,
    out_error: *mut FfiErrorCode,
) -> *mut FfiTask {
    let Some(callback) = callback else {
        set_error(out_error, FfiErrorCode::NullArg);
        return ptr::null_mut();
    };
    if request.is_null() {
        set_error(out_error, FfiErrorCode::NullArg);
        return ptr::null_mut();
    }
    let request = unsafe { &*request };

    match htclient_core::dispatch(&request.inner, session, forward_to(callback, user_data)) {
        Ok(task) => {
            set_error(out_error, FfiErrorCode::Ok);
            Box::into_raw(Box::new(FfiTask { inner: task }))
        }
        Err(err) => {
            tracing::debug!(error = %err, "dispatch rejected");
            set_error(out_error, FfiErrorCode::from(&err));
            ptr::null_mut()
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Cancel a task. See `TaskHandle::cancel` for what the callback receives.
#[unsafe(no_mangle)]
pub extern "C" fn htc_task_cancel(task: *const FfiTask) {
    if !task.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*task }.inner.cancel()));
    }
}

/// Block until the task's callback has returned.
#[unsafe(no_mangle)]
pub extern "C" fn htc_task_wait(task: *const FfiTask) {
    if !task.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*task }.inner.wait()));
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn htc_task_is_finished(task: *const FfiTask) -> bool {
    catch_unwind(AssertUnwindSafe(|| !task.is_null() && unsafe { &*task }.inner.is_finished()))
        .unwrap_or(false)
}

/// Free a task handle. Does not cancel the request. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn htc_task_free(task: *mut FfiTask) {
    if !task.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(task) });
        }));
    }
}
