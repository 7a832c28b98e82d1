//! Drive the C ABI from Rust against the live mock server.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::mpsc;
use std::time::Duration;

use htclient_ffi::types::{FfiErrorCode, HTC_STATUS_NONE};
use htclient_ffi::*;

#[derive(Debug)]
struct Record {
    body: Option<Vec<u8>>,
    status: u16,
    code: FfiErrorCode,
    message: Option<String>,
}

extern "C" fn record(
    user_data: *mut c_void,
    body: *const u8,
    body_len: usize,
    status: u16,
    error_code: FfiErrorCode,
    error_message: *const c_char,
) {
    let tx = unsafe { &*(user_data as *const mpsc::Sender<Record>) };
    let body = (!body.is_null()).then(|| unsafe { std::slice::from_raw_parts(body, body_len) }.to_vec());
    let message = (!error_message.is_null())
        .then(|| unsafe { CStr::from_ptr(error_message) }.to_string_lossy().into_owned());
    tx.send(Record {
        body,
        status,
        code: error_code,
        message,
    })
    .unwrap();
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn c(s: &str) -> CString {
    CString::new(s).unwrap()
}

#[test]
fn client_dispatch_round_trip() {
    let base = start_server();
    let client = htc_client_new();
    let session = htc_session_new(10);
    assert!(htc_client_set_session(client, session));

    let request = htc_request_new(c(&format!("{base}/echo")).as_ptr());
    assert!(htc_request_set_method(request, c("PUT").as_ptr()));
    assert!(htc_request_set_header(request, c("X-Trace").as_ptr(), c("abc").as_ptr()));
    let payload = b"hello";
    assert!(htc_request_set_body(request, payload.as_ptr(), payload.len()));
    assert!(htc_request_set_timeout(request, 5));
    assert!(htc_request_set_allow_cellular(request, false));

    let (tx, rx) = mpsc::channel::<Record>();
    let tx = Box::into_raw(Box::new(tx));
    let mut err = FfiErrorCode::Panic;
    let task = htc_dispatch(client, request, Some(record), tx.cast(), &mut err);
    assert!(!task.is_null());
    assert_eq!(err, FfiErrorCode::Ok);
    htc_request_free(request);

    let got = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    htc_task_wait(task);
    assert!(htc_task_is_finished(task));

    assert_eq!(got.code, FfiErrorCode::Ok);
    assert_eq!(got.status, 200);
    assert!(got.message.is_none());
    let echo: serde_json::Value = serde_json::from_slice(&got.body.unwrap()).unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["headers"]["x-trace"], "abc");
    assert_eq!(echo["body"], "hello");

    htc_task_free(task);
    htc_session_free(session);
    htc_client_free(client);
    drop(unsafe { Box::from_raw(tx) });
}

#[test]
fn session_dispatch_with_null_session_uses_default() {
    let base = start_server();
    let request = htc_request_new(c(&format!("{base}/status/503")).as_ptr());
    htc_request_set_method(request, c("GET").as_ptr());

    let (tx, rx) = mpsc::channel::<Record>();
    let tx = Box::into_raw(Box::new(tx));
    let mut err = FfiErrorCode::Panic;
    let task = htc_session_dispatch(ptr::null(), request, Some(record), tx.cast(), &mut err);
    assert_eq!(err, FfiErrorCode::Ok);

    let got = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    htc_task_wait(task);
    assert_eq!(got.code, FfiErrorCode::Ok);
    assert_eq!(got.status, 503);
    assert_eq!(got.body.as_deref(), Some(&b"status 503"[..]));

    htc_task_free(task);
    htc_request_free(request);
    drop(unsafe { Box::from_raw(tx) });
}

#[test]
fn invalid_url_fails_synchronously() {
    let client = htc_client_new();
    let request = htc_request_new(c("not a url").as_ptr());
    let (tx, rx) = mpsc::channel::<Record>();
    let tx = Box::into_raw(Box::new(tx));

    let mut err = FfiErrorCode::Ok;
    let task = htc_dispatch(client, request, Some(record), tx.cast(), &mut err);

    assert!(task.is_null());
    assert_eq!(err, FfiErrorCode::InvalidUrl);
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    htc_request_free(request);
    htc_client_free(client);
    drop(unsafe { Box::from_raw(tx) });
}

#[test]
fn transport_failure_reports_sentinel_status() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let request = htc_request_new(c(&format!("http://127.0.0.1:{port}/")).as_ptr());
    let (tx, rx) = mpsc::channel::<Record>();
    let tx = Box::into_raw(Box::new(tx));

    let task = htc_session_dispatch(ptr::null(), request, Some(record), tx.cast(), ptr::null_mut());
    assert!(!task.is_null());

    let got = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    htc_task_wait(task);
    assert_eq!(got.code, FfiErrorCode::Transport);
    assert_eq!(got.status, HTC_STATUS_NONE);
    assert!(got.body.is_none());
    assert!(got.message.is_some());

    htc_task_free(task);
    htc_request_free(request);
    drop(unsafe { Box::from_raw(tx) });
}

#[test]
fn null_arguments_are_rejected() {
    assert!(htc_request_new(ptr::null()).is_null());
    assert!(!htc_request_set_method(ptr::null_mut(), c("GET").as_ptr()));
    assert!(!htc_request_set_timeout(ptr::null_mut(), 1));
    assert!(!htc_client_set_session(ptr::null(), ptr::null()));

    let mut err = FfiErrorCode::Ok;
    let task = htc_dispatch(ptr::null(), ptr::null(), Some(record), ptr::null_mut(), &mut err);
    assert!(task.is_null());
    assert_eq!(err, FfiErrorCode::NullArg);

    let request = htc_request_new(c("https://example.com").as_ptr());
    let task = htc_session_dispatch(ptr::null(), request, None, ptr::null_mut(), &mut err);
    assert!(task.is_null());
    assert_eq!(err, FfiErrorCode::NullArg);
    htc_request_free(request);

    // Free functions accept null.
    htc_request_free(ptr::null_mut());
    htc_session_free(ptr::null_mut());
    htc_client_free(ptr::null_mut());
    htc_task_free(ptr::null_mut());
    htc_task_cancel(ptr::null());
    htc_task_wait(ptr::null());
}

#[test]
fn scalar_setters_and_task_queries_guard_their_arguments() {
    let request = htc_request_new(c("https://example.com").as_ptr());
    assert!(htc_request_set_timeout(request, 5));
    assert!(htc_request_set_allow_cellular(request, false));
    assert!(!htc_request_set_allow_cellular(ptr::null_mut(), true));
    assert!(!htc_task_is_finished(ptr::null()));
    htc_request_free(request);
}

#[test]
fn finished_task_reports_finished() {
    let base = start_server();
    let request = htc_request_new(c(&format!("{base}/status/204")).as_ptr());
    htc_request_set_method(request, c("GET").as_ptr());
    let (tx, rx) = mpsc::channel::<Record>();
    let tx = Box::into_raw(Box::new(tx));

    let task = htc_session_dispatch(ptr::null(), request, Some(record), tx.cast(), ptr::null_mut());
    let got = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    htc_task_wait(task);
    assert_eq!(got.status, 204);
    assert!(htc_task_is_finished(task));

    // Cancelling a finished task is a no-op.
    htc_task_cancel(task);
    assert!(rx.try_recv().is_err());

    htc_task_free(task);
    htc_request_free(request);
    drop(unsafe { Box::from_raw(tx) });
}

#[test]
fn cancelled_task_reports_cancelled() {
    let base = start_server();
    let request = htc_request_new(c(&format!("{base}/delay/500")).as_ptr());
    htc_request_set_method(request, c("GET").as_ptr());
    let (tx, rx) = mpsc::channel::<Record>();
    let tx = Box::into_raw(Box::new(tx));

    let task = htc_session_dispatch(ptr::null(), request, Some(record), tx.cast(), ptr::null_mut());
    htc_task_cancel(task);

    let got = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    htc_task_wait(task);
    assert_eq!(got.code, FfiErrorCode::Cancelled);
    assert_eq!(got.status, HTC_STATUS_NONE);

    htc_task_free(task);
    htc_request_free(request);
    drop(unsafe { Box::from_raw(tx) });
}
