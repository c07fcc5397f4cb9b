#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use shmdash::{HttpRequest, HttpResponse, HttpSession, Record, RequestError, Value};
use std::sync::atomic::{AtomicBool, Ordering};

pub const URL: &str = "https://shmdash.example";
pub const API_KEY: &str = "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX";

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, RequestError> + Send + Sync>;

/// In-memory session that records every request and answers from a closure.
pub struct MockSession {
    requests: Mutex<Vec<HttpRequest>>,
    responder: Responder,
    closed: AtomicBool,
}

impl MockSession {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, RequestError> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            closed: AtomicBool::new(false),
        }
    }

    /// Answer every request with the same status and body.
    pub fn always(status: u16, body: &'static str) -> Self {
        Self::new(move |request| Ok(respond(request, status, body)))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of records carried by each data upload, in request order.
    pub fn upload_sizes(&self) -> Vec<usize> {
        self.requests()
            .iter()
            .filter_map(data_rows)
            .map(|rows| rows.len())
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl HttpSession for MockSession {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let response = (self.responder)(&request);
        self.requests.lock().push(request);
        response
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub fn respond(request: &HttpRequest, status: u16, body: &'static str) -> HttpResponse {
    HttpResponse::new(
        request.url.clone(),
        request.method.clone(),
        StatusCode::from_u16(status).unwrap(),
        body,
    )
}

pub fn body_json(request: &HttpRequest) -> Option<serde_json::Value> {
    request
        .content
        .as_deref()
        .and_then(|content| serde_json::from_str(content).ok())
}

/// Rows of a data upload body, `None` for other requests.
pub fn data_rows(request: &HttpRequest) -> Option<Vec<serde_json::Value>> {
    if request.method != Method::POST || !request.url.ends_with("/data") {
        return None;
    }
    body_json(request)?.get("data")?.as_array().cloned()
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// `n` records one second apart, carrying their index as the only value.
pub fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::new(
                base_time() + Duration::seconds(i as i64),
                vec![Value::from(i as u32)],
            )
        })
        .collect()
}

/// Index values of the rows, i.e. which records a request carried.
pub fn row_indices(rows: &[serde_json::Value]) -> Vec<u64> {
    rows.iter().filter_map(|row| row.get(2)?.as_u64()).collect()
}
