//! In-process mock Bubble Data API server for integration tests.
//!
//! Serves the documented response envelope
//! `{"response": {"cursor", "results", "count", "remaining"}}` over a local
//! TCP port, with bearer-token auth, limit/cursor pagination and
//! `equals`-constraint filtering. Every request is logged so tests can
//! assert on the exact fetch sequence.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::Value as Json;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const API_KEY: &str = "test-api-key";

/// One logged request: the collection type and the parsed query parameters.
#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub type_name: String,
    pub query: HashMap<String, String>,
}

impl LoggedRequest {
    pub fn cursor(&self) -> Option<u64> {
        self.query.get("cursor").and_then(|c| c.parse().ok())
    }
}

struct ApiState {
    collections: Mutex<HashMap<String, Vec<Json>>>,
    canned: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<LoggedRequest>>,
}

pub struct MockApi {
    addr: SocketAddr,
    state: Arc<ApiState>,
    handle: JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ApiState {
            collections: Mutex::new(HashMap::new()),
            canned: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        });

        let loop_state = state.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let state = loop_state.clone();
                tokio::spawn(async move {
                    let service =
                        service_fn(move |req: Request<Incoming>| handle(req, state.clone()));
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Root URL to configure the client with.
    pub fn root(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Seeds a collection with the given records.
    pub fn insert_collection(&self, type_name: &str, records: Vec<Json>) {
        self.state
            .collections
            .lock()
            .unwrap()
            .insert(type_name.to_string(), records);
    }

    /// Makes every request for `type_name` answer with a fixed status/body.
    pub fn set_canned(&self, type_name: &str, status: u16, body: &str) {
        self.state
            .canned
            .lock()
            .unwrap()
            .insert(type_name.to_string(), (status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<ApiState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let authorized = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {API_KEY}"))
        .unwrap_or(false);
    if !authorized {
        return Ok(respond(
            401,
            json!({"statusCode": 401, "body": {"status": "ERROR", "message": "Invalid or missing API key"}})
                .to_string(),
        ));
    }

    let path = req.uri().path().trim_start_matches('/').to_string();
    let query: HashMap<String, String> = req
        .uri()
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();

    let (type_name, id) = match path.split_once('/') {
        Some((type_name, id)) => (type_name.to_string(), Some(id.to_string())),
        None => (path, None),
    };

    state.requests.lock().unwrap().push(LoggedRequest {
        type_name: type_name.clone(),
        query: query.clone(),
    });

    if let Some((status, body)) = state.canned.lock().unwrap().get(&type_name) {
        return Ok(respond(*status, body.clone()));
    }

    let records = state
        .collections
        .lock()
        .unwrap()
        .get(&type_name)
        .cloned()
        .unwrap_or_default();

    if let Some(id) = id {
        let found = records
            .iter()
            .find(|r| r.get("_id").and_then(Json::as_str) == Some(id.as_str()));
        return Ok(match found {
            Some(record) => respond(200, json!({"response": record}).to_string()),
            None => respond(
                404,
                json!({"statusCode": 404, "body": {"status": "NOT_FOUND"}}).to_string(),
            ),
        });
    }

    // Only equals constraints are interpreted; that is all the tests need.
    let mut filtered = records;
    if let Some(raw) = query.get("constraints") {
        let constraints: Vec<Json> = serde_json::from_str(raw).unwrap_or_default();
        for constraint in constraints {
            if constraint.get("constraint_type").and_then(Json::as_str) == Some("equals") {
                let key = constraint
                    .get("key")
                    .and_then(Json::as_str)
                    .unwrap_or_default()
                    .to_string();
                let value = constraint.get("value").cloned().unwrap_or(Json::Null);
                filtered.retain(|r| r.get(&key) == Some(&value));
            }
        }
    }

    let cursor: usize = query
        .get("cursor")
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);
    let limit: usize = query
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(100);

    let total = filtered.len();
    let start = cursor.min(total);
    let end = (cursor + limit).min(total);
    let slice = &filtered[start..end];

    let body = json!({
        "response": {
            "cursor": start,
            "results": slice,
            "count": slice.len(),
            "remaining": total - end,
        }
    });
    Ok(respond(200, body.to_string()))
}

fn respond(status: u16, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Builds a client pointed at the mock server.
pub fn client_for(api: &MockApi) -> bubble_lib::BubbleClient {
    bubble_lib::BubbleClient::builder()
        .api_root(api.root())
        .api_key(API_KEY)
        .build()
        .unwrap()
}

/// Generates `n` records named `thing{i}` with a rank field, in rank order.
pub fn seed_records(n: usize) -> Vec<Json> {
    (0..n)
        .map(|i| json!({"_id": format!("thing{i}"), "name": format!("name{i}"), "rank": i}))
        .collect()
}
