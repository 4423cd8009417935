//! Mock TigerGraph server for integration tests
//!
//! Serves both REST++ and GSQL server paths from one port. Every request is
//! recorded by its full path (including the query string) before a handler
//! is looked up; unknown paths answer 404.
//!
//! By default only `/requesttoken` (checking basic auth, issuing a token
//! valid for 5 minutes) and `/api/ping` are served.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use base64::Engine;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;

use tgmigrate_core::adapters::tigergraph::{
    TigerGraphClient, TigerGraphSettings, DEFAULT_TIMEOUT, PING_PATH, REQUEST_TOKEN_PATH,
};

pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";

/// A request as received by the mock server
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Username and password from a basic `Authorization` header
    pub fn basic_auth(&self) -> Option<(String, String)> {
        let encoded = self.header("authorization")?.strip_prefix("Basic ")?;
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;
        Some((user.to_string(), pass.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn json<T: Serialize>(value: &T) -> Self {
        Self::ok(serde_json::to_string(value).unwrap())
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

pub type Handler = Arc<dyn Fn(&MockRequest) -> MockResponse + Send + Sync>;

#[derive(Default)]
struct Shared {
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<HashMap<String, Vec<Vec<u8>>>>,
}

/// Mock TigerGraph server for testing
pub struct MockTigerGraphServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl MockTigerGraphServer {
    /// Start a new mock server on a random available port
    pub fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let shared = Arc::new(Shared::default());
        let shared_clone = shared.clone();

        // Non-blocking so the accept loop notices shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let shared = shared_clone.clone();
                        thread::spawn(move || handle_connection(stream, &shared));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        let server = Self {
            port,
            running,
            thread_handle: Some(thread_handle),
            shared,
        };
        server.mock_token_expiry(Utc::now() + Duration::minutes(5));
        server.mock(PING_PATH, |_| MockResponse::ok(""));
        Ok(server)
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Client pointing both servers at this mock
    pub fn client(&self, username: &str, password: &str) -> TigerGraphClient {
        TigerGraphClient::new(TigerGraphSettings {
            base_url: self.base_url(),
            gsql_url: self.base_url(),
            username: username.to_string(),
            password: password.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap()
    }

    /// Serve `path` (with its query string, if any) with `handler`
    pub fn mock(
        &self,
        path: &str,
        handler: impl Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    ) {
        self.shared
            .handlers
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(handler));
    }

    /// Serve `path` with `response` serialized as JSON
    pub fn mock_response<T: Serialize>(&self, path: &str, response: &T) {
        let response = MockResponse::json(response);
        self.mock(path, move |_| response.clone());
    }

    /// Serve `path` with an empty body and `status`
    pub fn mock_status(&self, path: &str, status: u16) {
        self.mock(path, move |_| MockResponse::status(status));
    }

    /// Issue tokens expiring at `expires`, for the expected credentials only
    pub fn mock_token_expiry(&self, expires: chrono::DateTime<Utc>) {
        let expiration = expires.timestamp();
        self.mock(REQUEST_TOKEN_PATH, move |request| {
            match request.basic_auth() {
                Some((user, pass)) if user == USERNAME && pass == PASSWORD => {
                    MockResponse::json(&json!({
                        "code": "",
                        "expiration": expiration,
                        "error": false,
                        "message": "",
                        "results": { "token": "sometoken" }
                    }))
                }
                _ => MockResponse::status(401),
            }
        });
    }

    /// Bodies received on `path`, in order
    pub fn calls(&self, path: &str) -> Vec<String> {
        self.shared
            .calls
            .lock()
            .unwrap()
            .get(path)
            .map(|bodies| {
                bodies
                    .iter()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls(path).len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockTigerGraphServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, shared: &Shared) {
    let _ = stream.set_nonblocking(false);

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, &MockResponse::status(400));
        return;
    };

    shared
        .calls
        .lock()
        .unwrap()
        .entry(request.path.clone())
        .or_default()
        .push(request.body.clone());

    let handler = shared.handlers.lock().unwrap().get(&request.path).cloned();
    let response = match handler {
        Some(handler) => handler(&request),
        None => MockResponse::status(404),
    };

    send_response(&mut stream, &response);
}

fn read_request(stream: &mut TcpStream) -> Option<MockRequest> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = data[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buffer[..n]);
    }

    Some(MockRequest {
        method,
        path,
        headers,
        body,
    })
}

fn send_response(stream: &mut TcpStream, response: &MockResponse) {
    let raw = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        status_text(response.status),
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(raw.as_bytes());
    let _ = stream.flush();
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}

/// Migration directory with up and down files for versions 000 to 002.
/// Each file's body is `example <version> <direction>`.
pub fn migration_dir() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    for (version, name) in [("000", "init"), ("001", "add_person"), ("002", "add_knows")] {
        for direction in ["up", "down"] {
            std::fs::write(
                dir.path().join(format!("{}_{}.{}.gsql", version, name, direction)),
                format!("example {} {}", version, direction),
            )
            .unwrap();
        }
    }
    dir
}
