//! In-process mock backend for integration tests.
//!
//! A tiny_http server on an ephemeral port with canned JSON routes and
//! full request recording, so tests can assert both what the client
//! computed and exactly which calls it made (including "none at all").

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Header, Response, Server, StatusCode};

/// One canned route: exact `method` + `path` match, with an
/// exact-including-query match taking precedence over a path-only match.
pub struct Route {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

/// Convenience constructor for a 200 JSON route.
pub fn json_route(method: &'static str, path: &str, body: serde_json::Value) -> Route {
    Route {
        method,
        path: path.to_string(),
        status: 200,
        body: body.to_string(),
    }
}

/// A request the mock saw, in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct MockBackend {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: Arc<Server>,
}

impl MockBackend {
    /// Start the mock on an ephemeral port and serve until dropped.
    ///
    /// Unrouted requests get a 404 JSON body, mirroring the backend.
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("failed to bind mock backend"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock backend has no ip addr")
            .port();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let server_loop = Arc::clone(&server);
        let requests_loop = Arc::clone(&requests);
        thread::spawn(move || {
            for mut request in server_loop.incoming_requests() {
                let method = request.method().to_string().to_uppercase();
                let url = request.url().to_string();

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                requests_loop.lock().unwrap().push(RecordedRequest {
                    method: method.clone(),
                    path: url.clone(),
                    body,
                });

                let route = find_route(&routes, &method, &url);
                let (status, payload) = match route {
                    Some(r) => (r.status, r.body.clone()),
                    None => (404, r#"{"error": "not found"}"#.to_string()),
                };

                let response = Response::from_string(payload)
                    .with_status_code(StatusCode(status))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json; charset=utf-8")
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            requests,
            server,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests matching method + path (query ignored).
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| {
                r.method == method && r.path.split('?').next().unwrap_or(&r.path) == path
            })
            .count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

fn find_route<'a>(routes: &'a [Route], method: &str, url: &str) -> Option<&'a Route> {
    routes
        .iter()
        .find(|r| r.method == method && r.path == url)
        .or_else(|| {
            let path = url.split('?').next().unwrap_or(url);
            routes.iter().find(|r| r.method == method && r.path == path)
        })
}
