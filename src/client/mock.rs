// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! In-process Hakuna API mock server for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use actix_web::http::{Method, StatusCode};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::Value;
use url::Url;

use crate::client::HakunaClient;
use crate::configuration::ApiSettings;
use crate::util::new_http_client;

const API_PATH: &str = "/api/v1";

#[derive(Clone, Debug)]
pub(crate) struct MockResponse {
    status: u16,
    body: Option<(String, &'static str)>,
    headers: Vec<(String, String)>,
    delay: Option<Duration>,
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: None,
            headers: Vec::new(),
            delay: None,
        }
    }

    pub fn json(value: Value) -> Self {
        Self::status(200).with_body(value.to_string(), "application/json")
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_body(text.into(), "text/plain")
    }

    fn with_body(mut self, body: String, content_type: &'static str) -> Self {
        self.body = Some((body, content_type));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Delay the response, e.g. to force a client timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Request received by the mock server.
#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    /// Path relative to the API base path.
    pub path: String,
    pub query: String,
    pub auth_token: Option<String>,
    pub accept_version: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<(Method, String), VecDeque<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    /// Returns the next queued response. The last response of a queue is repeated.
    fn next_response(&self, method: &Method, path: &str) -> MockResponse {
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(&(method.clone(), path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => MockResponse::status(500).with_text(format!("no mock for {method} {path}")),
        }
    }
}

pub(crate) struct MockServer {
    url: Url,
    state: web::Data<MockState>,
}

impl MockServer {
    /// Start a mock server on an ephemeral local port.
    pub async fn start() -> Self {
        let state = web::Data::new(MockState::default());
        let data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(handle_request))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("mock server must bind to a local port");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Self {
            url: Url::parse(&format!("http://{addr}{API_PATH}")).unwrap(),
            state,
        }
    }

    /// Set the response of an endpoint, replacing all queued responses.
    pub fn respond(&self, method: Method, path: &str, response: MockResponse) {
        self.respond_sequence(method, path, vec![response]);
    }

    /// Set consecutive responses of an endpoint. The last one is repeated.
    pub fn respond_sequence(&self, method: Method, path: &str, responses: Vec<MockResponse>) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), responses.into());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn settings(&self, token: &str) -> ApiSettings {
        ApiSettings {
            url: self.url.clone(),
            token: token.to_string(),
            connection_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
            ..Default::default()
        }
    }

    pub fn http_client(&self) -> awc::Client {
        new_http_client(Duration::from_secs(1), Duration::from_secs(1))
    }

    pub fn client(&self, token: &str) -> HakunaClient {
        HakunaClient::with_client(&self.settings(token), self.http_client())
    }
}

async fn handle_request(
    request: HttpRequest,
    body: web::Bytes,
    state: web::Data<MockState>,
) -> HttpResponse {
    let path = request
        .path()
        .strip_prefix(API_PATH)
        .unwrap_or(request.path())
        .to_string();
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    let recorded = RecordedRequest {
        method: request.method().clone(),
        path: path.clone(),
        query: request.query_string().to_string(),
        auth_token: header("X-Auth-Token"),
        accept_version: header("Accept-Version"),
        content_type: header("Content-Type"),
        body: if body.is_empty() {
            None
        } else {
            serde_json::from_slice(&body).ok()
        },
    };
    state.requests.lock().unwrap().push(recorded);

    let response = state.next_response(request.method(), &path);
    if let Some(delay) = response.delay {
        actix_web::rt::time::sleep(delay).await;
    }

    let mut builder = HttpResponse::build(StatusCode::from_u16(response.status).unwrap());
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }
    match response.body {
        Some((body, content_type)) => builder.content_type(content_type).body(body),
        None => builder.finish(),
    }
}
