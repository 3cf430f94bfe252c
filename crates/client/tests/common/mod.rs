//! In-memory transport shared by the integration tests

#![allow(dead_code)]

use serde_json::Value;
use staplus_client::{HttpRequest, HttpResponse, Service, StaplusError, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BASE: &str = "http://localhost:8080/FROST-Server/v1.1";

#[derive(Default)]
struct State {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Replays queued responses in order and records every request it sees.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn push(&self, response: HttpResponse) -> &Self {
        self.state.lock().unwrap().responses.push_back(response);
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(HttpResponse::new(status, body.to_string()))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_urls(&self) -> Vec<String> {
        self.requests().iter().map(|r| r.url().to_string()).collect()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> staplus_client::Result<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        state
            .responses
            .pop_front()
            .ok_or_else(|| StaplusError::Transport(format!("no response queued for {}", request.url())))
    }
}

/// A service over a fresh mock; keep the service alive for as long as
/// fetched entities need to navigate.
pub fn service() -> (Service, MockTransport) {
    init_tracing();
    let mock = MockTransport::default();
    let service = Service::with_transport(BASE, mock.clone()).expect("valid base url");
    (service, mock)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
