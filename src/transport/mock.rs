use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{RawResponse, Transport};
use crate::error::{CarsxeError, Result};
use crate::request::ApiRequest;

/// What the mock hands back for the next request.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(RawResponse),
    /// Fail as if the network were down.
    TransportError(String),
}

impl MockResponse {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Success(RawResponse::new(200, body))
    }

    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Success(RawResponse::new(status, body))
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    requests: Vec<ApiRequest>,
}

/// Controls a [`MockTransport`] from the test side.
#[derive(Debug, Default)]
pub struct MockHandle {
    state: Mutex<MockState>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        self.lock().responses.push_back(response);
    }

    /// Every request executed so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // a panicking test thread must not hide later assertions
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// In-memory transport that records requests and replays queued responses.
///
/// With nothing queued it answers `200 {}`.
#[derive(Debug, Clone)]
pub struct MockTransport {
    handle: Arc<MockHandle>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: Arc::clone(&handle) }, handle)
    }

    #[must_use]
    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (transport, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (transport, handle)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let next = {
            let mut state = self.handle.lock();
            state.requests.push(request);
            state.responses.pop_front()
        };
        match next {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::TransportError(message)) => Err(CarsxeError::Transport(message)),
            None => Ok(RawResponse::new(200, "{}")),
        }
    }
}
