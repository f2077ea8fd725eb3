// Scripted transport for tests: replays canned responses and records call times.
use crate::fetcher::traits::{RawResponse, Transport};
use crate::model::FetchError;

use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, FetchError>>>,
    fallback: Option<RawResponse>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with `response`.
    pub fn repeating(response: RawResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.calls.lock().unwrap().push((url.to_string(), Instant::now()));

        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(step), _) => step,
            (None, Some(response)) => Ok(response.clone()),
            (None, None) => panic!("scripted transport exhausted at {url}"),
        }
    }
}

pub fn ok(body: &str) -> RawResponse {
    RawResponse {
        status: 200,
        status_text: "OK".into(),
        retry_after: None,
        body: body.into(),
    }
}

pub fn status(code: u16, text: &str) -> RawResponse {
    RawResponse {
        status: code,
        status_text: text.into(),
        retry_after: None,
        body: String::new(),
    }
}

pub fn rate_limited(retry_after: Option<&str>) -> RawResponse {
    RawResponse {
        retry_after: retry_after.map(str::to_owned),
        ..status(429, "Too Many Requests")
    }
}

pub fn network_error(cause: &str) -> FetchError {
    FetchError::Network { cause: cause.into() }
}
