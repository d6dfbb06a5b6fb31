//! Test doubles shared by unit tests

use crate::error::{Error, Result};
use crate::http::{HttpCaller, Request, Response};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every request it sees
#[derive(Default)]
pub(crate) struct ScriptedCaller {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedCaller {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response
    pub(crate) fn json(self, body: Value) -> Self {
        self.respond(Ok(Response::from_json(body)))
    }

    /// Queue an arbitrary outcome
    pub(crate) fn respond(self, outcome: Result<Response>) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(outcome);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

#[async_trait]
impl HttpCaller for ScriptedCaller {
    async fn call(&self, request: &Request) -> Result<Response> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted response left".to_string())))
    }
}
