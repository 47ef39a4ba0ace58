//! In-memory transport replaying scripted gateway answers

use super::{GatewayRequest, GatewayResponse, HttpMethod, Transport};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    scripts: HashMap<(HttpMethod, String), VecDeque<std::result::Result<GatewayResponse, String>>>,
    log: Vec<GatewayRequest>,
}

/// Transport answering from per-route queues.
///
/// Each route pops its queued answers in order; the last answer repeats.
/// Unscripted routes fail with a connection error. Every request is logged.
#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<State>,
}

impl ScriptedTransport {
    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, method: HttpMethod, path: &str, answer: std::result::Result<GatewayResponse, String>) {
        self.state()
            .scripts
            .entry((method, path.to_string()))
            .or_default()
            .push_back(answer);
    }

    /// Queue a response for a route
    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Ok(GatewayResponse::new(status, body)));
        self
    }

    /// Queue a transport failure for a route
    pub fn fail(&self, method: HttpMethod, path: &str, reason: &str) -> &Self {
        self.push(method, path, Err(reason.to_string()));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.state().log.clone()
    }

    /// Number of requests received on a route
    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.state()
            .log
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse> {
        let mut state = self.state();
        let key = (request.method, request.path.clone());
        state.log.push(request);

        let answer = match state.scripts.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match answer {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(Error::Connection(reason)),
            None => Err(Error::Connection(format!("no scripted response for {} {}", key.0, key.1))),
        }
    }
}
