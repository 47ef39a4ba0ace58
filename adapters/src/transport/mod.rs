//! Gateway transport interface

mod http;
mod scripted;

pub use http::HttpTransport;
pub use scripted::ScriptedTransport;

use crate::Result;
use async_trait::async_trait;
use momo_protocol::Environment;
use serde_json::Value;
use std::fmt;

/// HTTP method used by the gateway API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// One call to the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    /// Target environment (selects base URL, token and TLS policy)
    pub environment: Environment,
    /// Method
    pub method: HttpMethod,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    /// JSON body for POST requests
    pub body: Option<Value>,
}

impl GatewayRequest {
    /// GET request
    pub fn get(environment: Environment, path: impl Into<String>) -> Self {
        Self {
            environment,
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    /// POST request with a JSON body
    pub fn post(environment: Environment, path: impl Into<String>, body: Value) -> Self {
        Self {
            environment,
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Gateway answer: status code plus parsed JSON body (`Null` when empty)
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed body
    pub body: Value,
}

impl GatewayResponse {
    /// New response
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the gateway.
///
/// Any HTTP status is a successful send; `Err` means no usable response
/// (connection failure, timeout, unreadable body).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse>;
}
