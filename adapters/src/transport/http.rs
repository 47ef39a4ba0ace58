//! reqwest-backed transport

use super::{GatewayRequest, GatewayResponse, HttpMethod, Transport};
use crate::{config::GatewayConfig, metrics::GATEWAY_REQUEST_DURATION, Error, Result};
use async_trait::async_trait;
use momo_protocol::Environment;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

struct EnvironmentClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// HTTP transport with one client per environment.
///
/// Sandbox clients accept invalid certificates; production clients verify them.
pub struct HttpTransport {
    sandbox: EnvironmentClient,
    production: EnvironmentClient,
}

impl HttpTransport {
    /// Build clients for both environments from the configuration
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            sandbox: Self::build(config, Environment::Sandbox)?,
            production: Self::build(config, Environment::Production)?,
        })
    }

    fn build(config: &GatewayConfig, environment: Environment) -> Result<EnvironmentClient> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .danger_accept_invalid_certs(!environment.verify_tls())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(EnvironmentClient {
            client,
            base_url: config.base_url_for(environment),
            token: config.api_token(environment).map(str::to_string),
        })
    }

    fn client_for(&self, environment: Environment) -> &EnvironmentClient {
        match environment {
            Environment::Sandbox => &self.sandbox,
            Environment::Production => &self.production,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse> {
        let target = self.client_for(request.environment);
        let url = format!("{}{}", target.base_url, request.path);

        let mut builder = match request.method {
            HttpMethod::Get => target.client.get(&url),
            HttpMethod::Post => target.client.post(&url),
        };
        builder = builder.header(header::ACCEPT, "application/json");
        if let Some(token) = &target.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            Error::Connection(format!("{} {} failed: {}", request.method, request.path, e))
        })?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        GATEWAY_REQUEST_DURATION
            .with_label_values(&[&request.method.to_string(), request.environment.as_str()])
            .observe(start.elapsed().as_secs_f64());

        debug!(method = %request.method, path = %request.path, status, "gateway response");

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(GatewayResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            sandbox_api_token: Some("sandbox-token".into()),
            base_url: Some(base_url.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_post_sends_bearer_and_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/deposits"))
            .and(header("authorization", "Bearer sandbox-token"))
            .and(body_json(json!({"depositId": "d-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ACCEPTED"})))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&config(&server.uri())).unwrap();
        let response = transport
            .send(GatewayRequest::post(Environment::Sandbox, "/v2/deposits", json!({"depositId": "d-1"})))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["status"], "ACCEPTED");
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/deposits/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&config(&server.uri())).unwrap();
        let response = transport
            .send(GatewayRequest::get(Environment::Sandbox, "/deposits/missing"))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, Value::Null);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_unparseable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&config(&server.uri())).unwrap();
        let result = transport
            .send(GatewayRequest::get(Environment::Sandbox, "/availability"))
            .await;

        assert!(matches!(result, Err(Error::Json(_))));
    }
}
