//! Executes `HttpRequest`s built by `PostClient`.
//!
//! # Design
//! The core never opens sockets itself; the controller hands each request to
//! a `Transport`. A transport only reports `ApiError::NoResponse` for
//! failures where no response arrived. Every received response, whatever its
//! status and even with an unreadable body, is returned as data so
//! `PostClient::parse_*` does the status interpretation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

#[cfg(feature = "reqwest-transport")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use async_trait::async_trait;
    use reqwest::{Client, Method};

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// `Transport` backed by a shared `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new(client: Client) -> Self {
            Self { client }
        }
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let mut builder = self.client.request(method(request.method), &request.path);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                tracing::debug!(path = %request.path, error = %e, "request produced no response");
                ApiError::NoResponse(e.to_string())
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.text().await;

            Ok(received(status, headers, body))
        }
    }

    /// A status arrived, so the response is kept even when its body is lost.
    fn received<E: std::fmt::Display>(
        status: u16,
        headers: Vec<(String, String)>,
        body: Result<String, E>,
    ) -> HttpResponse {
        let body = body.unwrap_or_else(|e| {
            tracing::warn!(status, error = %e, "response body could not be read");
            String::new()
        });
        HttpResponse {
            status,
            headers,
            body,
        }
    }

}
