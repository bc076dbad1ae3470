//! `reqwest` implementation of the session transport.
//!
//! The session core decides what to send and how to react to statuses; this
//! type only builds the HTTP request and reads the body back as text.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use session::transport::join_url;
use session::{ApiError, ApiRequest, ApiResponse, Method, Transport};

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the TLS backend cannot be initialized.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn prepare(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.http.request(method, self.url_for(&request.path)).header(ACCEPT, "application/json");
        if let Some(value) = &request.authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        if let (Some(content_type), Some(body)) = (request.body.content_type(), request.body.encode()) {
            builder = builder.header(CONTENT_TYPE, content_type).body(body);
        }
        builder
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.prepare(request).send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(ApiResponse::new(status, body))
    }
}
