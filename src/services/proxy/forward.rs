//! Outbound HTTP client used to reach backend services.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use url::Url;

use super::headers::relayed_headers;

/// Transport-level failure talking to a backend. Never retried.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Send(#[source] reqwest::Error),
    #[error("failed to read upstream body: {0}")]
    Body(#[source] reqwest::Error),
}

impl ForwardError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Send(e) | Self::Body(e) => e.is_timeout(),
        }
    }
}

/// A completed backend response, relayed as-is.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Pooled client shared by every request; stateless apart from connections.
#[derive(Clone, Debug)]
pub struct Upstream {
    client: reqwest::Client,
}

impl Upstream {
    /// `timeout` bounds the whole backend exchange (connect, send, body).
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            // Redirects belong to the caller.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    pub async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<ProxiedResponse, ForwardError> {
        let mut builder = self.client.request(method, url).headers(headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let upstream = builder.send().await.map_err(ForwardError::Send)?;

        let status = upstream.status();
        let headers = relayed_headers(upstream.headers());
        let body = upstream.bytes().await.map_err(ForwardError::Body)?;

        Ok(ProxiedResponse {
            status,
            headers,
            body,
        })
    }
}
