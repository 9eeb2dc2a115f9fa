use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::config::{ConfigError, EndpointConfig};

/// The encoded request envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        TransportResponse { status, body: body.into() }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        TransportResponse::new(StatusCode::OK, body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Carries one request to the server and brings back whatever it answered.
///
/// A non-success status is not a failure at this level; the response decoder turns it into
/// an error. Dropping the returned future cancels the request.
pub trait Transport: Send + Sync {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        (**self).execute(request)
    }
}

/// Posts JSON requests to a GraphQL endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        HttpTransport::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        HttpTransport { http, url: url.into(), timeout: None }
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(HttpTransport { http, url: config.url.clone(), timeout: config.timeout() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        async move {
            let mut builder = self
                .http
                .post(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .body(request.body);
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            let response = builder.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            tracing::debug!(url = %self.url, %status, bytes = body.len(), "received response");
            Ok(TransportResponse { status, body: body.to_vec() })
        }
        .boxed()
    }
}
