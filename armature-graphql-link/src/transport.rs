//! HTTP transport.
//!
//! The link hands one [`TransportRequest`] to a [`Transport`] per call and
//! gets back one [`TransportResponse`] or a [`TransportError`]. Connection
//! pooling, TLS and timeouts belong to the transport.

use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode, Version};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{BodyShape, HttpLinkConfig, TransportError, prioritize};

/// How the response body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Parse the body as JSON.
    #[default]
    Json,
    /// Keep the body as a JSON string.
    Text,
}

/// Options forwarded to the transport as-is.
///
/// They are applied after everything the link sets and win over its defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassthroughOptions {
    /// How to read the response body (defaults to JSON).
    pub response_type: Option<ResponseType>,
    /// Timeout for the HTTP exchange.
    pub timeout: Option<Duration>,
    /// HTTP version to use.
    pub version: Option<Version>,
}

impl PassthroughOptions {
    /// Set the response type.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the HTTP version.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Fill unset options from `fallback`.
    pub fn or(self, fallback: &PassthroughOptions) -> Self {
        Self {
            response_type: prioritize([self.response_type, fallback.response_type]),
            timeout: prioritize([self.timeout, fallback.timeout]),
            version: prioritize([self.version, fallback.version]),
        }
    }
}

/// A fully encoded request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL.
    pub url: String,
    /// Final header set.
    pub headers: HeaderMap,
    /// Selected body shape.
    pub shape: BodyShape,
    /// Options applied last.
    pub options: PassthroughOptions,
}

/// A decoded HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Value,
}

impl TransportResponse {
    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Consume the response and return the body.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Deserialize the body.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.body)
    }
}

/// Issues one HTTP exchange per request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and read the response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a [`reqwest::Client`].
///
/// Non-2xx responses fail with [`TransportError::Status`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Build a transport from link configuration.
    pub fn new(config: &HttpLinkConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .build()?;

        let transport = Self::from_client(client);
        match &config.base_url {
            Some(base) => transport.base_url(base),
            None => Ok(transport),
        }
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Resolve relative request URLs against `base`.
    pub fn base_url(mut self, base: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))?;
        self.base_url = Some(base);
        Ok(self)
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        let resolved = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            shape,
            options,
        } = request;

        if let BodyShape::Multipart(_) = &shape {
            // The form sets its own boundary.
            headers.remove(CONTENT_TYPE);
        }

        let mut url = self.resolve(&url)?;
        if let BodyShape::QueryString(params) = &shape {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut builder = self.client.request(method, url).headers(headers);
        builder = match shape {
            BodyShape::QueryString(_) => builder,
            BodyShape::Json(operation) => builder.json(&operation),
            BodyShape::Batch(operations) => builder.json(&operations),
            BodyShape::Multipart(body) => builder.multipart(body.into_form()?),
        };

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(version) = options.version {
            builder = builder.version(version);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        debug!(status = %status, "Received GraphQL HTTP response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let body = match options.response_type.unwrap_or_default() {
            ResponseType::Json => response.json::<Value>().await?,
            ResponseType::Text => Value::String(response.text().await?),
        };

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
