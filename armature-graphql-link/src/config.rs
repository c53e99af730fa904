//! GraphQL link configuration.

use std::time::Duration;

use http::{HeaderMap, Method};

use crate::headers::insert_header;
use crate::{ClientAwareness, PassthroughOptions, ResponseType};

/// URI used when neither the operation nor the link sets one.
pub const DEFAULT_URI: &str = "graphql";

/// Link-level configuration.
///
/// Optional fields may also be set per operation through
/// [`OperationContext`](crate::OperationContext); the operation's value wins.
#[derive(Debug, Clone)]
pub struct HttpLinkConfig {
    /// GraphQL endpoint (defaults to [`DEFAULT_URI`]).
    pub uri: Option<String>,
    /// HTTP method (defaults to POST).
    pub method: Option<Method>,
    /// Default headers for all requests.
    pub headers: HeaderMap,
    /// Encode operations with files as multipart forms.
    pub use_multipart: Option<bool>,
    /// Send operation extensions (defaults to false).
    pub include_extensions: Option<bool>,
    /// Send the query document (defaults to true).
    pub include_query: Option<bool>,
    /// Client identity reported in headers.
    pub client_awareness: Option<ClientAwareness>,
    /// Options forwarded to the transport.
    pub passthrough: PassthroughOptions,
    /// Base URL that relative URIs are resolved against.
    pub base_url: Option<String>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip response decompression.
    pub gzip: bool,
}

impl Default for HttpLinkConfig {
    fn default() -> Self {
        Self {
            uri: None,
            method: None,
            headers: HeaderMap::new(),
            use_multipart: None,
            include_extensions: None,
            include_query: None,
            client_awareness: None,
            passthrough: PassthroughOptions::default(),
            base_url: None,
            user_agent: format!("armature-graphql-link/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
        }
    }
}

impl HttpLinkConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpLinkConfigBuilder {
        HttpLinkConfigBuilder::default()
    }

    /// Create configuration for a specific endpoint.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Default::default()
        }
    }
}

/// Builder for link configuration.
#[derive(Debug, Default)]
pub struct HttpLinkConfigBuilder {
    config: HttpLinkConfig,
}

impl HttpLinkConfigBuilder {
    /// Set the GraphQL endpoint.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.uri = Some(uri.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.config.method = Some(method);
        self
    }

    /// Add a default header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        insert_header(&mut self.config.headers, name.as_ref(), value.as_ref());
        self
    }

    /// Replace the default headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("authorization", value)
    }

    /// Enable or disable multipart file upload.
    pub fn use_multipart(mut self, enabled: bool) -> Self {
        self.config.use_multipart = Some(enabled);
        self
    }

    /// Enable or disable sending extensions.
    pub fn include_extensions(mut self, enabled: bool) -> Self {
        self.config.include_extensions = Some(enabled);
        self
    }

    /// Enable or disable sending the query document.
    pub fn include_query(mut self, enabled: bool) -> Self {
        self.config.include_query = Some(enabled);
        self
    }

    /// Set the client identity.
    pub fn client_awareness(mut self, identity: ClientAwareness) -> Self {
        self.config.client_awareness = Some(identity);
        self
    }

    /// Set a default timeout, forwarded to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.passthrough.timeout = Some(timeout);
        self
    }

    /// Set the default response type.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.config.passthrough.response_type = Some(response_type);
        self
    }

    /// Set the base URL for relative URIs.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip decompression.
    pub fn gzip(mut self, enabled: bool) -> Self {
        self.config.gzip = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpLinkConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpLinkConfig::default();
        assert_eq!(config.uri, None);
        assert_eq!(config.method, None);
        assert!(config.headers.is_empty());
        assert!(config.gzip);
        assert!(config.user_agent.starts_with("armature-graphql-link/"));
    }

    #[test]
    fn test_builder() {
        let config = HttpLinkConfig::builder()
            .uri("https://api.example.com/graphql")
            .method(Method::GET)
            .bearer_auth("token123")
            .header("x-tenant", "acme")
            .header("bad header", "ignored")
            .use_multipart(true)
            .include_extensions(true)
            .client_awareness(ClientAwareness::new("web", "1.0.0"))
            .timeout(Duration::from_secs(10))
            .build();

        assert_eq!(config.uri.as_deref(), Some("https://api.example.com/graphql"));
        assert_eq!(config.method, Some(Method::GET));
        assert_eq!(config.headers.get("authorization").unwrap(), "Bearer token123");
        assert_eq!(config.headers.get("x-tenant").unwrap(), "acme");
        assert_eq!(config.headers.len(), 2);
        assert_eq!(config.use_multipart, Some(true));
        assert_eq!(config.include_extensions, Some(true));
        assert_eq!(config.include_query, None);
        assert_eq!(config.passthrough.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_new() {
        let config = HttpLinkConfig::new("http://localhost:4000/graphql");
        assert_eq!(config.uri.as_deref(), Some("http://localhost:4000/graphql"));
    }
}
