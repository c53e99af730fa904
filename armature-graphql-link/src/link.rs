//! HTTP link: builds requests from operations and sends them.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::DEFAULT_URI;
use crate::fetch::{Fetch, Request, TransportOptions, fetch};
use crate::headers::insert_header;
use crate::{
    Body, ClientAwareness, ExtractFiles, GraphQLResponse, HttpLinkConfig, LinkError, Operation,
    PassthroughOptions, ReqwestTransport, Result, Transport, compose, prioritize,
    with_client_awareness,
};

/// Per-operation settings. Anything set here wins over the link configuration.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// GraphQL endpoint.
    pub uri: Option<String>,
    /// HTTP method.
    pub method: Option<Method>,
    /// Headers merged over the link's headers.
    pub headers: Option<HeaderMap>,
    /// Encode files as a multipart form.
    pub use_multipart: Option<bool>,
    /// Send operation extensions.
    pub include_extensions: Option<bool>,
    /// Send the query document.
    pub include_query: Option<bool>,
    /// Client identity reported in headers.
    pub client_awareness: Option<ClientAwareness>,
    /// Options forwarded to the transport.
    pub passthrough: PassthroughOptions,
}

impl OperationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let headers = self.headers.get_or_insert_with(HeaderMap::new);
        insert_header(headers, name.as_ref(), value.as_ref());
        self
    }

    /// Enable or disable multipart file upload.
    pub fn use_multipart(mut self, enabled: bool) -> Self {
        self.use_multipart = Some(enabled);
        self
    }

    /// Enable or disable sending extensions.
    pub fn include_extensions(mut self, enabled: bool) -> Self {
        self.include_extensions = Some(enabled);
        self
    }

    /// Enable or disable sending the query document.
    pub fn include_query(mut self, enabled: bool) -> Self {
        self.include_query = Some(enabled);
        self
    }

    /// Set the client identity.
    pub fn client_awareness(mut self, identity: ClientAwareness) -> Self {
        self.client_awareness = Some(identity);
        self
    }

    /// Set a timeout for this operation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.passthrough.timeout = Some(timeout);
        self
    }
}

/// GraphQL HTTP link.
#[derive(Clone)]
pub struct HttpLink {
    transport: Arc<dyn Transport>,
    config: Arc<HttpLinkConfig>,
    extract_files: Option<Arc<dyn ExtractFiles>>,
}

impl HttpLink {
    /// Create a link backed by reqwest.
    pub fn new(config: HttpLinkConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a link over a custom transport.
    pub fn with_transport(config: HttpLinkConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            extract_files: None,
        }
    }

    /// Set the adapter used to find files for multipart upload.
    pub fn extract_files(mut self, extractor: impl ExtractFiles + 'static) -> Self {
        self.extract_files = Some(Arc::new(extractor));
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &HttpLinkConfig {
        &self.config
    }

    /// Build the request for a single operation.
    pub fn request(&self, operation: Operation, context: &OperationContext) -> Request {
        self.build_request(Body::Single(operation), context)
    }

    /// Build the request for a batch.
    pub fn batch_request(
        &self,
        operations: Vec<Operation>,
        context: &OperationContext,
    ) -> Result<Request> {
        Ok(self.build_request(Body::batch(operations)?, context))
    }

    /// Send a prepared request.
    pub fn fetch(&self, request: Request) -> Fetch {
        fetch(
            request,
            Arc::clone(&self.transport),
            self.extract_files.as_deref(),
        )
    }

    /// Execute an operation and decode the result.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        context: &OperationContext,
    ) -> Result<GraphQLResponse<T>> {
        let response = self.fetch(self.request(operation, context)).await?;
        GraphQLResponse::from_transport(response)
    }

    /// Execute an operation and return its data, failing on GraphQL errors.
    pub async fn execute_data<T: DeserializeOwned>(
        &self,
        operation: Operation,
        context: &OperationContext,
    ) -> Result<T> {
        let response: GraphQLResponse<Value> = self.execute(operation, context).await?;
        let data = response.into_result()?;
        serde_json::from_value(data).map_err(|e| LinkError::Parse(e.to_string()))
    }

    /// Execute a batch and decode one result per operation.
    pub async fn execute_batch<T: DeserializeOwned>(
        &self,
        operations: Vec<Operation>,
        context: &OperationContext,
    ) -> Result<Vec<GraphQLResponse<T>>> {
        let expected = operations.len();
        let response = self.fetch(self.batch_request(operations, context)?).await?;
        let results = GraphQLResponse::batch_from_transport(response)?;

        if results.len() != expected {
            return Err(LinkError::Parse(format!(
                "expected {expected} results for the batch, got {}",
                results.len()
            )));
        }
        Ok(results)
    }

    fn build_request(&self, mut body: Body, context: &OperationContext) -> Request {
        let config = &self.config;

        let method = prioritize([context.method.clone(), config.method.clone()])
            .unwrap_or(Method::POST);
        let url = prioritize([context.uri.clone(), config.uri.clone()])
            .unwrap_or_else(|| DEFAULT_URI.to_string());
        let use_multipart =
            prioritize([context.use_multipart, config.use_multipart]).unwrap_or(false);
        let include_extensions =
            prioritize([context.include_extensions, config.include_extensions]).unwrap_or(false);
        let include_query =
            prioritize([context.include_query, config.include_query]).unwrap_or(true);

        for operation in body.operations_mut() {
            if !include_extensions {
                operation.extensions = None;
            }
            if !include_query {
                operation.query = None;
            }
        }

        let headers = compose(Some(config.headers.clone()), context.headers.clone())
            .unwrap_or_default();
        let identity = prioritize([
            context.client_awareness.as_ref(),
            config.client_awareness.as_ref(),
        ]);
        let headers = with_client_awareness(headers, identity);

        debug!(
            method = %method,
            url = %url,
            operations = body.len(),
            use_multipart,
            "Built GraphQL request"
        );

        Request {
            method,
            url,
            body,
            options: TransportOptions {
                use_multipart,
                headers,
                passthrough: context.passthrough.clone().or(&config.passthrough),
            },
        }
    }
}
