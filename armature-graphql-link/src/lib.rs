//! # Armature GraphQL Link
//!
//! Turns a GraphQL operation, or a batch of operations, into exactly one HTTP
//! request and decodes the response.
//!
//! ## Features
//!
//! - **Method aware**: POST/PUT/PATCH send a JSON body, other methods send
//!   the operation as query parameters
//! - **Batching**: Send several operations as one JSON array
//! - **File upload**: GraphQL multipart requests with pluggable file extraction
//! - **Header precedence**: Per-operation headers override link headers
//! - **Client awareness**: `apollographql-client-name`/`-version` headers
//! - **Named links**: A registry with a required `default` link
//!
//! Invalid combinations (upload with batching, upload or batching over GET,
//! upload without an extraction adapter) fail before anything is sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use armature_graphql_link::{HttpLink, HttpLinkConfig, Operation, OperationContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let link = HttpLink::new(HttpLinkConfig::new("https://api.example.com/graphql"))?;
//!
//!     let operation = Operation::new("query GetUser($id: ID!) { user(id: $id) { id name } }")
//!         .variable("id", "123");
//!
//!     let data: serde_json::Value = link
//!         .execute_data(operation, &OperationContext::new())
//!         .await?;
//!
//!     println!("User: {}", data["user"]["name"]);
//!     Ok(())
//! }
//! ```
//!
//! ## File Upload
//!
//! ```rust,no_run
//! use armature_graphql_link::{
//!     HttpLink, HttpLinkConfig, Operation, OperationContext, Upload, UploadExtractor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpLinkConfig::builder()
//!         .uri("https://api.example.com/graphql")
//!         .use_multipart(true)
//!         .build();
//!     let link = HttpLink::new(config)?.extract_files(UploadExtractor);
//!
//!     let operation = Operation::new("mutation($file: Upload!) { upload(file: $file) }")
//!         .variable("file", Upload::from_path("avatar.png").await?);
//!
//!     let response: armature_graphql_link::GraphQLResponse = link
//!         .execute(operation, &OperationContext::new())
//!         .await?;
//!     println!("Uploaded: {:?}", response.data);
//!     Ok(())
//! }
//! ```

mod config;
mod encoding;
mod error;
mod fetch;
mod headers;
mod link;
mod multipart;
mod operation;
mod registry;
mod response;
mod transport;
mod upload;

pub use config::{DEFAULT_URI, HttpLinkConfig, HttpLinkConfigBuilder};
pub use encoding::{BodyShape, is_body_bearing, normalize_method, select_shape};
pub use error::{Incompatibility, LinkError, Result, TransportError};
pub use fetch::{Fetch, Request, TransportOptions, fetch};
pub use headers::{
    CLIENT_NAME_HEADER, CLIENT_VERSION_HEADER, ClientAwareness, compose, prioritize,
    with_client_awareness,
};
pub use link::{HttpLink, OperationContext};
pub use multipart::{DEFAULT_FILE_NAME, MAP_FIELD, MultipartBody, OPERATIONS_FIELD};
pub use operation::{Body, Operation, Variable, Variables};
pub use registry::{DEFAULT_CLIENT, LinkRegistry};
pub use response::{ErrorLocation, GraphQLResponse, GraphQLResponseError, PathSegment, format_path};
pub use transport::{
    PassthroughOptions, ReqwestTransport, ResponseType, Transport, TransportRequest,
    TransportResponse,
};
pub use upload::{ExtractFiles, Extraction, FileMap, Upload, UploadExtractor};

// Re-export common types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode};
pub use serde_json::Value as JsonValue;

/// Prelude for common imports.
///
/// ```
/// use armature_graphql_link::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{HttpLinkConfig, HttpLinkConfigBuilder};
    pub use crate::error::{LinkError, Result};
    pub use crate::headers::ClientAwareness;
    pub use crate::link::{HttpLink, OperationContext};
    pub use crate::operation::{Body, Operation, Variable};
    pub use crate::registry::LinkRegistry;
    pub use crate::response::GraphQLResponse;
    pub use crate::upload::{Upload, UploadExtractor};
    pub use http::Method;
}
