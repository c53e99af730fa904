//! Request emission.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture};
use futures::{FutureExt, Stream};
use http::{HeaderMap, Method};
use tracing::debug;

use crate::encoding::{normalize_method, select_shape};
use crate::{
    Body, ExtractFiles, LinkError, PassthroughOptions, Result, Transport, TransportRequest,
    TransportResponse,
};

/// Options for one request.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Encode files as a multipart form.
    pub use_multipart: bool,
    /// Final header set.
    pub headers: HeaderMap,
    /// Options forwarded to the transport.
    pub passthrough: PassthroughOptions,
}

/// One logical GraphQL call.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Endpoint URL.
    pub url: String,
    /// One operation or a batch.
    pub body: Body,
    /// Encoding and transport options.
    pub options: TransportOptions,
}

/// The pending result of a [`fetch`].
///
/// Resolves exactly once. Nothing is sent until it is first polled, and
/// dropping it aborts the HTTP exchange.
#[must_use = "futures do nothing unless polled"]
pub struct Fetch {
    inner: BoxFuture<'static, Result<TransportResponse>>,
}

impl Fetch {
    /// Adapt into a stream that yields the single result and then ends.
    pub fn into_stream(self) -> impl Stream<Item = Result<TransportResponse>> + Send {
        futures::stream::once(self)
    }
}

impl Future for Fetch {
    type Output = Result<TransportResponse>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

/// Encode `request` and send it over `transport`.
///
/// Encoding happens immediately. If the request cannot be encoded the
/// returned future resolves to that error and the transport is never called.
pub fn fetch(
    request: Request,
    transport: Arc<dyn Transport>,
    extract_files: Option<&dyn ExtractFiles>,
) -> Fetch {
    let Request {
        method,
        url,
        body,
        options,
    } = request;
    let method = normalize_method(method);

    let shape = match select_shape(&method, body, options.use_multipart, extract_files) {
        Ok(shape) => shape,
        Err(error) => {
            return Fetch {
                inner: future::ready(Err(error)).boxed(),
            };
        }
    };

    debug!(method = %method, url = %url, shape = shape.kind(), "Sending GraphQL request");

    let request = TransportRequest {
        method,
        url,
        headers: options.headers,
        shape,
        options: options.passthrough,
    };

    Fetch {
        inner: async move { transport.send(request).await.map_err(LinkError::from) }.boxed(),
    }
}
