//! Connector trait for NDJSON stream sources.

use crate::{StreamData, StreamError, StreamRequest};
use futures_core::Stream;
use std::future::Future;
use std::pin::Pin;

/// A boxed async stream of parsed NDJSON lines.
pub type DataStream = Pin<Box<dyn Stream<Item = Result<StreamData, StreamError>> + Send>>;

/// Trait for NDJSON stream sources (HTTP endpoints, test fixtures).
///
/// Connectors resolve a request into a live line stream. Dyn-compatible so
/// the monitor works with `Arc<dyn Connector>`.
pub trait Connector: Send + Sync {
    /// Resolve the final URL for a request, for display and logging.
    fn endpoint(&self, request: &StreamRequest) -> Result<String, StreamError>;

    /// Open the stream, yielding parsed lines as they arrive.
    fn connect<'a>(
        &'a self,
        request: &'a StreamRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DataStream, StreamError>> + Send + 'a>>;
}
