//! HTTP connector for NDJSON stream endpoints.

use std::future::Future;
use std::pin::Pin;

use futures_util::StreamExt;
use ndtail_types::connector::{Connector, DataStream};
use ndtail_types::{StreamError, StreamRequest};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONNECTION, HeaderMap, HeaderName, HeaderValue};

use crate::stream::LineStream;

/// Client for NDJSON-over-HTTP stream endpoints.
///
/// Issues one GET per session and hands the response body to [`LineStream`].
/// Compressed bodies (gzip, deflate, brotli) are decoded transparently by
/// reqwest, which also owns the `Accept-Encoding` header. Cookies persist
/// across requests within one client. No timeouts are configured: a stalled
/// server holds the stream open until the transport fails or the session is
/// stopped.
#[derive(Clone)]
pub struct StreamClient {
    http: reqwest::Client,
    bearer_token: Option<String>,
}

impl StreamClient {
    /// Create a new stream client.
    pub fn new() -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| StreamError::Network(e.to_string()))?;

        Ok(Self {
            http,
            bearer_token: None,
        })
    }

    /// Attach a bearer token, sent as `Authorization: Bearer <token>`.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Open the stream described by `request` and return its line stream.
    pub async fn open(&self, request: &StreamRequest) -> Result<LineStream, StreamError> {
        let url = build_url(&request.url, &request.params)?;
        let headers = self.build_headers(&request.headers)?;

        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(connection_error(status));
        }
        // 204/205 are success statuses that carry no body to read
        if matches!(status.as_u16(), 204 | 205) {
            return Err(StreamError::StreamUnavailable);
        }

        let body = response
            .bytes_stream()
            .map(|result| result.map_err(map_read_error));
        Ok(LineStream::new(body))
    }

    /// Assemble request headers: defaults first, then the bearer token,
    /// then caller-supplied pairs. Appends accumulate rather than replace.
    fn build_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, StreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| StreamError::Request("Invalid bearer token format".into()))?;
            headers.append(AUTHORIZATION, value);
        }

        for (name, value) in extra {
            if name.is_empty() || value.is_empty() {
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| StreamError::Request(format!("Invalid header name: {name}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| StreamError::Request(format!("Invalid value for header '{name}'")))?;
            headers.append(header_name, header_value);
        }

        Ok(headers)
    }
}

impl Connector for StreamClient {
    fn endpoint(&self, request: &StreamRequest) -> Result<String, StreamError> {
        build_url(&request.url, &request.params).map(|url| url.to_string())
    }

    fn connect<'a>(
        &'a self,
        request: &'a StreamRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DataStream, StreamError>> + Send + 'a>> {
        Box::pin(async move {
            let stream = self.open(request).await?;
            Ok(Box::pin(stream) as DataStream)
        })
    }
}

/// Build the final URL with query parameters appended.
///
/// Pairs with an empty key or value are dropped.
fn build_url(url: &str, params: &[(String, String)]) -> Result<reqwest::Url, StreamError> {
    let mut url = reqwest::Url::parse(url)
        .map_err(|e| StreamError::Request(format!("Invalid URL: {e}")))?;

    let mut usable = params
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .peekable();
    if usable.peek().is_some() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in usable {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Map a non-success HTTP status to a typed connection error.
fn connection_error(status: reqwest::StatusCode) -> StreamError {
    StreamError::Connection {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
    }
}

/// Classify a mid-read failure: body decoding (e.g. corrupt compressed
/// content) is a decode error, anything else is transport.
fn map_read_error(e: reqwest::Error) -> StreamError {
    if e.is_decode() {
        StreamError::Decode(e.to_string())
    } else {
        StreamError::Network(e.to_string())
    }
}
