//! Async stream that converts response bytes into parsed NDJSON lines.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use ndtail_types::{StreamData, StreamError};
use pin_project_lite::pin_project;

use crate::ndjson::{LineBuffer, Utf8Decoder, parse_data_line};

pin_project! {
    /// An async stream of parsed [`StreamData`] lines from an HTTP response body.
    ///
    /// One byte chunk may carry any number of lines; completed lines queue up
    /// and drain one per poll. On clean end-of-input a trailing line without a
    /// final newline is flushed as the last item. A transport error is yielded
    /// as the final item and ends the stream, discarding any partial line.
    pub struct LineStream {
        #[pin]
        inner: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, StreamError>> + Send>>,
        decoder: Utf8Decoder,
        lines: LineBuffer,
        ready: VecDeque<Result<StreamData, StreamError>>,
        done: bool,
    }
}

impl LineStream {
    /// Create a new LineStream from a stream of body chunks.
    ///
    /// Transport errors are expected to be mapped to [`StreamError`] at the
    /// edge; this stage is transport-agnostic.
    pub fn new(
        byte_stream: impl Stream<Item = Result<bytes::Bytes, StreamError>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            decoder: Utf8Decoder::new(),
            lines: LineBuffer::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }
}

impl std::fmt::Debug for LineStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The inner byte stream is an opaque trait object
        f.debug_struct("LineStream")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Stream for LineStream {
    type Item = Result<StreamData, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // Drain lines completed by earlier chunks first
            if let Some(item) = this.ready.pop_front() {
                return Poll::Ready(Some(item));
            }
            if *this.done {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let text = this.decoder.decode(&bytes);
                    for line in this.lines.feed(&text) {
                        this.ready.push_back(Ok(parse_data_line(&line)));
                    }
                    // The chunk may have held no complete line; poll again
                }
                Poll::Ready(Some(Err(e))) => {
                    *this.done = true;
                    this.ready.push_back(Err(e));
                }
                Poll::Ready(None) => {
                    *this.done = true;
                    let tail = this.decoder.finish();
                    for line in this.lines.feed(&tail) {
                        this.ready.push_back(Ok(parse_data_line(&line)));
                    }
                    if let Some(line) = this.lines.finish() {
                        this.ready.push_back(Ok(parse_data_line(&line)));
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
