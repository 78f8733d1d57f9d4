//! HTTP client with incremental NDJSON decoding for ndtail.

mod client;
mod ndjson;
mod stream;

pub use client::StreamClient;
pub use ndjson::{LineBuffer, Utf8Decoder, parse_data_line};
pub use stream::LineStream;
