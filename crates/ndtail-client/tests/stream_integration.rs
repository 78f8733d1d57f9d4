//! Integration tests for the bytes → LineStream → StreamData pipeline.
//!
//! These tests simulate chunked transfer by feeding byte chunks through
//! LineStream and verifying parsed lines come out complete, in order,
//! regardless of where the chunk boundaries fall.
//!
//! Run with: `cargo test -p ndtail-client --test stream_integration -- --ignored`
//! Or all ignored tests: `cargo test --workspace -- --ignored`

use futures_util::StreamExt;
use ndtail_client::LineStream;
use ndtail_types::{StreamData, StreamError};
use serde_json::json;

/// Create a LineStream from one complete in-memory body.
fn stream_from_body(body: &str) -> LineStream {
    stream_from_chunks(vec![body])
}

/// Create a LineStream from multiple byte chunks (simulating chunked transfer).
fn stream_from_chunks(chunks: Vec<&str>) -> LineStream {
    let byte_stream = futures_util::stream::iter(
        chunks
            .into_iter()
            .map(|s| Ok::<_, StreamError>(bytes::Bytes::from(s.to_owned())))
            .collect::<Vec<_>>(),
    );
    LineStream::new(byte_stream)
}

/// Collect all lines from a LineStream, expecting no transport errors.
async fn collect_data(mut stream: LineStream) -> Vec<StreamData> {
    let mut items = Vec::new();
    while let Some(result) = stream.next().await {
        items.push(result.expect("line should decode successfully"));
    }
    items
}

// ---------------------------------------------------------------------------
// Test: one chunk carrying several lines
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_single_chunk_many_lines() {
    let body = "{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n";
    let items = collect_data(stream_from_body(body)).await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0], StreamData::Json(json!({"n": 1})));
    assert_eq!(items[1], StreamData::Json(json!({"n": 2})));
    assert_eq!(items[2], StreamData::Json(json!({"n": 3})));
}

// ---------------------------------------------------------------------------
// Test: lines split across chunk boundaries
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_lines_split_across_chunks() {
    let stream = stream_from_chunks(vec![
        "{\"seq\":1,\"msg\"",
        ":\"first\"}\n{\"seq\":2",
        ",\"msg\":\"second\"}\n",
    ]);

    let items = collect_data(stream).await;

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        StreamData::Json(json!({"seq": 1, "msg": "first"}))
    );
    assert_eq!(
        items[1],
        StreamData::Json(json!({"seq": 2, "msg": "second"}))
    );
}

// ---------------------------------------------------------------------------
// Test: non-JSON lines pass through as raw text
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_mixed_json_and_text_lines() {
    let body = "{\"level\":\"info\"}\nplain log line\n{\"level\":\"warn\"}\n";
    let items = collect_data(stream_from_body(body)).await;

    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], StreamData::Json(_)));
    assert_eq!(items[1], StreamData::Text("plain log line".into()));
    assert!(matches!(items[2], StreamData::Json(_)));
}

// ---------------------------------------------------------------------------
// Test: trailing line without a final newline is flushed on clean end
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_trailing_line_flushed_on_clean_end() {
    let body = "{\"n\":1}\n{\"last\":true}";
    let items = collect_data(stream_from_body(body)).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[1], StreamData::Json(json!({"last": true})));
}

// ---------------------------------------------------------------------------
// Test: transport error ends the stream and discards the partial line
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_error_ends_stream_without_flush() {
    let byte_stream = futures_util::stream::iter(vec![
        Ok(bytes::Bytes::from("{\"n\":1}\n{\"partial\"")),
        Err(StreamError::Network("connection reset".into())),
    ]);
    let mut stream = LineStream::new(byte_stream);

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first, StreamData::Json(json!({"n": 1})));

    let second = stream.next().await.unwrap();
    assert!(matches!(second, Err(StreamError::Network(_))));

    // The buffered "{\"partial\"" fragment is not delivered
    assert!(stream.next().await.is_none());
}

// ---------------------------------------------------------------------------
// Test: multi-byte UTF-8 split across chunks
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_utf8_split_across_chunks() {
    // "{"msg":"café"}\n" with the é (0xC3 0xA9) split between chunks
    let full = "{\"msg\":\"caf\u{e9}\"}\n".as_bytes().to_vec();
    let split_at = full.iter().position(|&b| b == 0xC3).unwrap() + 1;
    let (head, tail) = full.split_at(split_at);

    let byte_stream = futures_util::stream::iter(vec![
        Ok::<_, StreamError>(bytes::Bytes::copy_from_slice(head)),
        Ok(bytes::Bytes::copy_from_slice(tail)),
    ]);
    let items = collect_data(LineStream::new(byte_stream)).await;

    assert_eq!(items, vec![StreamData::Json(json!({"msg": "café"}))]);
}

// ---------------------------------------------------------------------------
// Test: blank lines and surrounding whitespace
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_blank_lines_and_padding_skipped() {
    let body = "\n  {\"n\":1}  \r\n\n\t\nraw\n";
    let items = collect_data(stream_from_body(body)).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0], StreamData::Json(json!({"n": 1})));
    assert_eq!(items[1], StreamData::Text("raw".into()));
}

// ---------------------------------------------------------------------------
// Test: empty body yields no items
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn test_empty_body() {
    let items = collect_data(stream_from_body("")).await;
    assert!(items.is_empty());

    let items = collect_data(stream_from_chunks(vec!["", "", ""])).await;
    assert!(items.is_empty());
}
