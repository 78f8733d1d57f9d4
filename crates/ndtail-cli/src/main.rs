//! ndtail CLI: tail NDJSON streams over HTTP.

mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use ndtail_client::StreamClient;
use ndtail_core::{StreamMonitor, StreamObserver};
use ndtail_types::{Message, MessageKind, StreamRequest};
use std::io::{self, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "ndtail", version, about = "Tail NDJSON streams over HTTP")]
struct Cli {
    /// Stream endpoint URL
    url: String,

    /// Add a request header ("Name: value"); repeatable
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    header: Vec<String>,

    /// Add a query parameter ("key=value"); repeatable
    #[arg(short = 'p', long = "param", value_name = "PARAM")]
    param: Vec<String>,

    /// Bearer token (overrides NDTAIL_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let settings = config::load_settings();
    let token = config::resolve_token(
        cli.token.clone(),
        std::env::var("NDTAIL_TOKEN").ok(),
        &settings,
    );
    let request = build_request(&cli, &settings)?;

    let mut client = StreamClient::new().context("Failed to create HTTP client")?;
    let authenticated = token.is_some();
    if let Some(token) = token {
        client = client.with_bearer_token(token);
    }

    let monitor = StreamMonitor::new(Arc::new(client)).with_observer(Arc::new(StdioObserver));
    if authenticated {
        monitor.add_message("using bearer token", MessageKind::Auth);
    }

    // Ctrl-C cancels the session; the read loop performs its stop
    // transition and start returns cleanly.
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    if let Err(e) = monitor.start(&request, cancel).await {
        // The failure already reached stderr through the display log.
        tracing::debug!("session failed: {e}");
        std::process::exit(1);
    }

    print_summary(&monitor);
    Ok(())
}

/// Writes display log entries to the terminal: data content to stdout,
/// everything else to stderr tagged with its kind.
struct StdioObserver;

impl StreamObserver for StdioObserver {
    fn on_update(&self, message: &Message) {
        match message.kind {
            MessageKind::Data => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                let _ = writeln!(out, "{}", message.content);
                let _ = out.flush();
            }
            kind => {
                let _ = writeln!(io::stderr(), "[{}] {}", kind.as_str(), message.content);
            }
        }
    }
}

/// Build the stream request: the config file's stock pairs first, then the
/// command-line ones.
fn build_request(cli: &Cli, settings: &config::SettingsFile) -> Result<StreamRequest> {
    let mut request = StreamRequest::new(&cli.url);
    for (name, value) in &settings.request.headers {
        request = request.header(name, value);
    }
    for (key, value) in &settings.request.params {
        request = request.param(key, value);
    }
    for raw in &cli.header {
        let (name, value) = parse_header(raw)?;
        request = request.header(name, value);
    }
    for raw in &cli.param {
        let (key, value) = parse_param(raw)?;
        request = request.param(key, value);
    }
    Ok(request)
}

/// Split a "Name: value" argument into its parts.
fn parse_header(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => anyhow::bail!("invalid header '{raw}', expected 'Name: value'"),
    }
}

/// Split a "key=value" argument into its parts.
fn parse_param(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => anyhow::bail!("invalid parameter '{raw}', expected 'key=value'"),
    }
}

/// Print the end-of-session summary to stderr.
fn print_summary(monitor: &StreamMonitor) {
    let received = monitor.messages_received();
    match monitor.session().start_time {
        Some(start) => {
            let secs = Utc::now().signed_duration_since(start).num_seconds();
            eprintln!("Received {received} messages in {secs}s");
        }
        None => eprintln!("Received {received} messages"),
    }
}
