//! The stream monitor: session state, read loop, and display log.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures_util::StreamExt;
use ndtail_types::connector::Connector;
use ndtail_types::{Message, MessageKind, StreamError, StreamEvent, StreamRequest, StreamSession};
use tokio_util::sync::CancellationToken;

use crate::observer::StreamObserver;

#[derive(Default)]
struct MonitorState {
    session: StreamSession,
    messages: Vec<Message>,
    received: u64,
    /// Token for the active session; taken (and cancelled) by `stop`.
    current: Option<CancellationToken>,
    /// Bumped on every accepted `start`, so a stale loop can tell whether
    /// the active session is still its own.
    generation: u64,
}

/// Monitors one NDJSON stream at a time.
///
/// Owns the session flag, start time, the append-only display log, and the
/// received counter. `Clone` shares the same state, so a host can keep one
/// handle for the read loop and another for issuing `stop`.
#[derive(Clone)]
pub struct StreamMonitor {
    connector: Arc<dyn Connector>,
    observer: Option<Arc<dyn StreamObserver>>,
    state: Arc<Mutex<MonitorState>>,
}

impl StreamMonitor {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            observer: None,
            state: Arc::new(Mutex::new(MonitorState::default())),
        }
    }

    /// Attach a host observer for events and display log updates.
    pub fn with_observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Connect and read the stream until it ends, fails, or is stopped.
    ///
    /// A no-op returning `Ok(())` while a session is already active. The
    /// `cancel` token belongs to the caller; the session watches a child of
    /// it, so cancelling the caller's token ends the session while `stop`
    /// leaves the caller's token untouched. Stopping (either way) is a
    /// normal outcome, not an error.
    pub async fn start(
        &self,
        request: &StreamRequest,
        cancel: CancellationToken,
    ) -> Result<(), StreamError> {
        let (session_token, generation) = {
            let mut state = self.state.lock().unwrap();
            if state.session.is_streaming {
                return Ok(());
            }
            state.session.is_streaming = true;
            state.session.start_time = None;
            state.generation += 1;
            let token = cancel.child_token();
            state.current = Some(token.clone());
            (token, state.generation)
        };

        let url = match self.connector.endpoint(request) {
            Ok(url) => url,
            Err(e) => return self.fail(format!("stream start error: {e}"), e),
        };

        self.add_message(format!("connecting to {url}"), MessageKind::Info);
        tracing::debug!("connecting to {url}");

        let mut stream = match self.connector.connect(request).await {
            Ok(stream) => stream,
            // Request construction happens inside connect; those failures
            // are start errors, not connection errors.
            Err(e @ StreamError::Request(_)) => {
                return self.fail(format!("stream start error: {e}"), e);
            }
            Err(e) => return self.fail(format!("connection error: {e}"), e),
        };

        // A stop issued while the connect was pending wins over this
        // late success; the loop must not resurrect the session.
        if session_token.is_cancelled() {
            self.stop_if_current(generation);
            return Ok(());
        }

        self.state.lock().unwrap().session.start_time = Some(Utc::now());
        self.add_message("stream connected", MessageKind::Info);

        loop {
            tokio::select! {
                _ = session_token.cancelled() => {
                    self.stop_if_current(generation);
                    return Ok(());
                }
                item = stream.next() => {
                    match item {
                        Some(Ok(data)) => {
                            self.add_message(data.to_string(), MessageKind::Data);
                            self.emit(StreamEvent::Data(data));
                        }
                        Some(Err(e)) => {
                            return self.fail(format!("stream error: {e}"), e);
                        }
                        None => {
                            self.add_message("stream ended", MessageKind::Info);
                            self.stop();
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Stop the session: clear the flag, cancel the session token, log
    /// "stream stopped", and emit [`StreamEvent::Disconnected`].
    ///
    /// Idempotent in the sense that stopping twice is harmless; each call
    /// still produces its own log message and disconnect event.
    pub fn stop(&self) {
        let token = {
            let mut state = self.state.lock().unwrap();
            state.session.is_streaming = false;
            state.current.take()
        };
        if let Some(token) = token {
            token.cancel();
        }
        tracing::debug!("session stopped");
        self.add_message("stream stopped", MessageKind::Info);
        self.emit(StreamEvent::Disconnected);
    }

    /// Append a message to the display log and bump the received counter.
    ///
    /// Never fails and never depends on rendering; the on-update observer
    /// is invoked after the append, outside the lock.
    pub fn add_message(&self, content: impl Into<String>, kind: MessageKind) {
        let message = Message::new(content, kind);
        {
            let mut state = self.state.lock().unwrap();
            state.messages.push(message.clone());
            state.received += 1;
        }
        if let Some(observer) = &self.observer {
            observer.on_update(&message);
        }
    }

    /// Whether a session is currently active.
    pub fn is_streaming(&self) -> bool {
        self.state.lock().unwrap().session.is_streaming
    }

    /// Snapshot of the session flag and start time.
    pub fn session(&self) -> StreamSession {
        self.state.lock().unwrap().session
    }

    /// Snapshot of the display log.
    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Total messages appended to the display log, all kinds included.
    pub fn messages_received(&self) -> u64 {
        self.state.lock().unwrap().received
    }

    /// Error protocol shared by every failure path: log the error message,
    /// perform the stop transition, then emit the error event.
    fn fail(&self, text: String, err: StreamError) -> Result<(), StreamError> {
        self.add_message(text.clone(), MessageKind::Error);
        self.stop();
        self.emit(StreamEvent::Error(text));
        Err(err)
    }

    /// Stop, but only if this loop's session is still the active one.
    /// Cancellation can arrive after a stop already ran, or after a newer
    /// session replaced this one; neither may be stopped again.
    fn stop_if_current(&self, generation: u64) {
        let still_current = {
            let state = self.state.lock().unwrap();
            state.session.is_streaming && state.generation == generation
        };
        if still_current {
            self.stop();
        }
    }

    fn emit(&self, event: StreamEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(event);
        }
    }
}
