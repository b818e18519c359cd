//! Live build log streaming.
//!
//! A [`LogStream`] is bound to exactly one (target, build) pair for its
//! lifetime. It owns one underlying SSE channel, decodes each frame into a
//! batch of [`LogEvent`]s with styling codes stripped, and classifies
//! failures: an authorization failure invalidates the stored target, a
//! transport failure leaves it untouched. Retry policy belongs to the
//! caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use contrail_session::{SharedTargetStore, TargetStore};
use contrail_types::{DeserializationError, LogEvent, Target};

use crate::client::ConcourseClient;
use crate::decode::{decode_elements, require_str};
use crate::error::{Error, Result};
use crate::styling::strip_styling;

/// Frame batches buffered before the reader task backpressures.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Why a log stream failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFailure {
    /// The token was rejected; the stored target has been invalidated and
    /// the caller must route back to the entry flow.
    Unauthorized,
    /// Transport-level failure or a malformed frame. The target is intact;
    /// no automatic retry is performed.
    Transport,
}

/// Lifecycle of a log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStreamState {
    /// Constructed, no network activity yet.
    Idle,
    /// Opening the channel.
    Connecting,
    /// Receiving frames.
    Streaming,
    /// Normal end of stream.
    Closed,
    /// Classified failure; terminal.
    Failed(StreamFailure),
}

/// Receiving half of a log stream.
///
/// Yields one batch per SSE frame. Once cancellation has been requested
/// via [`LogStream::stop`] (or the stream was dropped), `recv` returns
/// `None` even for batches that were already buffered in flight.
pub struct LogEvents {
    rx: mpsc::Receiver<Vec<LogEvent>>,
    cancelled: Arc<AtomicBool>,
}

impl LogEvents {
    /// Receive the next batch, or `None` once the stream has ended or
    /// been cancelled.
    pub async fn recv(&mut self) -> Option<Vec<LogEvent>> {
        if self.cancelled.load(Ordering::Acquire) {
            self.rx.close();
            return None;
        }

        let batch = self.rx.recv().await?;

        // Cancellation may have raced the receive; in-flight batches are
        // dropped, not delivered.
        if self.cancelled.load(Ordering::Acquire) {
            self.rx.close();
            return None;
        }

        Some(batch)
    }
}

/// A live log stream for one build.
pub struct LogStream {
    client: ConcourseClient,
    target: Target,
    build_id: i64,
    store: SharedTargetStore,
    state: watch::Sender<LogStreamState>,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl LogStream {
    /// Bind a stream to a (target, build) pair. No network activity until
    /// [`start`](Self::start).
    pub fn new(
        client: ConcourseClient,
        target: Target,
        build_id: i64,
        store: SharedTargetStore,
    ) -> Self {
        let (state, _) = watch::channel(LogStreamState::Idle);
        Self {
            client,
            target,
            build_id,
            store,
            state,
            cancelled: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> LogStreamState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<LogStreamState> {
        self.state.subscribe()
    }

    /// Open the channel and start delivering frame batches.
    ///
    /// Valid only from `Idle`; calling it again in any other state is a
    /// programming error and returns [`Error::AlreadyStarted`]. The
    /// returned receiver yields one batch per SSE frame, styling already
    /// stripped.
    pub fn start(&mut self) -> Result<LogEvents> {
        if self.state() != LogStreamState::Idle {
            return Err(Error::AlreadyStarted);
        }

        self.state.send_replace(LogStreamState::Connecting);

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let client = self.client.clone();
        let target = self.target.clone();
        let build_id = self.build_id;
        let store = self.store.clone();
        let state = self.state.clone();

        self.task = Some(tokio::spawn(async move {
            run_stream(client, target, build_id, store, state, tx).await;
        }));

        Ok(LogEvents {
            rx,
            cancelled: self.cancelled.clone(),
        })
    }

    /// Cancel the stream. The underlying channel is released promptly and
    /// no further frames are delivered, even ones already buffered in
    /// flight.
    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let stopped = matches!(
            self.state(),
            LogStreamState::Connecting | LogStreamState::Streaming
        );
        if stopped {
            self.state.send_replace(LogStreamState::Closed);
            tracing::debug!(build_id = self.build_id, "Log stream stopped");
        }
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Reader task: connect, decode frames, classify the outcome.
async fn run_stream(
    client: ConcourseClient,
    target: Target,
    build_id: i64,
    store: SharedTargetStore,
    state: watch::Sender<LogStreamState>,
    tx: mpsc::Sender<Vec<LogEvent>>,
) {
    let path = format!("builds/{}/events", build_id);

    let response = match client.get_event_stream(&path, &target.token).await {
        Ok(response) => response,
        Err(err) if err.is_unauthorized() => {
            tracing::warn!(build_id, "Log stream rejected: token no longer valid");
            invalidate_target(&store).await;
            state.send_replace(LogStreamState::Failed(StreamFailure::Unauthorized));
            return;
        }
        Err(err) => {
            tracing::warn!(build_id, error = %err, "Log stream connection failed");
            state.send_replace(LogStreamState::Failed(StreamFailure::Transport));
            return;
        }
    };

    state.send_replace(LogStreamState::Streaming);
    tracing::debug!(build_id, "Log stream open");

    let mut frames = response.bytes_stream().eventsource();

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(event) => {
                // The server marks normal completion with an `end` event
                // once the build reaches a terminal status.
                if event.event == "end" {
                    state.send_replace(LogStreamState::Closed);
                    return;
                }

                if event.data.is_empty() {
                    continue;
                }

                match decode_frame(&event.data) {
                    Ok(batch) => {
                        if batch.is_empty() {
                            continue;
                        }
                        if tx.send(batch).await.is_err() {
                            // Receiver gone; nobody is listening.
                            state.send_replace(LogStreamState::Closed);
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(build_id, error = %err, "Malformed log frame");
                        state.send_replace(LogStreamState::Failed(StreamFailure::Transport));
                        return;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(build_id, error = %err, "Log stream transport error");
                state.send_replace(LogStreamState::Failed(StreamFailure::Transport));
                return;
            }
        }
    }

    // Server closed the channel.
    state.send_replace(LogStreamState::Closed);
    tracing::debug!(build_id, "Log stream closed by server");
}

/// Delete the stored target after an authorization failure. A concurrent
/// logout may already have emptied the store; both paths converge on
/// "no target".
async fn invalidate_target(store: &SharedTargetStore) {
    if let Err(err) = store.delete().await {
        tracing::warn!(error = %err, "Failed to invalidate stored target");
    }
}

/// Decode one SSE frame's data into a batch of styled-stripped log events.
///
/// The frame payload is a JSON array of log records; a malformed container
/// is a transport-class failure, malformed individual records are dropped
/// like any other list payload.
fn decode_frame(data: &str) -> std::result::Result<Vec<LogEvent>, DeserializationError> {
    let events = decode_elements(data.as_bytes(), parse_log_record)?;
    Ok(events
        .map(|event| LogEvent::new(strip_styling(&event.payload)))
        .collect())
}

/// Parse one log record.
fn parse_log_record(record: &Value) -> std::result::Result<LogEvent, DeserializationError> {
    Ok(LogEvent::new(require_str(record, "payload")?))
}
