//! The change-event consumer loop.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use cdcctl_proto::{decode_message, ChangeEvent};

use crate::error::Error;
use crate::source::{MessageSource, Position, RawMessage, SourceError};

/// Lifecycle of a [`ChangeEventStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// `run` has not been called.
    NotStarted,
    /// Receiving messages.
    Running,
    /// Stopped on shutdown or source exhaustion.
    Stopped,
    /// Stopped on an unrecoverable transport error.
    Failed,
}

/// Counters for one run of the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Events handed to the sink.
    pub delivered: u64,
    /// Tombstones skipped.
    pub skipped: u64,
    /// Messages that failed to decode and were skipped.
    pub decode_failures: u64,
    /// Last message fully processed.
    pub last_position: Option<Position>,
}

/// Decodes messages from a [`MessageSource`] and hands them to a sink.
///
/// Each message is decoded on its own: a tombstone or a malformed body is
/// skipped without affecting the rest of the stream. A message's offset is
/// committed only after the sink has returned.
pub struct ChangeEventStream<S> {
    source: S,
    topic: String,
    state: StreamState,
    summary: StreamSummary,
}

impl<S: MessageSource> ChangeEventStream<S> {
    /// Wrap a source. `topic` is used for logging and error context.
    pub fn new(source: S, topic: impl Into<String>) -> Self {
        Self {
            source,
            topic: topic.into(),
            state: StreamState::NotStarted,
            summary: StreamSummary::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Counters so far.
    pub fn summary(&self) -> &StreamSummary {
        &self.summary
    }

    /// Run until `shutdown` fires, the source is exhausted, or the source
    /// fails unrecoverably.
    ///
    /// A closed or lagged shutdown channel counts as a shutdown signal.
    pub async fn run<F>(
        &mut self,
        mut sink: F,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<StreamSummary, Error>
    where
        F: FnMut(ChangeEvent) + Send,
    {
        if self.state != StreamState::NotStarted {
            return Err(Error::InvalidState(format!(
                "stream on {} already {:?}",
                self.topic, self.state
            )));
        }
        self.state = StreamState::Running;
        info!(topic = %self.topic, "change-event stream running");

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!(topic = %self.topic, "shutdown requested");
                    break Ok(());
                }
                next = self.source.next_message() => next,
            };

            match next {
                Ok(Some(message)) => {
                    self.process(&message, &mut sink);
                    if let Err(e) = self.source.commit(&message.position).await {
                        // Uncommitted messages are redelivered after a restart.
                        warn!(position = %message.position, error = %e, "offset commit failed");
                    }
                    self.summary.last_position = Some(message.position);
                }
                Ok(None) => {
                    debug!(topic = %self.topic, "source exhausted");
                    break Ok(());
                }
                Err(SourceError::Recoverable(message)) => {
                    warn!(topic = %self.topic, error = %message, "broker error, continuing");
                }
                Err(SourceError::Fatal(message)) => {
                    break Err(Error::TransportLost {
                        topic: self.topic.clone(),
                        last_position: self.summary.last_position.clone(),
                        message,
                    });
                }
            }
        };

        if let Err(e) = self.source.flush().await {
            // Messages after the last durable commit are redelivered after a restart.
            warn!(topic = %self.topic, error = %e, "failed to commit final offsets");
        }
        self.source.close().await;

        match outcome {
            Ok(()) => {
                self.state = StreamState::Stopped;
                info!(
                    topic = %self.topic,
                    delivered = self.summary.delivered,
                    skipped = self.summary.skipped,
                    decode_failures = self.summary.decode_failures,
                    "change-event stream stopped"
                );
                Ok(self.summary.clone())
            }
            Err(e) => {
                self.state = StreamState::Failed;
                warn!(topic = %self.topic, error = %e, "change-event stream failed");
                Err(e)
            }
        }
    }

    fn process<F>(&mut self, message: &RawMessage, sink: &mut F)
    where
        F: FnMut(ChangeEvent),
    {
        match decode_message(message.payload.as_deref()) {
            Ok(Some(event)) => {
                let key = message.key.as_deref().map(String::from_utf8_lossy);
                debug!(position = %message.position, key = ?key, op = %event.operation, "event decoded");
                sink(event);
                self.summary.delivered += 1;
            }
            Ok(None) => {
                debug!(position = %message.position, "tombstone skipped");
                self.summary.skipped += 1;
            }
            Err(e) => {
                warn!(position = %message.position, error = %e, "skipping undecodable message");
                self.summary.decode_failures += 1;
            }
        }
    }
}
