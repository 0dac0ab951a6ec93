//! Message sources feeding the change-event stream.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Location of a message within a topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl Position {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]@{}", self.topic, self.partition, self.offset)
    }
}

/// One undecoded broker message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub position: Position,
    pub key: Option<Vec<u8>>,
    /// `None` for tombstones.
    pub payload: Option<Vec<u8>>,
}

/// Errors reported by a [`MessageSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transient; the stream logs it and keeps receiving.
    #[error("recoverable: {0}")]
    Recoverable(String),

    /// The source cannot continue.
    #[error("fatal: {0}")]
    Fatal(String),
}

/// A subscription that yields raw messages in order.
///
/// `next_message` must be cancel safe: if the returned future is dropped
/// before completing, no message may be lost.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message. `Ok(None)` means the source is exhausted.
    async fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError>;

    /// Record that the message at `position` has been fully processed.
    async fn commit(&mut self, position: &Position) -> Result<(), SourceError>;

    /// Make every earlier commit durable. Called once before [`close`].
    ///
    /// [`close`]: MessageSource::close
    async fn flush(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Release the subscription.
    async fn close(&mut self);
}
