//! Stream error types.

use thiserror::Error;

use crate::source::Position;

/// Stream errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Consumer could not be created or subscribed.
    #[error("kafka error: {0}")]
    Kafka(String),

    /// The broker connection failed in a way the consumer cannot recover
    /// from. `last_position` is the last message fully handed to the sink.
    #[error("transport lost on topic {topic} ({}): {message}", resume_point(.last_position))]
    TransportLost {
        topic: String,
        last_position: Option<Position>,
        message: String,
    },

    /// The stream was driven in the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

fn resume_point(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!("last processed {}", position),
        None => "nothing processed".to_string(),
    }
}
