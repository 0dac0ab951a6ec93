//! cdcctl stream - consume Debezium change events from Kafka.
//!
//! The stream subscribes to one topic, decodes every message into a
//! [`ChangeEvent`](cdcctl_proto::ChangeEvent) and hands it to a sink until a
//! shutdown signal arrives.
//!
//! # Example
//!
//! ```ignore
//! use cdcctl_stream::{consume, StreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         let _ = shutdown_tx.send(());
//!     });
//!
//!     let config = StreamConfig::new("localhost:9092", "pgserver.public.orders");
//!     let summary = consume(config, |event| println!("[{}]", event.operation), shutdown_rx).await?;
//!     println!("delivered {} events", summary.delivered);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod kafka;
pub mod source;
pub mod stream;

pub use config::StreamConfig;
pub use error::Error;
pub use kafka::KafkaSource;
pub use source::{MessageSource, Position, RawMessage, SourceError};
pub use stream::{ChangeEventStream, StreamState, StreamSummary};

use cdcctl_proto::ChangeEvent;
use tokio::sync::broadcast;

/// Subscribe to `config.topic` and feed decoded events to `sink` until
/// `shutdown` fires.
pub async fn consume<F>(
    config: StreamConfig,
    sink: F,
    shutdown: broadcast::Receiver<()>,
) -> Result<StreamSummary, Error>
where
    F: FnMut(ChangeEvent) + Send,
{
    let source = KafkaSource::subscribe(&config)?;
    let mut stream = ChangeEventStream::new(source, config.topic);
    stream.run(sink, shutdown).await
}
