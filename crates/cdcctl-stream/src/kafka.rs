//! Kafka-backed message source.
//!
//! [`KafkaSource`] wraps rdkafka's `StreamConsumer`. Messages are copied out
//! of the consumer's buffer so they can outlive the receive call, and offsets
//! are committed explicitly per message. Per-message commits are async; the
//! latest offset of every partition is committed synchronously on flush.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::{Offset, TopicPartitionList};
use tracing::{debug, info};

use crate::config::StreamConfig;
use crate::error::Error;
use crate::source::{MessageSource, Position, RawMessage, SourceError};

/// Kafka subscription to a single topic.
pub struct KafkaSource {
    consumer: StreamConsumer,
    topic: String,
    /// Next offset to read, per partition, as last committed.
    committed: BTreeMap<i32, i64>,
}

impl KafkaSource {
    /// Create a consumer and subscribe it to `config.topic`.
    pub fn subscribe(config: &StreamConfig) -> Result<Self, Error> {
        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            auto_offset_reset = %config.auto_offset_reset,
            "subscribing to change-event topic"
        );

        let consumer: StreamConsumer = config
            .to_client_config()
            .create()
            .map_err(|e| Error::Kafka(format!("failed to create consumer: {}", e)))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| Error::Kafka(format!("failed to subscribe to {}: {}", config.topic, e)))?;

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
            committed: BTreeMap::new(),
        })
    }

    fn committed_offsets(&self) -> Result<TopicPartitionList, KafkaError> {
        let mut tpl = TopicPartitionList::new();
        for (&partition, &offset) in &self.committed {
            tpl.add_partition_offset(&self.topic, partition, Offset::Offset(offset))?;
        }
        Ok(tpl)
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError> {
        // StreamConsumer::recv is cancel safe.
        match self.consumer.recv().await {
            Ok(msg) => Ok(Some(RawMessage {
                position: Position::new(msg.topic(), msg.partition(), msg.offset()),
                key: msg.key().map(<[u8]>::to_vec),
                payload: msg.payload().map(<[u8]>::to_vec),
            })),
            Err(e) => Err(classify(e)),
        }
    }

    async fn commit(&mut self, position: &Position) -> Result<(), SourceError> {
        // The committed offset is the next one to read.
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &position.topic,
            position.partition,
            Offset::Offset(position.offset + 1),
        )
        .map_err(|e| SourceError::Recoverable(e.to_string()))?;

        self.committed.insert(position.partition, position.offset + 1);
        self.consumer
            .commit(&tpl, CommitMode::Async)
            .map_err(|e| SourceError::Recoverable(format!("commit failed: {}", e)))
    }

    async fn flush(&mut self) -> Result<(), SourceError> {
        if self.committed.is_empty() {
            return Ok(());
        }
        debug!(topic = %self.topic, partitions = self.committed.len(), "final offset commit");

        let tpl = self
            .committed_offsets()
            .map_err(|e| SourceError::Recoverable(e.to_string()))?;
        // Waits for the broker's acknowledgement.
        self.consumer
            .commit(&tpl, CommitMode::Sync)
            .map_err(|e| SourceError::Recoverable(format!("final commit failed: {}", e)))
    }

    async fn close(&mut self) {
        debug!(topic = %self.topic, "unsubscribing");
        self.consumer.unsubscribe();
    }
}

/// Split broker errors into ones librdkafka retries internally and ones
/// that end the subscription.
pub(crate) fn classify(err: KafkaError) -> SourceError {
    let fatal = matches!(
        err.rdkafka_error_code(),
        Some(
            RDKafkaErrorCode::Fatal
                | RDKafkaErrorCode::TopicAuthorizationFailed
                | RDKafkaErrorCode::GroupAuthorizationFailed
                | RDKafkaErrorCode::SaslAuthenticationFailed
        )
    );

    if fatal {
        SourceError::Fatal(err.to_string())
    } else {
        SourceError::Recoverable(err.to_string())
    }
}
