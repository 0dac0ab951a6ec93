//! Consumer configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use rdkafka::ClientConfig;

/// Default broker address.
pub const DEFAULT_BROKERS: &str = "localhost:9092";

/// Default consumer group.
pub const DEFAULT_GROUP_ID: &str = "cdcctl-consumer";

/// Default session timeout.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Change-event consumer configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Bootstrap servers (`host:port[,host:port]`).
    pub brokers: String,

    /// Topic to subscribe to, usually `{prefix}.{schema}.{table}`.
    pub topic: String,

    /// Consumer group. A group with no committed offsets starts from the
    /// earliest retained message, so it sees the initial snapshot.
    pub group_id: String,

    /// Where to start when the group has no committed offset.
    pub auto_offset_reset: String,

    /// Group session timeout.
    pub session_timeout: Duration,

    /// Extra librdkafka properties, applied last.
    pub properties: BTreeMap<String, String>,
}

impl StreamConfig {
    /// Create a configuration for one topic.
    pub fn new(brokers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topic: topic.into(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            properties: BTreeMap::new(),
        }
    }

    /// Set the consumer group.
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    /// Set the offset reset policy.
    pub fn with_auto_offset_reset(mut self, policy: impl Into<String>) -> Self {
        self.auto_offset_reset = policy.into();
        self
    }

    /// Set the session timeout.
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Add a raw librdkafka property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Convert to an rdkafka client configuration.
    ///
    /// Auto-commit is off: offsets are committed by the stream after each
    /// message has been handed to the sink.
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .set(
                "session.timeout.ms",
                self.session_timeout.as_millis().to_string(),
            );

        for (key, value) in &self.properties {
            config.set(key, value);
        }
        config
    }
}
