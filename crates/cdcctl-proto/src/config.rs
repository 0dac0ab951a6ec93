//! Connector configuration as understood by the orchestration service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{include_list, TableCaptureSpec};

/// Configuration keys written by the builder.
pub mod keys {
    pub const CONNECTOR_CLASS: &str = "connector.class";
    pub const TASKS_MAX: &str = "tasks.max";
    pub const DATABASE_HOSTNAME: &str = "database.hostname";
    pub const DATABASE_PORT: &str = "database.port";
    pub const DATABASE_USER: &str = "database.user";
    pub const DATABASE_PASSWORD: &str = "database.password";
    pub const DATABASE_DBNAME: &str = "database.dbname";
    pub const TABLE_INCLUDE_LIST: &str = "table.include.list";
    pub const TOPIC_PREFIX: &str = "topic.prefix";
    pub const PLUGIN_NAME: &str = "plugin.name";
    pub const SLOT_NAME: &str = "slot.name";
    pub const PUBLICATION_NAME: &str = "publication.name";
    pub const SIGNAL_DATA_COLLECTION: &str = "signal.data.collection";
    pub const SIGNAL_ENABLED_CHANNELS: &str = "signal.enabled.channels";
}

/// Flat string-to-string connector configuration.
///
/// Keys are kept sorted so that serializing the same configuration always
/// produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorConfig {
    entries: BTreeMap<String, String>,
}

impl ConnectorConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the configuration has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The current table inclusion list, if set.
    pub fn table_include_list(&self) -> Option<&str> {
        self.get(keys::TABLE_INCLUDE_LIST)
    }

    /// Replace the table inclusion list, leaving every other key untouched.
    pub fn set_tables(&mut self, tables: &[TableCaptureSpec]) {
        self.insert(keys::TABLE_INCLUDE_LIST, include_list(tables));
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl From<BTreeMap<String, String>> for ConnectorConfig {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for ConnectorConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Body of a create request: `{"name": ..., "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConnectorRequest {
    pub name: String,
    pub config: ConnectorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tables_only_touches_include_list() {
        let mut config: ConnectorConfig = [
            ("tasks.max".to_string(), "1".to_string()),
            ("custom.key".to_string(), "kept".to_string()),
            (keys::TABLE_INCLUDE_LIST.to_string(), "public.orders".to_string()),
        ]
        .into_iter()
        .collect();

        config.set_tables(&[TableCaptureSpec::new("public", "returns", "pgserver")]);

        assert_eq!(config.len(), 3);
        assert_eq!(config.table_include_list(), Some("public.returns"));
        assert_eq!(config.get("tasks.max"), Some("1"));
        assert_eq!(config.get("custom.key"), Some("kept"));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut config = ConnectorConfig::new();
        config.insert("b", "2");
        config.insert("a", "1");

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);

        let parsed: ConnectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_non_string_values() {
        let result = serde_json::from_str::<ConnectorConfig>(r#"{"tasks.max": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_shape() {
        let mut config = ConnectorConfig::new();
        config.insert("tasks.max", "1");
        let request = CreateConnectorRequest {
            name: "orders-connector".into(),
            config,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "orders-connector");
        assert_eq!(value["config"]["tasks.max"], "1");
    }
}
