//! Derive Debezium PostgreSQL connector configuration from capture intent.

use crate::config::{keys, ConnectorConfig};
use crate::error::Error;
use crate::table::{include_list, DatabaseConnectionSpec, TableCaptureSpec};

/// Connector class for the Debezium PostgreSQL source.
pub const POSTGRES_CONNECTOR_CLASS: &str = "io.debezium.connector.postgresql.PostgresConnector";

/// Logical decoding plugin shipped with PostgreSQL 10+.
pub const DEFAULT_PLUGIN_NAME: &str = "pgoutput";

/// Default table used for source-channel signals (ad-hoc snapshots).
pub const DEFAULT_SIGNAL_TABLE: &str = "public.debezium_signal";

/// Default task parallelism. The PostgreSQL connector only ever runs one task.
pub const DEFAULT_TASKS_MAX: u32 = 1;

/// Replication slot name derived from a connector name.
///
/// ```
/// assert_eq!(cdcctl_proto::slot_name("orders-connector"), "dbz_orders_connector_slot");
/// ```
pub fn slot_name(connector_name: &str) -> String {
    format!("dbz_{}_slot", identifier_stem(connector_name))
}

/// Publication name derived from a connector name.
///
/// ```
/// assert_eq!(cdcctl_proto::publication_name("orders-connector"), "dbz_pub_orders_connector");
/// ```
pub fn publication_name(connector_name: &str) -> String {
    format!("dbz_pub_{}", identifier_stem(connector_name))
}

// Hyphens are not valid in unquoted PostgreSQL identifiers. Nothing else is
// rewritten.
fn identifier_stem(connector_name: &str) -> String {
    connector_name.replace('-', "_")
}

/// Builder for a [`ConnectorConfig`].
///
/// # Example
///
/// ```
/// use cdcctl_proto::{ConnectorConfigBuilder, DatabaseConnectionSpec, TableCaptureSpec};
///
/// let db = DatabaseConnectionSpec::new("localhost", 5432, "root", "secret", "db");
/// let config = ConnectorConfigBuilder::new("orders-connector", db)
///     .with_table(TableCaptureSpec::new("public", "orders", "pgserver"))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.get("slot.name"), Some("dbz_orders_connector_slot"));
/// ```
#[derive(Debug, Clone)]
pub struct ConnectorConfigBuilder {
    name: String,
    database: DatabaseConnectionSpec,
    tables: Vec<TableCaptureSpec>,
    slot_name: Option<String>,
    signal_table: String,
}

impl ConnectorConfigBuilder {
    /// Start a builder for the named connector.
    pub fn new(name: impl Into<String>, database: DatabaseConnectionSpec) -> Self {
        Self {
            name: name.into(),
            database,
            tables: Vec::new(),
            slot_name: None,
            signal_table: DEFAULT_SIGNAL_TABLE.to_string(),
        }
    }

    /// Append one table to capture.
    pub fn with_table(mut self, table: TableCaptureSpec) -> Self {
        self.tables.push(table);
        self
    }

    /// Append several tables to capture, in order.
    pub fn with_tables(mut self, tables: impl IntoIterator<Item = TableCaptureSpec>) -> Self {
        self.tables.extend(tables);
        self
    }

    /// Use an explicit replication slot instead of the derived one. An empty
    /// name counts as none.
    pub fn with_slot_name(mut self, slot_name: Option<String>) -> Self {
        self.slot_name = slot_name;
        self
    }

    /// Set the signal table (`schema.table`).
    pub fn with_signal_table(mut self, signal_table: impl Into<String>) -> Self {
        self.signal_table = signal_table.into();
        self
    }

    /// Produce the configuration.
    pub fn build(&self) -> Result<ConnectorConfig, Error> {
        if self.name.is_empty() {
            return Err(Error::InvalidArgument(
                "connector name must not be empty".to_string(),
            ));
        }
        let first = self.tables.first().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "connector '{}' needs at least one table to capture",
                self.name
            ))
        })?;

        let slot = self
            .slot_name
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slot_name(&self.name));

        let mut config = ConnectorConfig::new();
        config.insert(keys::CONNECTOR_CLASS, POSTGRES_CONNECTOR_CLASS);
        config.insert(keys::TASKS_MAX, DEFAULT_TASKS_MAX.to_string());

        config.insert(keys::DATABASE_HOSTNAME, self.database.host.as_str());
        config.insert(keys::DATABASE_PORT, self.database.port.to_string());
        config.insert(keys::DATABASE_USER, self.database.user.as_str());
        config.insert(keys::DATABASE_PASSWORD, self.database.password.as_str());
        config.insert(keys::DATABASE_DBNAME, self.database.database_name.as_str());

        config.insert(keys::TABLE_INCLUDE_LIST, include_list(&self.tables));
        // All tables share the first table's prefix.
        config.insert(keys::TOPIC_PREFIX, first.topic_prefix.as_str());
        config.insert(keys::PLUGIN_NAME, DEFAULT_PLUGIN_NAME);
        config.insert(keys::SLOT_NAME, slot);
        config.insert(keys::PUBLICATION_NAME, publication_name(&self.name));
        config.insert(keys::SIGNAL_DATA_COLLECTION, self.signal_table.as_str());
        config.insert(keys::SIGNAL_ENABLED_CHANNELS, "source");

        Ok(config)
    }
}

/// Build a connector configuration in one call.
pub fn build_connector_config(
    name: &str,
    database: &DatabaseConnectionSpec,
    tables: &[TableCaptureSpec],
    slot_name: Option<&str>,
    signal_table: Option<&str>,
) -> Result<ConnectorConfig, Error> {
    ConnectorConfigBuilder::new(name, database.clone())
        .with_tables(tables.iter().cloned())
        .with_slot_name(slot_name.map(str::to_string))
        .with_signal_table(signal_table.unwrap_or(DEFAULT_SIGNAL_TABLE))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_db() -> DatabaseConnectionSpec {
        DatabaseConnectionSpec::new("localhost", 5432, "root", "Pa55w.rd", "db")
    }

    fn orders() -> TableCaptureSpec {
        TableCaptureSpec::new("public", "orders", "pgserver")
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(slot_name("orders-connector"), "dbz_orders_connector_slot");
        assert_eq!(publication_name("orders-connector"), "dbz_pub_orders_connector");
        assert_eq!(slot_name("a-b-c"), "dbz_a_b_c_slot");
        assert_eq!(publication_name("plain"), "dbz_pub_plain");
        // Only hyphens are rewritten.
        assert_eq!(slot_name("Orders.v2"), "dbz_Orders.v2_slot");
    }

    #[test]
    fn test_orders_connector_config() {
        let config = build_connector_config("orders-connector", &test_db(), &[orders()], None, None)
            .unwrap();

        let expected: ConnectorConfig = [
            ("connector.class", POSTGRES_CONNECTOR_CLASS),
            ("tasks.max", "1"),
            ("database.hostname", "localhost"),
            ("database.port", "5432"),
            ("database.user", "root"),
            ("database.password", "Pa55w.rd"),
            ("database.dbname", "db"),
            ("table.include.list", "public.orders"),
            ("topic.prefix", "pgserver"),
            ("plugin.name", "pgoutput"),
            ("slot.name", "dbz_orders_connector_slot"),
            ("publication.name", "dbz_pub_orders_connector"),
            ("signal.data.collection", "public.debezium_signal"),
            ("signal.enabled.channels", "source"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(config, expected);
    }

    #[test]
    fn test_include_list_follows_input_order() {
        let tables = [
            orders(),
            TableCaptureSpec::new("public", "items", "pgserver"),
        ];
        let config = build_connector_config("shop", &test_db(), &tables, None, None).unwrap();
        assert_eq!(config.table_include_list(), Some("public.orders,public.items"));
    }

    #[test]
    fn test_topic_prefix_comes_from_first_table() {
        let tables = [
            TableCaptureSpec::new("public", "orders", "first"),
            TableCaptureSpec::new("public", "items", "second"),
        ];
        let config = build_connector_config("shop", &test_db(), &tables, None, None).unwrap();
        assert_eq!(config.get(keys::TOPIC_PREFIX), Some("first"));
    }

    #[test]
    fn test_explicit_slot_and_signal_table() {
        let config = build_connector_config(
            "orders-connector",
            &test_db(),
            &[orders()],
            Some("custom_slot"),
            Some("ops.signals"),
        )
        .unwrap();

        assert_eq!(config.get(keys::SLOT_NAME), Some("custom_slot"));
        assert_eq!(config.get(keys::PUBLICATION_NAME), Some("dbz_pub_orders_connector"));
        assert_eq!(config.get(keys::SIGNAL_DATA_COLLECTION), Some("ops.signals"));
    }

    #[test]
    fn test_empty_slot_name_falls_back_to_derived() {
        let config = build_connector_config(
            "orders-connector",
            &test_db(),
            &[orders()],
            Some(""),
            None,
        )
        .unwrap();

        assert_eq!(config.get(keys::SLOT_NAME), Some("dbz_orders_connector_slot"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let tables = [orders(), TableCaptureSpec::new("public", "items", "pgserver")];
        let first = build_connector_config("orders-connector", &test_db(), &tables, None, None)
            .unwrap();
        let second = build_connector_config("orders-connector", &test_db(), &tables, None, None)
            .unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_tables_rejected() {
        let err = build_connector_config("orders-connector", &test_db(), &[], None, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ConnectorConfigBuilder::new("", test_db())
            .with_table(orders())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
