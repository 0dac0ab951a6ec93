//! Capture intent and source database coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One table to capture and the topic namespace its events publish under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableCaptureSpec {
    /// Schema the table lives in (e.g. `public`).
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Topic prefix the connector publishes under.
    pub topic_prefix: String,
}

impl TableCaptureSpec {
    /// Create a new capture spec.
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        topic_prefix: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            topic_prefix: topic_prefix.into(),
        }
    }

    /// Parse a `schema.table` pair.
    ///
    /// The split happens on the first dot, so `public.my.table` yields schema
    /// `public` and table `my.table`.
    pub fn parse_qualified(qualified: &str, topic_prefix: impl Into<String>) -> Result<Self, Error> {
        match qualified.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                Ok(Self::new(schema, table, topic_prefix))
            }
            _ => Err(Error::InvalidArgument(format!(
                "expected schema.table, got '{}'",
                qualified
            ))),
        }
    }

    /// The `schema.table` form used by the include list.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Topic the connector publishes this table's events to.
    pub fn topic(&self) -> String {
        format!("{}.{}.{}", self.topic_prefix, self.schema, self.table)
    }
}

impl fmt::Display for TableCaptureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Comma-join the qualified names of `tables`, preserving order.
pub fn include_list(tables: &[TableCaptureSpec]) -> String {
    tables
        .iter()
        .map(TableCaptureSpec::qualified_name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Location and credentials of the source database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConnectionSpec {
    /// Database server hostname.
    pub host: String,
    /// Database server port.
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub database_name: String,
}

impl DatabaseConnectionSpec {
    /// Create a new connection spec.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database_name: database_name.into(),
        }
    }
}

impl fmt::Debug for DatabaseConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConnectionSpec")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database_name", &self.database_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_and_topic() {
        let spec = TableCaptureSpec::new("public", "orders", "pgserver");
        assert_eq!(spec.qualified_name(), "public.orders");
        assert_eq!(spec.topic(), "pgserver.public.orders");
        assert_eq!(spec.to_string(), "public.orders");
    }

    #[test]
    fn test_parse_qualified() {
        let spec = TableCaptureSpec::parse_qualified("inventory.items", "pg").unwrap();
        assert_eq!(spec, TableCaptureSpec::new("inventory", "items", "pg"));

        let dotted = TableCaptureSpec::parse_qualified("public.my.table", "pg").unwrap();
        assert_eq!(dotted.schema, "public");
        assert_eq!(dotted.table, "my.table");
    }

    #[test]
    fn test_parse_qualified_rejects_bare_names() {
        for input in ["orders", ".orders", "public.", ""] {
            let err = TableCaptureSpec::parse_qualified(input, "pg").unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_include_list_preserves_order() {
        let tables = vec![
            TableCaptureSpec::new("public", "orders", "pgserver"),
            TableCaptureSpec::new("public", "items", "pgserver"),
        ];
        assert_eq!(include_list(&tables), "public.orders,public.items");
        assert_eq!(include_list(&[]), "");
    }

    #[test]
    fn test_debug_redacts_password() {
        let db = DatabaseConnectionSpec::new("localhost", 5432, "root", "Pa55w.rd", "db");
        let rendered = format!("{:?}", db);
        assert!(!rendered.contains("Pa55w.rd"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("localhost"));
    }
}
