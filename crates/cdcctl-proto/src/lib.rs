//! cdcctl protocol types.
//!
//! This crate holds everything about the CDC connector domain that does not
//! touch the network:
//!
//! - [`table`] - capture intent and source database coordinates
//! - [`config`] - the flat key/value connector configuration
//! - [`builder`] - derivation of a Debezium PostgreSQL configuration
//! - [`status`] - connector status reports
//! - [`event`] - change-event envelope decoding
//! - [`error`] - protocol error types
//!
//! # Example
//!
//! ```
//! use cdcctl_proto::{build_connector_config, DatabaseConnectionSpec, TableCaptureSpec};
//!
//! let db = DatabaseConnectionSpec::new("localhost", 5432, "root", "secret", "db");
//! let tables = [TableCaptureSpec::new("public", "orders", "pgserver")];
//! let config = build_connector_config("orders-connector", &db, &tables, None, None).unwrap();
//!
//! assert_eq!(config.table_include_list(), Some("public.orders"));
//! assert_eq!(config.get("publication.name"), Some("dbz_pub_orders_connector"));
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod status;
pub mod table;

pub use error::Error;

// Re-export commonly used types at crate root
pub use builder::{
    build_connector_config, publication_name, slot_name, ConnectorConfigBuilder,
    DEFAULT_SIGNAL_TABLE,
};
pub use config::{keys, ConnectorConfig, CreateConnectorRequest};
pub use event::{decode_message, ChangeEvent, Operation};
pub use status::{ConnectorState, StatusReport, TaskState};
pub use table::{include_list, DatabaseConnectionSpec, TableCaptureSpec};
