//! cdcctl client - manage Debezium connectors through the Kafka Connect REST API.
//!
//! # Quick Start
//!
//! ```ignore
//! use cdcctl_client::{Client, ClientConfig};
//! use cdcctl_proto::TableCaptureSpec;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("http://localhost:8083"))?;
//!
//!     for name in client.list_connectors().await? {
//!         let status = client.get_connector_status(&name).await?;
//!         println!("{} {}", name, status.connector.state);
//!     }
//!
//!     // Swap the captured tables of a running connector
//!     let tables = [TableCaptureSpec::new("public", "returns", "pgserver")];
//!     client.update_tables("orders-connector", &tables).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{Client, ServiceResponse};
pub use config::ClientConfig;
pub use error::Error;

/// Re-export protocol types.
pub use cdcctl_proto as proto;
