//! cdcctl command-line client
//!
//! Create and manage Debezium connectors on Kafka Connect, generate test
//! traffic, and print the resulting change events.

mod commands;
mod traffic;

use std::fmt;
use std::time::Duration;

use clap::{Parser, Subcommand};

use cdcctl_proto::{DatabaseConnectionSpec, DEFAULT_SIGNAL_TABLE};
use cdcctl_stream::config::{DEFAULT_BROKERS, DEFAULT_GROUP_ID};

/// cdcctl command-line client
#[derive(Parser, Debug)]
#[command(name = "cdcctl")]
#[command(version, about = "Manage Debezium CDC connectors and watch their change events")]
pub struct Args {
    /// Kafka Connect REST endpoint
    #[arg(long, env = "CDCCTL_CONNECT_URL", default_value = "http://localhost:8083", global = true)]
    pub connect_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,

    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Source database coordinates.
#[derive(clap::Args, Clone)]
pub struct DatabaseArgs {
    /// Database host
    #[arg(long, env = "CDCCTL_DB_HOST", default_value = "localhost", global = true)]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "CDCCTL_DB_PORT", default_value_t = 5432, global = true)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "CDCCTL_DB_USER", default_value = "root", global = true)]
    pub db_user: String,

    /// Database password
    #[arg(
        long,
        env = "CDCCTL_DB_PASSWORD",
        default_value = "Pa55w.rd",
        hide_default_value = true,
        hide_env_values = true,
        global = true
    )]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "CDCCTL_DB_NAME", default_value = "db", global = true)]
    pub db_name: String,
}

impl fmt::Debug for DatabaseArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseArgs")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_name", &self.db_name)
            .finish()
    }
}

impl From<&DatabaseArgs> for DatabaseConnectionSpec {
    fn from(args: &DatabaseArgs) -> Self {
        DatabaseConnectionSpec::new(
            &args.db_host,
            args.db_port,
            &args.db_user,
            &args.db_password,
            &args.db_name,
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a Debezium PostgreSQL connector
    CreateConnector {
        /// Connector name
        #[arg(long, default_value = "postgres-connector")]
        name: String,

        /// Table to capture as schema.table (repeatable)
        #[arg(long = "table", default_value = "public.orders")]
        tables: Vec<String>,

        /// Topic prefix for change events
        #[arg(long, default_value = "pgserver")]
        topic_prefix: String,

        /// Replication slot (derived from the name when omitted)
        #[arg(long)]
        slot_name: Option<String>,

        /// Signal table for ad-hoc snapshots
        #[arg(long, default_value = DEFAULT_SIGNAL_TABLE)]
        signal_table: String,
    },

    /// List connectors
    GetConnectors,

    /// Replace the captured tables of a connector
    UpdateTables {
        /// Connector name
        name: String,

        /// Table to capture as schema.table (repeatable)
        #[arg(long = "table", required = true)]
        tables: Vec<String>,

        /// Topic prefix for change events
        #[arg(long, default_value = "pgserver")]
        topic_prefix: String,
    },

    /// Show connector and task status
    Status {
        /// Connector name
        name: String,
    },

    /// Delete a connector
    Delete {
        /// Connector name
        name: String,
    },

    /// Restart a connector
    Restart {
        /// Connector name
        name: String,

        /// Restart the connector's tasks as well
        #[arg(long)]
        include_tasks: bool,
    },

    /// Create the orders table in the source database
    CreateTable,

    /// Insert a random order into the orders table
    InsertData,

    /// Print change events from a topic until interrupted
    RunConsumer {
        /// Kafka bootstrap servers
        #[arg(long, env = "CDCCTL_BROKERS", default_value = DEFAULT_BROKERS)]
        brokers: String,

        /// Topic to subscribe to
        #[arg(long, default_value = "pgserver.public.orders")]
        topic: String,

        /// Consumer group
        #[arg(long, default_value = DEFAULT_GROUP_ID)]
        group_id: String,
    },
}

impl Args {
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdcctl=info,cdcctl_client=info,cdcctl_stream=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = commands::run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
