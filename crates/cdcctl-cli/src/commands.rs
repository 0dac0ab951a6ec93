//! Command execution.

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::info;

use cdcctl_client::{Client, ClientConfig};
use cdcctl_proto::{ChangeEvent, DatabaseConnectionSpec, TableCaptureSpec};
use cdcctl_stream::StreamConfig;

use crate::traffic;
use crate::{Args, Command};

/// Execute the parsed command.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let database = DatabaseConnectionSpec::from(&args.database);

    match args.command {
        Command::CreateConnector {
            ref name,
            ref tables,
            ref topic_prefix,
            ref slot_name,
            ref signal_table,
        } => {
            let tables = parse_tables(tables, topic_prefix)?;
            let response = client(&args)?
                .create_connector(
                    name,
                    &database,
                    &tables,
                    slot_name.as_deref(),
                    Some(signal_table.as_str()),
                )
                .await?;
            print_json(&response)
        }
        Command::GetConnectors => {
            let connectors = client(&args)?.list_connectors().await?;
            println!("Connectors: {:?}", connectors);
            Ok(())
        }
        Command::UpdateTables {
            ref name,
            ref tables,
            ref topic_prefix,
        } => {
            let tables = parse_tables(tables, topic_prefix)?;
            let response = client(&args)?.update_tables(name, &tables).await?;
            print_json(&response)
        }
        Command::Status { ref name } => {
            let status = client(&args)?.get_connector_status(name).await?;
            print_json(&status)
        }
        Command::Delete { ref name } => {
            client(&args)?.delete_connector(name).await?;
            println!("Connector '{}' deleted.", name);
            Ok(())
        }
        Command::Restart {
            ref name,
            include_tasks,
        } => {
            client(&args)?.restart_connector(name, include_tasks).await?;
            println!("Connector '{}' restarted.", name);
            Ok(())
        }
        Command::CreateTable => {
            traffic::create_orders_table(&database).await?;
            println!("Table 'public.orders' created successfully.");
            Ok(())
        }
        Command::InsertData => {
            let order = traffic::insert_order(&database).await?;
            println!(
                "Inserted order: id={}, product={}, quantity={}",
                order.id, order.product, order.quantity
            );
            Ok(())
        }
        Command::RunConsumer {
            brokers,
            topic,
            group_id,
        } => run_consumer(StreamConfig::new(brokers, topic).with_group_id(group_id)).await,
    }
}

fn client(args: &Args) -> anyhow::Result<Client> {
    let config = ClientConfig::new(&args.connect_url).with_timeout(args.request_timeout());
    Ok(Client::new(config)?)
}

fn parse_tables(tables: &[String], topic_prefix: &str) -> anyhow::Result<Vec<TableCaptureSpec>> {
    tables
        .iter()
        .map(|t| TableCaptureSpec::parse_qualified(t, topic_prefix).map_err(anyhow::Error::from))
        .collect()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_consumer(config: StreamConfig) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        info!("received shutdown signal");
        let _ = shutdown_tx.send(());
    });

    info!(topic = %config.topic, "listening for change events (Ctrl+C to stop)");
    let topic = config.topic.clone();
    let summary = cdcctl_stream::consume(config, |event| println!("{}", format_event(&event)), shutdown_rx)
        .await
        .with_context(|| format!("failed to consume from topic {}", topic))?;

    info!(
        delivered = summary.delivered,
        skipped = summary.skipped,
        decode_failures = summary.decode_failures,
        "consumer stopped"
    );
    Ok(())
}

/// Render an event as `[OPERATION] <after image>`.
pub fn format_event(event: &ChangeEvent) -> String {
    let after = match &event.after {
        Some(after) => serde_json::to_string_pretty(after).unwrap_or_else(|_| after.to_string()),
        None => "null".to_string(),
    };
    format!("[{}] {}", event.operation, after)
}
