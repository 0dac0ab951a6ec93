//! Kafka Connect control API.
//!
//! This module provides the main `Client` struct for managing connectors on a
//! Kafka Connect worker.

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use cdcctl_proto::{
    build_connector_config, ConnectorConfig, CreateConnectorRequest, DatabaseConnectionSpec,
    StatusReport, TableCaptureSpec,
};

use crate::config::ClientConfig;
use crate::error::Error;

/// Raw JSON body returned by the service, success or structured error alike.
pub type ServiceResponse = serde_json::Value;

/// Error body returned by Kafka Connect.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// A client for the orchestration service's connector control API.
///
/// The client holds no connector state; every call is a single round trip
/// and the service is the only source of truth.
///
/// # Example
///
/// ```ignore
/// use cdcctl_client::{Client, ClientConfig};
/// use cdcctl_proto::{DatabaseConnectionSpec, TableCaptureSpec};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new(ClientConfig::localhost())?;
///     let db = DatabaseConnectionSpec::new("localhost", 5432, "root", "secret", "db");
///     let tables = [TableCaptureSpec::new("public", "orders", "pgserver")];
///
///     let response = client
///         .create_connector("orders-connector", &db, &tables, None, None)
///         .await?;
///     println!("{}", response);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("invalid base url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    /// Create a client for the given base URL with default timeouts.
    pub fn connect_to(base_url: impl Into<String>) -> Result<Self, Error> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build a Debezium PostgreSQL configuration and create the connector.
    ///
    /// Returns the service's JSON body as-is; a rejection (for instance a
    /// name conflict) comes back as the service's error object, not as `Err`.
    pub async fn create_connector(
        &self,
        name: &str,
        database: &DatabaseConnectionSpec,
        tables: &[TableCaptureSpec],
        slot_name: Option<&str>,
        signal_table: Option<&str>,
    ) -> Result<ServiceResponse, Error> {
        let config = build_connector_config(name, database, tables, slot_name, signal_table)?;
        self.submit_connector(name, config).await
    }

    /// Submit an already-built configuration as a new connector.
    pub async fn submit_connector(
        &self,
        name: &str,
        config: ConnectorConfig,
    ) -> Result<ServiceResponse, Error> {
        let action = format!("create connector {}", name);
        let url = self.endpoint(&["connectors"]);
        debug!(connector = name, keys = config.len(), "creating connector");

        let body = CreateConnectorRequest {
            name: name.to_string(),
            config,
        };
        let response = self.send(self.http.post(url).json(&body), &action).await?;
        let status = response.status();
        let body = read_json(response, &action).await?;

        info!(connector = name, status = status.as_u16(), "create request submitted");
        Ok(body)
    }

    /// Fetch the full current configuration of a connector.
    ///
    /// This is the first half of the fetch-then-replace protocol used for
    /// table edits. Any non-success status is an error.
    pub async fn fetch_config(&self, name: &str) -> Result<ConnectorConfig, Error> {
        let action = format!("get connector config {}", name);
        let url = self.endpoint(&["connectors", name, "config"]);
        debug!(connector = name, "fetching connector config");

        let response = self.send(self.http.get(url), &action).await?;
        let response = expect_success(response, &action).await?;
        read_json(response, &action).await
    }

    /// Replace the full configuration of a connector.
    ///
    /// The service has no partial update: `config` must carry every key.
    pub async fn replace_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<ServiceResponse, Error> {
        let action = format!("update connector {}", name);
        let url = self.endpoint(&["connectors", name, "config"]);
        debug!(connector = name, keys = config.len(), "replacing connector config");

        let response = self.send(self.http.put(url).json(config), &action).await?;
        read_json(response, &action).await
    }

    /// Change the captured tables of a running connector.
    ///
    /// Fetches the current configuration, swaps only `table.include.list`,
    /// and writes the whole configuration back. A failed fetch returns before
    /// anything is written.
    ///
    /// The two steps are not atomic. A change made by another controller
    /// between the fetch and the write is overwritten.
    pub async fn update_tables(
        &self,
        name: &str,
        tables: &[TableCaptureSpec],
    ) -> Result<ServiceResponse, Error> {
        if tables.is_empty() {
            // An empty include list makes Debezium capture every table.
            return Err(cdcctl_proto::Error::InvalidArgument(format!(
                "connector '{}' needs at least one table to capture",
                name
            ))
            .into());
        }

        let mut config = self.fetch_config(name).await?;
        let previous = config.table_include_list().map(str::to_string);
        config.set_tables(tables);

        info!(
            connector = name,
            previous = previous.as_deref().unwrap_or(""),
            tables = config.table_include_list().unwrap_or(""),
            "updating captured tables"
        );
        self.replace_config(name, &config).await
    }

    /// List connector names.
    pub async fn list_connectors(&self) -> Result<Vec<String>, Error> {
        let action = "list connectors";
        let url = self.endpoint(&["connectors"]);

        let response = self.send(self.http.get(url), action).await?;
        let response = expect_success(response, action).await?;
        read_json(response, action).await
    }

    /// Get the connector's reported state and per-task status.
    pub async fn get_connector_status(&self, name: &str) -> Result<StatusReport, Error> {
        let action = format!("get status for connector {}", name);
        let url = self.endpoint(&["connectors", name, "status"]);

        let response = self.send(self.http.get(url), &action).await?;
        let response = expect_success(response, &action).await?;
        read_json(response, &action).await
    }

    /// Delete a connector.
    pub async fn delete_connector(&self, name: &str) -> Result<(), Error> {
        let action = format!("delete connector {}", name);
        let url = self.endpoint(&["connectors", name]);

        let response = self.send(self.http.delete(url), &action).await?;
        expect_success(response, &action).await?;

        info!(connector = name, "connector deleted");
        Ok(())
    }

    /// Restart a connector, optionally together with its tasks.
    pub async fn restart_connector(&self, name: &str, include_tasks: bool) -> Result<(), Error> {
        let action = format!("restart connector {}", name);
        let mut url = self.endpoint(&["connectors", name, "restart"]);
        url.query_pairs_mut()
            .append_pair("includeTasks", if include_tasks { "true" } else { "false" });

        let response = self.send(self.http.post(url), &action).await?;
        expect_success(response, &action).await?;

        info!(connector = name, include_tasks, "connector restarted");
        Ok(())
    }

    /// Build an endpoint URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request, mapping transport failures.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, Error> {
        request
            .send()
            .await
            .map_err(|e| Error::transport(action, None, e.to_string()))
    }
}

/// Fail on a non-success status, carrying the service's message when present.
async fn expect_success(response: Response, action: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServiceErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.to_string());

    Err(Error::transport(action, Some(status.as_u16()), message))
}

/// Parse a JSON body.
async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T, Error> {
    let status = response.status();
    response.json::<T>().await.map_err(|e| {
        Error::transport(
            action,
            Some(status.as_u16()),
            format!("unparseable response body: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encoding() {
        let client = Client::connect_to("http://localhost:8083/").unwrap();
        assert_eq!(
            client.endpoint(&["connectors", "orders-connector", "config"]).as_str(),
            "http://localhost:8083/connectors/orders-connector/config"
        );
        assert_eq!(
            client.endpoint(&["connectors", "a b/c"]).as_str(),
            "http://localhost:8083/connectors/a%20b%2Fc"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = Client::connect_to("http://gateway/kafka-connect").unwrap();
        assert_eq!(
            client.endpoint(&["connectors"]).as_str(),
            "http://gateway/kafka-connect/connectors"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(Client::connect_to("not a url"), Err(Error::Config(_))));
        assert!(matches!(Client::connect_to("mailto:ops@example.com"), Err(Error::Config(_))));
    }
}
