//! Connector status as reported by the orchestration service.

use serde::{Deserialize, Serialize};

/// Response of `GET /connectors/{name}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Connector name.
    pub name: String,
    /// Connector-level state.
    pub connector: ConnectorState,
    /// Per-task state.
    #[serde(default)]
    pub tasks: Vec<TaskState>,
    /// Connector type (`source` or `sink`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,
}

impl StatusReport {
    /// Whether the connector and all of its tasks report `RUNNING`.
    pub fn is_running(&self) -> bool {
        self.connector.state == "RUNNING" && self.tasks.iter().all(|t| t.state == "RUNNING")
    }
}

/// State of the connector instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorState {
    /// `UNASSIGNED`, `RUNNING`, `PAUSED`, `FAILED`, ...
    pub state: String,
    /// Worker the connector is assigned to.
    pub worker_id: String,
    /// Stack trace when the connector failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// State of a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    pub id: u32,
    pub state: String,
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_report() {
        let json = r#"{
            "name": "orders-connector",
            "connector": {"state": "RUNNING", "worker_id": "10.0.0.5:8083"},
            "tasks": [
                {"id": 0, "state": "FAILED", "worker_id": "10.0.0.5:8083", "trace": "boom"}
            ],
            "type": "source"
        }"#;

        let report: StatusReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.name, "orders-connector");
        assert_eq!(report.connector.state, "RUNNING");
        assert_eq!(report.tasks.len(), 1);
        assert_eq!(report.tasks[0].trace.as_deref(), Some("boom"));
        assert_eq!(report.connector_type.as_deref(), Some("source"));
        assert!(!report.is_running());
    }

    #[test]
    fn test_status_without_tasks() {
        let json = r#"{"name": "c", "connector": {"state": "RUNNING", "worker_id": "w"}}"#;
        let report: StatusReport = serde_json::from_str(json).unwrap();
        assert!(report.tasks.is_empty());
        assert!(report.is_running());
    }
}
