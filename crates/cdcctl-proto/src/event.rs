//! Change-event envelope decoding.
//!
//! Debezium wraps each row change in an envelope. With the JSON converter and
//! schemas enabled the interesting fields sit under `payload`:
//!
//! ```json
//! {"schema": {...}, "payload": {"op": "c", "before": null, "after": {...}, "ts_ms": 1700000000000}}
//! ```
//!
//! With schemas disabled the same fields appear at the top level. Both shapes
//! decode to a [`ChangeEvent`].

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// Kind of row operation carried by an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `c`: row inserted.
    Create,
    /// `u`: row updated.
    Update,
    /// `d`: row deleted.
    Delete,
    /// `r`: row read during a snapshot.
    Read,
    /// Any other code, kept verbatim.
    Unknown(String),
}

impl Operation {
    /// Map a wire operation code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "c" => Operation::Create,
            "u" => Operation::Update,
            "d" => Operation::Delete,
            "r" => Operation::Read,
            other => Operation::Unknown(other.to_string()),
        }
    }

    /// The wire operation code.
    pub fn code(&self) -> &str {
        match self {
            Operation::Create => "c",
            Operation::Update => "u",
            Operation::Delete => "d",
            Operation::Read => "r",
            Operation::Unknown(code) => code,
        }
    }

    /// Whether the code was one of the four known ones.
    pub fn is_known(&self) -> bool {
        !matches!(self, Operation::Unknown(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => f.write_str("CREATE"),
            Operation::Update => f.write_str("UPDATE"),
            Operation::Delete => f.write_str("DELETE"),
            Operation::Read => f.write_str("READ"),
            Operation::Unknown(code) => f.write_str(code),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A decoded row change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// What happened to the row.
    pub operation: Operation,
    /// Row image before the change (updates/deletes, when the table's replica
    /// identity provides it).
    pub before: Option<Value>,
    /// Row image after the change. `None` for deletes.
    pub after: Option<Value>,
    /// Connector processing time in milliseconds since the epoch.
    pub timestamp_ms: Option<i64>,
}

impl ChangeEvent {
    /// Create an event with only an operation and an after image.
    pub fn new(operation: Operation, after: Option<Value>) -> Self {
        Self {
            operation,
            before: None,
            after,
            timestamp_ms: None,
        }
    }
}

/// Decode one broker message body.
///
/// Returns `Ok(None)` for tombstones: an absent or empty body, or a body that
/// is the JSON literal `null`. Those carry no row change and are skipped.
pub fn decode_message(body: Option<&[u8]>) -> Result<Option<ChangeEvent>, Error> {
    let body = match body {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Ok(None),
    };

    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Null => Ok(None),
        Value::Object(envelope) => decode_envelope(&envelope).map(Some),
        other => Err(Error::Decode(format!(
            "expected envelope object, got {}",
            json_kind(&other)
        ))),
    }
}

fn decode_envelope(envelope: &Map<String, Value>) -> Result<ChangeEvent, Error> {
    let payload = match envelope.get("payload") {
        Some(Value::Object(payload)) => payload,
        Some(other) => {
            return Err(Error::Decode(format!(
                "expected payload object, got {}",
                json_kind(other)
            )))
        }
        // Converter running with schemas.enable=false.
        None => envelope,
    };

    let operation = match payload.get("op") {
        Some(Value::String(code)) => Operation::from_code(code),
        Some(other) => {
            return Err(Error::Decode(format!(
                "expected op string, got {}",
                json_kind(other)
            )))
        }
        None => return Err(Error::Decode("envelope has no op field".to_string())),
    };

    Ok(ChangeEvent {
        operation,
        before: row_image(payload, "before"),
        after: row_image(payload, "after"),
        timestamp_ms: payload.get("ts_ms").and_then(Value::as_i64),
    })
}

fn row_image(payload: &Map<String, Value>, field: &str) -> Option<Value> {
    match payload.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<Option<ChangeEvent>, Error> {
        let bytes = serde_json::to_vec(&value).unwrap();
        decode_message(Some(&bytes))
    }

    #[test]
    fn test_operation_codes() {
        assert_eq!(Operation::from_code("c"), Operation::Create);
        assert_eq!(Operation::from_code("u"), Operation::Update);
        assert_eq!(Operation::from_code("d"), Operation::Delete);
        assert_eq!(Operation::from_code("r"), Operation::Read);
        assert_eq!(Operation::from_code("t"), Operation::Unknown("t".into()));
        assert_eq!(Operation::from_code("t").code(), "t");
        assert!(!Operation::from_code("m").is_known());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Read.to_string(), "READ");
        assert_eq!(Operation::Unknown("truncate".into()).to_string(), "truncate");
    }

    #[test]
    fn test_delete_envelope() {
        let event = decode(json!({"payload": {"op": "d", "after": null}}))
            .unwrap()
            .unwrap();
        assert_eq!(event, ChangeEvent::new(Operation::Delete, None));
    }

    #[test]
    fn test_create_envelope_with_schema() {
        let event = decode(json!({
            "schema": {"type": "struct"},
            "payload": {
                "op": "c",
                "before": null,
                "after": {"id": 1, "product": "Laptop", "quantity": 3},
                "ts_ms": 1700000000000i64
            }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(event.operation, Operation::Create);
        assert_eq!(event.after.unwrap()["product"], "Laptop");
        assert!(event.before.is_none());
        assert_eq!(event.timestamp_ms, Some(1700000000000));
    }

    #[test]
    fn test_update_keeps_before_image() {
        let event = decode(json!({
            "payload": {"op": "u", "before": {"id": 1, "quantity": 1}, "after": {"id": 1, "quantity": 2}}
        }))
        .unwrap()
        .unwrap();

        assert_eq!(event.operation, Operation::Update);
        assert_eq!(event.before.unwrap()["quantity"], 1);
        assert_eq!(event.after.unwrap()["quantity"], 2);
    }

    #[test]
    fn test_schemaless_envelope() {
        let event = decode(json!({"op": "r", "after": {"id": 7}})).unwrap().unwrap();
        assert_eq!(event.operation, Operation::Read);
        assert_eq!(event.after, Some(json!({"id": 7})));
    }

    #[test]
    fn test_unknown_code_is_forwarded() {
        let event = decode(json!({"payload": {"op": "t"}})).unwrap().unwrap();
        assert_eq!(event.operation, Operation::Unknown("t".to_string()));
    }

    #[test]
    fn test_tombstones_are_skipped() {
        assert!(decode_message(None).unwrap().is_none());
        assert!(decode_message(Some(&b""[..])).unwrap().is_none());
        assert!(decode_message(Some(&b"null"[..])).unwrap().is_none());
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(decode_message(Some(b"{not json")), Err(Error::Decode(_))));
        assert!(matches!(decode(json!([1, 2])), Err(Error::Decode(_))));
        assert!(matches!(decode(json!({"payload": "x"})), Err(Error::Decode(_))));
        assert!(matches!(decode(json!({"payload": {}})), Err(Error::Decode(_))));
        assert!(matches!(decode(json!({"payload": {"op": 1}})), Err(Error::Decode(_))));
    }

    #[test]
    fn test_event_serializes_op_code() {
        let event = ChangeEvent::new(Operation::Create, Some(json!({"id": 1})));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["operation"], "c");
        assert_eq!(value["after"]["id"], 1);
    }
}
