//! Clone by JSON round-trip.
//!
//! A lower-fidelity alternative to [`crate::structural_clone`]. The value is
//! encoded to JSON text and parsed back, so the result only keeps what JSON
//! can express:
//!
//! | Input | Result |
//! |-------|--------|
//! | cycle | `SerializationError::Cycle` |
//! | shared substructure | duplicated |
//! | `undefined` record member | dropped |
//! | `undefined` sequence item | `null` |
//! | `undefined` at top level | `SerializationError::Unrepresentable` |
//! | NaN / ±infinity | `null` |
//! | date | ISO-8601 string |
//! | pattern | empty record |
//! | hidden or inherited member | dropped |
//!
//! Never used as an automatic fallback by the structural cloner.

use std::collections::HashSet;

use serde_json::{Map, Number, Value as JsonValue};
use tracing::debug;

use crate::error::{SerializationError, SerializationResult};
use crate::value::{Record, Sequence, Value};
use crate::visited::NodeId;

/// Deep-copy `value` by encoding it to JSON text and parsing it back.
pub fn clone_via_serialization(value: &Value) -> SerializationResult<Value> {
    round_trip(value, None)
}

pub(crate) fn round_trip(value: &Value, limit: Option<usize>) -> SerializationResult<Value> {
    let json = Encoder::new(limit).encode_root(value)?;
    let text = serde_json::to_string(&json)?;
    let parsed: JsonValue = serde_json::from_str(&text)?;
    Ok(Value::from_json(&parsed))
}

impl Value {
    /// JSON form of this value, under the rules of the module table.
    pub fn to_json(&self) -> SerializationResult<JsonValue> {
        Encoder::new(None).encode_root(self)
    }

    /// Build a value from JSON. Arrays become sequences and objects become
    /// records in document order.
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => {
                Value::Sequence(Sequence::from_vec(items.iter().map(Value::from_json).collect()))
            }
            JsonValue::Object(map) => {
                let record = Record::new();
                for (key, member) in map {
                    record.set(key.clone(), Value::from_json(member));
                }
                Value::Record(record)
            }
        }
    }
}

struct Encoder {
    /// Composites on the path from the root to the current value.
    ancestors: HashSet<NodeId>,
    path: Vec<String>,
    limit: Option<usize>,
}

impl Encoder {
    fn new(limit: Option<usize>) -> Self {
        Self {
            ancestors: HashSet::new(),
            path: vec!["$".to_string()],
            limit,
        }
    }

    fn encode_root(&mut self, value: &Value) -> SerializationResult<JsonValue> {
        self.encode(value, 1)?
            .ok_or(SerializationError::Unrepresentable { kind: value.kind() })
    }

    /// `None` means the value has no JSON form and is left out by the caller.
    fn encode(&mut self, value: &Value, depth: usize) -> SerializationResult<Option<JsonValue>> {
        let json = match value {
            Value::Undefined => return Ok(None),
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(date) => JsonValue::String(date.to_iso_string()),
            Value::Pattern(_) => JsonValue::Object(Map::new()),
            Value::Sequence(seq) => {
                self.enter(seq.node_id(), depth)?;
                let mut items = Vec::with_capacity(seq.len());
                for (index, item) in seq.items().iter().enumerate() {
                    self.path.push(format!("[{}]", index));
                    let encoded = self.encode(item, depth + 1)?;
                    self.path.pop();
                    items.push(encoded.unwrap_or(JsonValue::Null));
                }
                self.ancestors.remove(&seq.node_id());
                JsonValue::Array(items)
            }
            Value::Record(record) => {
                self.enter(record.node_id(), depth)?;
                let mut map = Map::new();
                for (key, member) in record.entries() {
                    self.path.push(format!(".{}", key));
                    let encoded = self.encode(&member, depth + 1)?;
                    self.path.pop();
                    if let Some(json) = encoded {
                        map.insert(key, json);
                    }
                }
                self.ancestors.remove(&record.node_id());
                JsonValue::Object(map)
            }
        };
        Ok(Some(json))
    }

    fn enter(&mut self, id: NodeId, depth: usize) -> SerializationResult<()> {
        if !self.ancestors.insert(id) {
            let path = self.path.concat();
            debug!(path = %path, "refusing to serialize circular structure");
            return Err(SerializationError::Cycle { path });
        }
        if let Some(limit) = self.limit {
            if depth > limit {
                return Err(SerializationError::NestingTooDeep { depth, limit });
            }
        }
        Ok(())
    }
}
