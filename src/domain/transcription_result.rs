use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque result mapping returned by either lane. Always carries a string `text` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TranscriptionResult(Map<String, Value>);

impl TranscriptionResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::String(text.into()));
        Self(fields)
    }

    /// Accepts any JSON object whose `text` field is a string.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(fields) => match fields.get("text") {
                Some(Value::String(_)) => Ok(Self(fields)),
                Some(_) => Err("field `text` is not a string".to_string()),
                None => Err("missing field `text`".to_string()),
            },
            other => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn text(&self) -> &str {
        self.0.get("text").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl<'de> Deserialize<'de> for TranscriptionResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
