//! Custom serialization for Record and Value.
//!
//! The Data API serves records as flat JSON objects. Deserialization maps
//! raw JSON into the open [`Value`] type:
//! - integers to `Int`, other numbers to `Float`
//! - strings that parse as RFC 3339 to `DateTime`, others kept as `String`
//! - arrays to `List` (recursively converted)
//! - objects to the `Json` fallback

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::Value;

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map representing a Bubble record")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Record, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut record = Record::new();
        while let Some(key) = map.next_key::<String>()? {
            let value: serde_json::Value = map.next_value()?;
            record.fields.insert(key, json_value_to_value(value));
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(json_value_to_value(json))
    }
}

/// Converts a serde_json::Value to our Value enum.
pub(crate) fn json_value_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Json(serde_json::Value::Number(n))
            }
        }
        serde_json::Value::String(s) => {
            // Bubble serializes dates as ISO 8601 strings
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                Value::DateTime(dt.with_timezone(&chrono::Utc))
            } else {
                Value::String(s)
            }
        }
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_value_to_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Json(serde_json::Value::Object(obj)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_simple_fields() {
        let json = r#"{"name": "Acme", "rank": 42, "score": 1.5, "active": true}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.get_string("name").unwrap(), Some("Acme"));
        assert_eq!(record.get_int("rank").unwrap(), Some(42));
        assert_eq!(record.get_float("score").unwrap(), Some(1.5));
        assert_eq!(record.get_bool("active").unwrap(), Some(true));
    }

    #[test]
    fn test_deserialize_id_field() {
        let json = r#"{"_id": "1543274337909x172601265502257700", "name": "Acme"}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.id(), Some("1543274337909x172601265502257700"));
    }

    #[test]
    fn test_deserialize_datetime() {
        let json = r#"{"Created Date": "2018-11-26T15:18:57.909Z"}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        let dt = record.get_datetime("Created Date").unwrap().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_543_245_537_909);
    }

    #[test]
    fn test_plain_string_stays_string() {
        let json = r#"{"note": "due 2021-01-01"}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.get_string("note").unwrap(), Some("due 2021-01-01"));
    }

    #[test]
    fn test_deserialize_null_and_list() {
        let json = r#"{"tags": ["a", "b"], "parent": null}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        let tags = record.get_list("tags").unwrap().unwrap();
        assert_eq!(tags, &vec![Value::from("a"), Value::from("b")]);
        assert_eq!(record.get_string("parent").unwrap(), None);
    }

    #[test]
    fn test_missing_and_mismatched_fields() {
        let json = r#"{"rank": 42}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert!(record.get_string("absent").is_err());
        assert!(record.get_string("rank").is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let record = Record::new().set("name", "Acme").set("rank", 7i64);

        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
