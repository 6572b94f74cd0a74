//! The JSON-like value tree the redactor walks.
//!
//! `Node` extends the JSON data model with the "special primitives" found in
//! in-process log payloads: an `Undefined` marker, dates and function
//! references. Special primitives are atomic; the walker never descends into
//! them.

use std::{borrow::Cow, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

/// Ordered object representation. Insertion order is preserved.
pub type Object = IndexMap<String, Node>;

/// A value in a redactable tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    #[default]
    Null,
    Undefined,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    /// A named function reference.
    Function(String),
    Array(Vec<Node>),
    Object(Object),
}

impl Node {
    /// Short human name of the variant, used in validation errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Undefined => "undefined",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Date(_) => "date",
            Node::Function(_) => "function",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Node::Null | Node::Undefined)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a member of an object node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Text form of a primitive, as handed to string-based strategies.
    ///
    /// Containers render as their JSON text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Node::Null => Cow::Borrowed("null"),
            Node::Undefined => Cow::Borrowed("undefined"),
            Node::Bool(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            Node::Number(value) => Cow::Owned(value.to_string()),
            Node::String(value) => Cow::Borrowed(value),
            Node::Date(value) => Cow::Owned(iso_8601(value)),
            Node::Function(name) => Cow::Owned(format!("[Function: {name}]")),
            Node::Array(_) | Node::Object(_) => Cow::Owned(self.to_json_string()),
        }
    }

    /// Serializes the node the way `JSON.stringify` would.
    ///
    /// `Undefined` and `Function` members are dropped from objects and become
    /// `null` inside arrays. Dates use ISO-8601 with millisecond precision.
    pub fn to_json_string(&self) -> String {
        JsonValue::from(self.clone()).to_string()
    }

    fn is_omitted_member(&self) -> bool {
        matches!(self, Node::Undefined | Node::Function(_))
    }
}

/// Formats a date the way `Date.prototype.toISOString` does.
pub fn iso_8601(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<JsonValue> for Node {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Node::Null,
            JsonValue::Bool(value) => Node::Bool(value),
            JsonValue::Number(value) => Node::Number(value),
            JsonValue::String(value) => Node::String(value),
            JsonValue::Array(values) => Node::Array(values.into_iter().map(Node::from).collect()),
            JsonValue::Object(map) => Node::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for JsonValue {
    fn from(node: Node) -> Self {
        match node {
            Node::Null | Node::Undefined | Node::Function(_) => JsonValue::Null,
            Node::Bool(value) => JsonValue::Bool(value),
            Node::Number(value) => JsonValue::Number(value),
            Node::String(value) => JsonValue::String(value),
            Node::Date(value) => JsonValue::String(iso_8601(&value)),
            Node::Array(values) => JsonValue::Array(values.into_iter().map(JsonValue::from).collect()),
            Node::Object(object) => JsonValue::Object(
                object
                    .into_iter()
                    .filter(|(_, value)| !value.is_omitted_member())
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Number(value.into())
    }
}

impl From<u64> for Node {
    fn from(value: u64) -> Self {
        Node::Number(value.into())
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(value: DateTime<Utc>) -> Self {
        Node::Date(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(values: Vec<Node>) -> Self {
        Node::Array(values)
    }
}

impl From<Object> for Node {
    fn from(object: Object) -> Self {
        Node::Object(object)
    }
}

impl FromIterator<(String, Node)> for Node {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Node::Object(iter.into_iter().collect())
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Node::Null | Node::Undefined | Node::Function(_) => serializer.serialize_unit(),
            Node::Bool(value) => serializer.serialize_bool(*value),
            Node::Number(value) => value.serialize(serializer),
            Node::String(value) => serializer.serialize_str(value),
            Node::Date(value) => serializer.serialize_str(&iso_8601(value)),
            Node::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Node::Object(object) => {
                let members = object.iter().filter(|(_, value)| !value.is_omitted_member());
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in members {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Node::from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn json_conversion_preserves_key_order() {
        let node = Node::from(json!({"zeta": 1, "alpha": {"b": true, "a": null}}));
        assert_eq!(node.to_json_string(), r#"{"zeta":1,"alpha":{"b":true,"a":null}}"#);
    }

    #[test]
    fn stringify_drops_undefined_and_functions_from_objects() {
        let node: Node = [
            ("a".to_string(), Node::Undefined),
            ("b".to_string(), Node::Function("handler".into())),
            ("c".to_string(), Node::from("kept")),
        ]
        .into_iter()
        .collect();
        assert_eq!(node.to_json_string(), r#"{"c":"kept"}"#);
    }

    #[test]
    fn stringify_nulls_undefined_inside_arrays() {
        let node = Node::Array(vec![Node::Undefined, Node::Function("f".into()), Node::from(1_i64)]);
        assert_eq!(node.to_json_string(), "[null,null,1]");
    }

    #[test]
    fn dates_render_as_iso_8601_with_millis() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).single().unwrap();
        assert_eq!(Node::Date(date).as_text(), "2024-03-09T14:05:00.000Z");
        assert_eq!(Node::Date(date).to_json_string(), r#""2024-03-09T14:05:00.000Z""#);
    }

    #[test]
    fn text_forms_of_primitives() {
        assert_eq!(Node::Null.as_text(), "null");
        assert_eq!(Node::Undefined.as_text(), "undefined");
        assert_eq!(Node::Bool(true).as_text(), "true");
        assert_eq!(Node::from(42_i64).as_text(), "42");
        assert_eq!(Node::Function("onClick".into()).as_text(), "[Function: onClick]");
    }

    #[test]
    fn serialize_matches_stringify() {
        let node: Node = [
            ("id".to_string(), Node::from(7_u64)),
            ("cb".to_string(), Node::Function("cb".into())),
        ]
        .into_iter()
        .collect();
        let serialized = serde_json::to_string(&node).unwrap();
        assert_eq!(serialized, node.to_json_string());
    }

    #[test]
    fn deserialize_from_json_text() {
        let node: Node = serde_json::from_str(r#"{"user":{"name":"Joe"}}"#).unwrap();
        assert_eq!(node.get("user").and_then(|u| u.get("name")), Some(&Node::from("Joe")));
    }
}
