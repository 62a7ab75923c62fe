//! # Linked-Data Values
//!
//! The raw representation of a DID document is an ordered map of linked-data
//! terms to values. [`Value`] makes every shape a value can take explicit so
//! accessors can match on it rather than guess.
//!
//! Strings are classified syntactically: a string is a [`Uri`] when it parses
//! as an absolute URI and contains no whitespace, so `"Note: hello"` stays a
//! plain string. Nothing checks that a URI resolves or names a DID.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Insertion-ordered map of linked-data terms to values.
pub type Map = IndexMap<String, Value>;

/// A linked-data value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// JSON `null`.
    #[default]
    Null,

    /// JSON boolean.
    Bool(bool),

    /// JSON number.
    Number(serde_json::Number),

    /// A string that is not an absolute URI.
    String(String),

    /// An absolute URI, such as a DID or an HTTP URL.
    Uri(Uri),

    /// Ordered sequence of values.
    Array(Vec<Self>),

    /// Nested ordered map.
    Object(Map),
}

impl Value {
    /// Classify a string as a [`Value::Uri`] when it is an absolute URI,
    /// otherwise as a [`Value::String`].
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        match Uri::from_str(&text) {
            Ok(uri) => Self::Uri(uri),
            Err(_) => Self::String(text),
        }
    }

    /// The textual content of a `String` or `Uri` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Uri(uri) => Some(uri.as_str()),
            _ => None,
        }
    }

    /// The value as a URI, if it is one.
    #[must_use]
    pub const fn as_uri(&self) -> Option<&Uri> {
        match self {
            Self::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    /// The value as a sequence, if it is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The value as a nested map, if it is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` if the value is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::from_text(value)
    }
}

impl From<Uri> for Value {
    fn from(value: Uri) -> Self {
        Self::Uri(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::from_text(s),
            serde_json::Value::Array(a) => Self::Array(a.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(o) => {
                Self::Object(o.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Uri(uri) => Self::String(uri.0),
            Value::Array(a) => Self::Array(a.into_iter().map(Self::from).collect()),
            Value::Object(o) => Self::Object(o.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Uri(uri) => serializer.serialize_str(uri.as_str()),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for e in items {
                    seq.serialize_element(e)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(value.into()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(value.into()))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                serde_json::Number::from_f64(value)
                    .map(Value::Number)
                    .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Float(value), &self))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::from_text(value))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::from_text(value))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(e) = seq.next_element()? {
                    items.push(e);
                }
                Ok(Value::Array(items))
            }

            // keys are inserted in document order
            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    map.insert(k, v);
                }
                Ok(Value::Object(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// An absolute URI. The original text is kept as-is so identifiers survive a
/// round trip byte for byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(String);

impl Uri {
    /// The URI text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Uri {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // url accepts spaces inside opaque paths such as `note: hello`
        if s.contains(char::is_whitespace) {
            return Err(url::ParseError::InvalidDomainCharacter);
        }
        url::Url::parse(s)?;
        Ok(Self(s.to_string()))
    }
}

impl Display for Uri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.0
    }
}

impl PartialEq<str> for Uri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Uri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_strings() {
        assert!(matches!(Value::from("did:example:123"), Value::Uri(_)));
        assert!(matches!(Value::from("https://example.com/endpoint"), Value::Uri(_)));
        assert!(matches!(Value::from("Ed25519VerificationKey2018"), Value::String(_)));
        assert!(matches!(Value::from(""), Value::String(_)));
        assert!(matches!(Value::from("Note: hello"), Value::String(_)));
        assert!(matches!(Value::from("did:example:123 "), Value::String(_)));
    }

    #[test]
    fn uri_text_is_verbatim() {
        let uri: Uri = "HTTPS://Example.com".parse().expect("should parse");
        assert_eq!(uri.as_str(), "HTTPS://Example.com");
    }

    #[test]
    fn preserve_key_order() {
        let input = r#"{"zeta": 1, "alpha": "two", "mid": [true, null]}"#;
        let value: Value = serde_json::from_str(input).expect("should deserialize");

        let Value::Object(map) = &value else {
            panic!("expected object");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&value).expect("should serialize");
        assert_eq!(json, r#"{"zeta":1,"alpha":"two","mid":[true,null]}"#);
    }

    #[test]
    fn convert_json_value() {
        let json = serde_json::json!({"id": "did:example:123", "n": 1.5});
        let value = Value::from(json.clone());

        let map = value.as_object().expect("should be object");
        assert_eq!(map["id"].as_uri().map(Uri::as_str), Some("did:example:123"));
        assert_eq!(serde_json::Value::from(value), json);
    }
}
