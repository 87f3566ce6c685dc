use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// The mapping produced by [`parse`](crate::parse).
///
/// Keys iterate in the order they were first encountered in the input,
/// which is also the order [`stringify`](crate::stringify) writes them
/// back out.
pub type QueryMap = IndexMap<String, Value>;

/// A single parsed query string value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// The key appeared without a joiner at all, e.g. `flag` in `flag&a=1`.
    NoValue,
    /// A single value. `key=` parses to the empty string.
    String(String),
    /// The key appeared more than once. Elements are in encounter order
    /// and are themselves never sequences.
    Sequence(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, Value::NoValue)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Inserts a freshly parsed value, turning repeated keys into sequences.
///
/// The first occurrence is stored as-is. A second occurrence replaces the
/// scalar with a two-element sequence, and later occurrences push onto it.
/// [`Value::NoValue`] takes part like any other value.
pub(crate) fn insert_value(map: &mut QueryMap, key: String, value: Value) {
    match map.entry(key) {
        Entry::Vacant(v) => {
            v.insert(value);
        }
        Entry::Occupied(mut o) => {
            let entry = o.get_mut();
            match entry {
                Value::Sequence(values) => values.push(value),
                Value::String(_) | Value::NoValue => {
                    let existing = std::mem::replace(entry, Value::NoValue);
                    *entry = Value::Sequence(vec![existing, value]);
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::NoValue => serializer.serialize_none(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(seq) => seq.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a query string value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::String(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::String(itoa::Buffer::new().format(v).to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                Ok(Value::String(itoa::Buffer::new().format(v).to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::String(ryu::Buffer::new().format(v).to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::NoValue)
            }

            fn visit_none<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::NoValue)
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                Value::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element()? {
                    values.push(value);
                }
                Ok(Value::Sequence(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::{QueryMap, Value, insert_value};

    use pretty_assertions::assert_eq;

    #[test]
    fn first_occurrence_stays_scalar() {
        let mut map = QueryMap::default();
        insert_value(&mut map, "a".to_string(), Value::from("1"));
        assert_eq!(map.get("a"), Some(&Value::from("1")));
    }

    #[test]
    fn second_occurrence_builds_a_pair() {
        let mut map = QueryMap::default();
        insert_value(&mut map, "a".to_string(), Value::from("1"));
        insert_value(&mut map, "a".to_string(), Value::from("2"));
        assert_eq!(
            map.get("a"),
            Some(&Value::Sequence(vec![Value::from("1"), Value::from("2")]))
        );
    }

    #[test]
    fn later_occurrences_append() {
        let mut map = QueryMap::default();
        for v in ["1", "2", "3", "4"] {
            insert_value(&mut map, "a".to_string(), Value::from(v));
        }
        assert_eq!(
            map.get("a").and_then(Value::as_sequence).map(|s| s.len()),
            Some(4)
        );
    }

    #[test]
    fn no_value_collides_like_any_other() {
        let mut map = QueryMap::default();
        insert_value(&mut map, "a".to_string(), Value::NoValue);
        insert_value(&mut map, "a".to_string(), Value::from("1"));
        assert_eq!(
            map.get("a"),
            Some(&Value::Sequence(vec![Value::NoValue, Value::from("1")]))
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = QueryMap::default();
        for key in ["z", "a", "m"] {
            insert_value(&mut map, key.to_string(), Value::from("1"));
        }
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn serde_representation_round_trips() {
        let value = Value::Sequence(vec![Value::from("1"), Value::NoValue]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"["1",null]"#);
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), value);
    }
}
