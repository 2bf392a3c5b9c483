//! MessagePack value tree for the binary map format
//!
//! MessagePack carries values JSON has no place for (`bin`, `ext`, non-text
//! map keys, non-finite floats). Deserializing straight into
//! [`serde_json::Value`] would reject the whole payload on the first one, so
//! binary maps are read into [`Packed`] first and converted per key.

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Number, Value};
use std::fmt;

use super::decoder::kind_of;

/// Upper bound on pre-allocation from an untrusted length prefix
const MAX_PREALLOC: usize = 256;

/// One MessagePack value
#[derive(Debug, Clone, PartialEq)]
pub enum Packed {
    /// nil, boolean, number or string
    Plain(Value),
    Array(Vec<Packed>),
    /// Entries in wire order; keys may be of any type
    Map(Vec<(Packed, Packed)>),
    /// A value JSON cannot hold, named by kind
    Foreign(&'static str),
}

impl Packed {
    pub fn kind(&self) -> &'static str {
        match self {
            Packed::Plain(value) => kind_of(value),
            Packed::Array(_) => "array",
            Packed::Map(_) => "map",
            Packed::Foreign(kind) => kind,
        }
    }

    /// JSON form, or the kind of the first value that has none
    pub fn into_json(self) -> Result<Value, &'static str> {
        match self {
            Packed::Plain(value) => Ok(value),
            Packed::Array(items) => items
                .into_iter()
                .map(Packed::into_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Packed::Map(entries) => {
                let mut map = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    match key {
                        Packed::Plain(Value::String(key)) => {
                            map.insert(key, value.into_json()?);
                        }
                        _ => return Err("map with non-text keys"),
                    }
                }
                Ok(Value::Object(map))
            }
            Packed::Foreign(kind) => Err(kind),
        }
    }
}

impl<'de> Deserialize<'de> for Packed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PackedVisitor)
    }
}

struct PackedVisitor;

impl<'de> Visitor<'de> for PackedVisitor {
    type Value = Packed;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any MessagePack value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Packed, E> {
        Ok(Packed::Plain(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Packed, E> {
        Ok(Packed::Plain(Value::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Packed, E> {
        Ok(Packed::Plain(Value::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Packed, E> {
        Ok(match Number::from_f64(v) {
            Some(number) => Packed::Plain(Value::Number(number)),
            None => Packed::Foreign("non-finite number"),
        })
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Packed, E> {
        Ok(Packed::Plain(Value::String(v.to_owned())))
    }

    fn visit_bytes<E: de::Error>(self, _v: &[u8]) -> Result<Packed, E> {
        Ok(Packed::Foreign("binary"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Packed, E> {
        Ok(Packed::Plain(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Packed, E> {
        Ok(Packed::Plain(Value::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Packed, D::Error>
    where
        D: Deserializer<'de>,
    {
        Packed::deserialize(deserializer)
    }

    // rmp-serde hands extension types over as a newtype struct
    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Packed, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Packed::Foreign("extension"))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Packed, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(MAX_PREALLOC));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Packed::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Packed, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0).min(MAX_PREALLOC));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(Packed::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_values_convert() {
        let bytes = rmp_serde::to_vec_named(&json!({"a": [1, 2.5, "x", null, true]})).unwrap();
        let packed: Packed = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(packed.into_json().unwrap(), json!({"a": [1, 2.5, "x", null, true]}));
    }

    #[test]
    fn test_binary_is_foreign() {
        // bin8 of three bytes
        let packed: Packed = rmp_serde::from_slice(&[0xc4, 0x03, 1, 2, 3]).unwrap();
        assert_eq!(packed, Packed::Foreign("binary"));
        assert_eq!(packed.into_json(), Err("binary"));
    }

    #[test]
    fn test_nested_foreign_surfaces() {
        // [1, bin8[]]
        let packed: Packed = rmp_serde::from_slice(&[0x92, 0x01, 0xc4, 0x00]).unwrap();
        assert_eq!(packed.kind(), "array");
        assert_eq!(packed.into_json(), Err("binary"));
    }

    #[test]
    fn test_integer_keys_survive_parsing() {
        // {7: 1}
        let packed: Packed = rmp_serde::from_slice(&[0x81, 0x07, 0x01]).unwrap();
        match &packed {
            Packed::Map(entries) => assert_eq!(entries[0].0.kind(), "number"),
            other => panic!("expected a map, got {:?}", other),
        }
        assert_eq!(packed.into_json(), Err("map with non-text keys"));
    }
}
