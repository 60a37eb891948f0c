//! Request part decoding.
//!
//! Path params, query pairs and headers arrive as strings. They are decoded
//! through [`TextValue`], which keeps every value a string until the target
//! type asks for something else: a `u64` field parses its string with
//! `u64::from_str`, a `String` field takes it unchanged. Each field is read
//! on its own terms, so `?q=2024&page=1` fills `q: String` and `page: u32`.

use std::fmt;

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, Deserializer, IntoDeserializer, Unexpected, Visitor};
use serde_json::{Error, Map, Value};

use crate::dispatcher::{HeaderVec, QueryVec};
use crate::router::ParamVec;

/// A request part did not fit the declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// `body`, `headers`, `querystring` or `params`
    pub part: &'static str,
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.part, self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Scalar reading of a string for JSON Schema checks, where no target type
/// is known: integers first (signed, then unsigned), then finite floats,
/// then booleans.
fn coerce(value: &str) -> Value {
    if let Ok(v) = value.parse::<i64>() {
        Value::from(v)
    } else if let Ok(v) = value.parse::<u64>() {
        Value::from(v)
    } else if let Some(v) = value.parse::<f64>().ok().filter(|v| v.is_finite()) {
        Value::from(v)
    } else if let Ok(v) = value.parse::<bool>() {
        Value::from(v)
    } else {
        Value::String(value.to_string())
    }
}

pub(crate) fn coerce_value(value: &Value) -> Value {
    match value {
        Value::String(s) => coerce(s),
        Value::Array(items) => Value::Array(items.iter().map(coerce_value).collect()),
        other => other.clone(),
    }
}

/// A value read from a string-only source.
///
/// Strings are parsed on demand with the requested type's `FromStr`. A lone
/// string also satisfies a sequence, so `?tag=a` fills `tag: Vec<String>`.
struct TextValue(Value);

impl<'de> IntoDeserializer<'de, Error> for TextValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

fn visit_object<'de, V: Visitor<'de>>(
    map: Map<String, Value>,
    visitor: V,
) -> Result<V::Value, Error> {
    let mut access =
        MapDeserializer::<_, Error>::new(map.into_iter().map(|(k, v)| (k, TextValue(v))));
    let value = visitor.visit_map(&mut access)?;
    access.end()?;
    Ok(value)
}

fn visit_array<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value, Error> {
    let mut access = SeqDeserializer::<_, Error>::new(items.into_iter().map(TextValue));
    let value = visitor.visit_seq(&mut access)?;
    access.end()?;
    Ok(value)
}

macro_rules! parse_scalar {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                match self.0 {
                    Value::String(s) => match s.parse::<$ty>() {
                        Ok(v) => visitor.$visit(v),
                        Err(_) => Err(de::Error::invalid_value(Unexpected::Str(&s), &visitor)),
                    },
                    other => other.$method(visitor),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for TextValue {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Object(map) => visit_object(map, visitor),
            Value::Array(items) => visit_array(items, visitor),
            other => other.deserialize_any(visitor),
        }
    }

    parse_scalar! {
        deserialize_bool => bool, visit_bool;
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(TextValue(other)),
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Array(items) => visit_array(items, visitor),
            single @ Value::String(_) => visit_array(vec![single], visitor),
            other => other.deserialize_seq(visitor),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    serde::forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct map struct identifier ignored_any
    }
}

/// Decode a string-valued object into `T`, parsing each value as its field requires.
pub(crate) fn decode_strings<T: DeserializeOwned>(
    part: &'static str,
    raw: Map<String, Value>,
) -> Result<T, DecodeError> {
    T::deserialize(TextValue(Value::Object(raw))).map_err(|err| DecodeError {
        part,
        message: err.to_string(),
    })
}

pub(crate) fn params_object(params: &ParamVec) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect()
}

/// Query pairs as an object; a key seen more than once becomes an array.
pub(crate) fn query_object(pairs: &QueryVec) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        match map.get_mut(k) {
            Some(Value::Array(items)) => items.push(Value::String(v.clone())),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(v.clone())]);
            }
            None => {
                map.insert(k.clone(), Value::String(v.clone()));
            }
        }
    }
    map
}

/// Headers as an object with lower-cased names
pub(crate) fn headers_object(headers: &HeaderVec) -> Map<String, Value> {
    headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), Value::String(v.clone())))
        .collect()
}

/// Decode the JSON body; an absent body decodes from `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: Option<Value>) -> Result<T, DecodeError> {
    serde_json::from_value(body.unwrap_or(Value::Null)).map_err(|err| DecodeError {
        part: "body",
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Paging {
        limit: u32,
        tag: String,
    }

    fn pairs(items: &[(&str, &str)]) -> QueryVec {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_each_field_parsed_by_its_own_type() {
        let paging: Paging =
            decode_strings("querystring", query_object(&pairs(&[("limit", "10"), ("tag", "7")])))
                .unwrap();
        assert_eq!(
            paging,
            Paging {
                limit: 10,
                tag: "7".to_string()
            }
        );

        let paging: Paging =
            decode_strings("querystring", query_object(&pairs(&[("limit", "10"), ("tag", "new")])))
                .unwrap();
        assert_eq!(paging.tag, "new");
    }

    #[test]
    fn test_full_unsigned_range() {
        #[derive(Debug, Deserialize)]
        struct Big {
            id: u64,
        }
        let mut params = ParamVec::new();
        params.push((Arc::from("id"), u64::MAX.to_string()));
        let big: Big = decode_strings("params", params_object(&params)).unwrap();
        assert_eq!(big.id, u64::MAX);
    }

    #[test]
    fn test_optional_bool_and_single_value_list() {
        #[derive(Debug, Deserialize)]
        struct Filters {
            archived: Option<bool>,
            missing: Option<u32>,
            tag: Vec<String>,
            ids: Vec<u16>,
        }
        let filters: Filters = decode_strings(
            "querystring",
            query_object(&pairs(&[("archived", "true"), ("tag", "a"), ("ids", "1"), ("ids", "2")])),
        )
        .unwrap();
        assert_eq!(filters.archived, Some(true));
        assert_eq!(filters.missing, None);
        assert_eq!(filters.tag, vec!["a".to_string()]);
        assert_eq!(filters.ids, vec![1, 2]);
    }

    #[test]
    fn test_unconstrained_value_keeps_strings() {
        let query = query_object(&pairs(&[("n", "1"), ("t", "a"), ("t", "b")]));
        let v: Value = decode_strings("querystring", query).unwrap();
        assert_eq!(v, serde_json::json!({"n": "1", "t": ["a", "b"]}));
    }

    #[test]
    fn test_coerce_for_documents() {
        assert_eq!(coerce("-3"), Value::from(-3));
        assert_eq!(coerce(&u64::MAX.to_string()), Value::from(u64::MAX));
        assert_eq!(coerce("1.5"), Value::from(1.5));
        assert_eq!(coerce("false"), Value::from(false));
        assert_eq!(coerce("inf"), Value::from("inf"));
    }

    #[test]
    fn test_repeated_query_keys_become_array() {
        let obj = query_object(&pairs(&[("t", "a"), ("t", "b"), ("t", "c"), ("x", "1")]));
        assert_eq!(obj["t"], serde_json::json!(["a", "b", "c"]));
        assert_eq!(obj["x"], "1");
    }

    #[test]
    fn test_headers_lowercased() {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("X-Token"), "abc".to_string()));
        let obj = headers_object(&headers);
        assert_eq!(obj["x-token"], "abc");
    }

    #[test]
    fn test_missing_body_is_null() {
        let v: Value = decode_body(None).unwrap();
        assert!(v.is_null());
        let opt: Option<Paging> = decode_body(None).unwrap();
        assert!(opt.is_none());
        let err = decode_body::<Paging>(None).unwrap_err();
        assert_eq!(err.part, "body");
    }

    #[test]
    fn test_error_names_the_offending_string() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Id {
            id: u8,
        }
        let mut params = ParamVec::new();
        params.push((Arc::from("id"), "300".to_string()));
        let err = decode_strings::<Id>("params", params_object(&params)).unwrap_err();
        assert_eq!(err.part, "params");
        assert!(err.message.contains("string"));
    }
}
