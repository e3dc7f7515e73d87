//! Conversion between Firestore typed values and plain JSON.
//!
//! The REST API wraps every field in a single-key object naming its type:
//!
//! | JSON | Firestore |
//! |------|-----------|
//! | `null` | `{"nullValue": null}` |
//! | `true` | `{"booleanValue": true}` |
//! | `42` | `{"integerValue": "42"}` |
//! | `1.5` | `{"doubleValue": 1.5}` |
//! | `"s"` | `{"stringValue": "s"}` |
//! | `[..]` | `{"arrayValue": {"values": [..]}}` |
//! | `{..}` | `{"mapValue": {"fields": {..}}}` |
//!
//! `timestampValue`, `referenceValue`, and `bytesValue` decode to strings.
//! Models go through `serde_json::Value` on the way in and out, so any
//! `Serialize`/`DeserializeOwned` type can be stored as a document.

use anyhow::{anyhow, bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};

pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), encode(v))).collect()
}

pub fn decode(value: &Value) -> Result<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("Firestore value must be an object, got {}", value))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| anyhow!("Firestore value has no type tag"))?;

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(
            inner
                .as_bool()
                .ok_or_else(|| anyhow!("booleanValue is not a bool"))?,
        ),
        "integerValue" => {
            // Usually a decimal string, but accept a bare number too.
            let n: i64 = match inner {
                Value::String(s) => s
                    .parse()
                    .with_context(|| format!("invalid integerValue '{}'", s))?,
                Value::Number(n) => n
                    .as_i64()
                    .ok_or_else(|| anyhow!("integerValue out of range: {}", n))?,
                other => bail!("invalid integerValue {}", other),
            };
            Value::from(n)
        }
        "doubleValue" => match inner {
            Value::Number(_) => inner.clone(),
            // NaN and infinities arrive as strings and have no JSON form.
            Value::String(_) => Value::Null,
            other => bail!("invalid doubleValue {}", other),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Value::String(
            inner
                .as_str()
                .ok_or_else(|| anyhow!("{} is not a string", kind))?
                .to_string(),
        ),
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items.iter().map(decode).collect::<Result<_>>()?,
                Some(other) => bail!("arrayValue.values is not an array: {}", other),
                None => Vec::new(),
            };
            Value::Array(values)
        }
        "mapValue" => Value::Object(match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields)?,
            Some(other) => bail!("mapValue.fields is not an object: {}", other),
            None => Map::new(),
        }),
        other => bail!("unsupported Firestore value type '{}'", other),
    };
    Ok(decoded)
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(k, v)| {
            decode(v)
                .with_context(|| format!("field '{}'", k))
                .map(|d| (k.clone(), d))
        })
        .collect()
}

/// Deserialize a Firestore document's `fields` into `T`.
pub fn from_document<T: DeserializeOwned>(doc: &Value) -> Result<T> {
    let fields = match doc.get("fields") {
        Some(Value::Object(fields)) => decode_fields(fields)?,
        Some(other) => bail!("document fields is not an object: {}", other),
        None => Map::new(),
    };
    serde_json::from_value(Value::Object(fields)).context("document does not match model")
}

/// Serialize `value` into a Firestore document body (`{"fields": ...}`).
pub fn to_document<T: Serialize>(value: &T) -> Result<Value> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(json!({ "fields": encode_fields(&map) })),
        other => bail!("only objects can be stored as documents, got {}", other),
    }
}
