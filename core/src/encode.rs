//! Parameter encoding for GET query strings and POST JSON bodies.
//!
//! # Design
//! Every parameter type goes through `serde_json::Value` before it becomes a
//! query, so the `skip_serializing_if` rules that drop absent fields apply
//! the same way to both verbs. The value is then dispatched on its JSON type:
//! strings verbatim, booleans as `true`/`false`, numbers as integers, and
//! anything compound as compact JSON.

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::{BotApiError, Result};

/// Encode `params` as ordered query pairs.
///
/// `None`, or a value that serializes to `null`, yields no pairs. Fields that
/// serialize to `null` are left out. Pairs are ordered by key.
pub fn encode_query<P>(params: Option<&P>) -> Result<Vec<(String, String)>>
where
    P: Serialize + ?Sized,
{
    let Some(params) = params else {
        return Ok(Vec::new());
    };

    let fields = match serde_json::to_value(params).map_err(BotApiError::Encoding)? {
        Value::Null => return Ok(Vec::new()),
        Value::Object(fields) => fields,
        other => {
            return Err(BotApiError::Encoding(serde_json::Error::custom(format!(
                "query parameters must be an object, got {}",
                json_type(&other)
            ))))
        }
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => integer_string(&n),
            compound => serde_json::to_string(&compound).map_err(BotApiError::Encoding)?,
        };
        pairs.push((key, rendered));
    }
    // serde_json's map only sorts keys without `preserve_order`.
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

/// Encode `params` as a JSON request body. `None` means no body.
pub fn encode_body<P>(params: Option<&P>) -> Result<Option<Vec<u8>>>
where
    P: Serialize + ?Sized,
{
    params
        .map(|p| serde_json::to_vec(p).map_err(BotApiError::Encoding))
        .transpose()
}

/// Render a JSON number as a decimal integer. Floats are truncated toward
/// zero, so `2.9` becomes `"2"` and `100.0` becomes `"100"`.
fn integer_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let truncated = n.as_f64().unwrap_or_default().trunc();
    if truncated == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{truncated:.0}")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
