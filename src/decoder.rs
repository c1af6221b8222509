//! Transaction payload decoding.
//!
//! Payloads are UTF-8 JSON objects discriminated by a case-insensitive `type`
//! field. Decoding is pure; callers drop anything that fails.

use std::fmt;

use serde_json::{Map, Value};

use crate::event::{FeedEvent, PostId};

/// Why a payload was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    InvalidUtf8,
    InvalidJson(String),
    NotAnObject,
    MissingType,
    UnknownType(String),
    MissingField(&'static str),
    InvalidField(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidUtf8 => write!(f, "payload is not valid UTF-8"),
            DecodeError::InvalidJson(e) => write!(f, "payload is not valid JSON: {}", e),
            DecodeError::NotAnObject => write!(f, "payload is not a JSON object"),
            DecodeError::MissingType => write!(f, "payload has no string `type` field"),
            DecodeError::UnknownType(t) => write!(f, "unrecognized payload type {:?}", t),
            DecodeError::MissingField(name) => write!(f, "missing required field `{}`", name),
            DecodeError::InvalidField(name) => write!(f, "field `{}` has the wrong type", name),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode one raw transaction payload into a feed event.
pub fn decode(raw: &[u8]) -> Result<FeedEvent, DecodeError> {
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;

    if kind.eq_ignore_ascii_case("post") {
        decode_post(&fields)
    } else if kind.eq_ignore_ascii_case("like") {
        decode_like(&fields)
    } else {
        Err(DecodeError::UnknownType(kind.to_string()))
    }
}

fn decode_post(fields: &Map<String, Value>) -> Result<FeedEvent, DecodeError> {
    let id = required_id(fields, "id")?;
    Ok(FeedEvent::post(
        id.0,
        optional_str(fields, "sender"),
        optional_str(fields, "post"),
        timestamp(fields),
    ))
}

fn decode_like(fields: &Map<String, Value>) -> Result<FeedEvent, DecodeError> {
    let post_id = required_id(fields, "postId")?;
    let sender = match fields.get("sender") {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("sender")),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(DecodeError::InvalidField("sender")),
    };
    Ok(FeedEvent::like(post_id.0, sender, timestamp(fields)))
}

fn required_id(fields: &Map<String, Value>, name: &'static str) -> Result<PostId, DecodeError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(name)),
        Some(value) => as_whole_u64(value)
            .map(PostId)
            .ok_or(DecodeError::InvalidField(name)),
    }
}

fn optional_str(fields: &Map<String, Value>, name: &str) -> String {
    fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn timestamp(fields: &Map<String, Value>) -> i64 {
    fields
        .get("timestamp")
        .and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        })
        .unwrap_or(0)
}

/// 2^53; above this not every integer has an exact `f64`.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

// JSON numbers written by float-only encoders arrive as e.g. `3.0`.
fn as_whole_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < MAX_EXACT_FLOAT {
        Some(f as u64)
    } else {
        None
    }
}
