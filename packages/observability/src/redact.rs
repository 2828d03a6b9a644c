//! Field redaction for session credentials.
//!
//! Bearer tokens, JWTs and provider access tokens travel through the guard
//! on every request. Nothing that looks like one may reach the log file.

use serde_json::{Map, Value};
use std::collections::HashMap;

const REDACTED: &str = "[REDACTED]";

const DENYLIST_KEYS: [&str; 9] = [
    "token",
    "access_token",
    "accesstoken",
    "jwt",
    "authorization",
    "cookie",
    "set_cookie",
    "code",
    "secret",
];

/// Returns true when a field name denotes a credential.
pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    DENYLIST_KEYS.iter().any(|denied| lower == *denied)
        || lower.ends_with("_token")
        || lower.ends_with("_jwt")
}

/// Heuristic for values that carry credentials regardless of field name.
pub fn looks_like_sensitive_value(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("bearer ") {
        return true;
    }
    // Compact JWS: three base64url segments.
    raw.matches('.').count() == 2 && raw.len() > 40 && !raw.contains(char::is_whitespace)
}

pub fn sanitize_fields(fields: HashMap<String, Value>) -> HashMap<String, Value> {
    fields
        .into_iter()
        .map(|(k, v)| {
            let v = sanitize_value(&k, v);
            (k, v)
        })
        .collect()
}

fn sanitize_value(key: &str, value: Value) -> Value {
    if is_sensitive_key(key) {
        return Value::String(REDACTED.to_string());
    }

    match value {
        Value::String(s) if looks_like_sensitive_value(&s) => Value::String(REDACTED.to_string()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                let v = sanitize_value(&k, v);
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| sanitize_value(key, v)).collect())
        }
        other => other,
    }
}
