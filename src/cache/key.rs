//! Deterministic cache key construction.
//!
//! Keys are `"{namespace}:{canonical params}"`. Object fields are emitted in
//! sorted order so two logically identical requests map to the same key,
//! including across process restarts where durable entries must stay
//! addressable.

use serde::Serialize;
use serde_json::Value;

/// Build a cache key from a namespace and request parameters.
///
/// # Errors
/// Returns the serializer error if `params` cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn cache_key<P>(namespace: &str, params: &P) -> Result<String, serde_json::Error>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params)?;
    let mut key = String::with_capacity(namespace.len() + 32);
    key.push_str(namespace);
    key.push(':');
    write_canonical(&value, &mut key);
    Ok(key)
}

/// Prefix matching every key built with `namespace`.
pub fn namespace_prefix(namespace: &str) -> String {
    format!("{namespace}:")
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<_> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Query {
        range: &'static str,
        account: u32,
    }

    #[derive(Serialize)]
    struct Reordered {
        account: u32,
        range: &'static str,
    }

    #[test]
    fn key_is_prefixed_with_namespace() {
        let key = cache_key("cost-breakdown", &json!({"month": "2025-01"})).unwrap();
        assert_eq!(key, r#"cost-breakdown:{"month":"2025-01"}"#);
    }

    #[test]
    fn field_order_does_not_change_key() {
        let a = cache_key("q", &Query { range: "7d", account: 4 }).unwrap();
        let b = cache_key("q", &Reordered { account: 4, range: "7d" }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn nested_objects_are_canonicalized() {
        let mut first = HashMap::new();
        first.insert("z", json!({"b": 1, "a": [2, {"d": 3, "c": 4}]}));
        first.insert("y", json!(null));
        let key = cache_key("n", &first).unwrap();
        assert_eq!(key, r#"n:{"y":null,"z":{"a":[2,{"c":4,"d":3}],"b":1}}"#);
    }

    #[test]
    fn array_order_is_significant() {
        let a = cache_key("ids", &[1, 2]).unwrap();
        let b = cache_key("ids", &[2, 1]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn string_fields_are_escaped() {
        let key = cache_key("s", &json!({"q": "a\"b"})).unwrap();
        assert_eq!(key, r#"s:{"q":"a\"b"}"#);
    }

    #[test]
    fn namespace_prefix_matches_built_keys() {
        let key = cache_key("usage", &json!({"day": 1})).unwrap();
        assert!(key.starts_with(&namespace_prefix("usage")));
        assert!(!key.starts_with(&namespace_prefix("usag")));
    }
}
