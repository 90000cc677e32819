//! Conversion of serializable view data into template [`Value`]s.

use gtmpl_value::Value;
use serde::Serialize;
use std::collections::HashMap;

/// Converts anything [`Serialize`] into a template [`Value`] by way of
/// [`serde_json::Value`]. `null` becomes [`Value::Nil`] so `{{if .field}}`
/// reads naturally for optional fields.
pub fn to_value<T: Serialize>(item: &T) -> Result<Value, serde_json::Error> {
    Ok(from_json(serde_json::to_value(item)?))
}

fn from_json(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => Value::from(u),
            (None, Some(i), _) => Value::from(i),
            (None, None, Some(f)) => Value::from(f),
            (None, None, None) => Value::Nil,
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        Json::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect::<HashMap<String, Value>>(),
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        title: &'static str,
        page: usize,
        next: Option<usize>,
        tags: Vec<&'static str>,
    }

    #[test]
    fn test_to_value() -> Result<(), serde_json::Error> {
        let value = to_value(&Item {
            title: "DPI",
            page: 2,
            next: None,
            tags: vec!["a", "b"],
        })?;
        match value {
            Value::Object(m) => {
                assert!(matches!(m.get("title"), Some(Value::String(s)) if s == "DPI"));
                assert!(matches!(m.get("page"), Some(Value::Number(_))));
                assert!(matches!(m.get("next"), Some(Value::Nil)));
                match m.get("tags") {
                    Some(Value::Array(tags)) => assert_eq!(2, tags.len()),
                    other => panic!("expected array, got {:?}", other),
                }
            }
            other => panic!("expected object, got {:?}", other),
        }
        Ok(())
    }
}
