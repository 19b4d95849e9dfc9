//! Tag lists as edited by the admin and as persisted (JSON text column).

use serde_json::Value;

/// Trim, drop empties and exact duplicates. First occurrence order is kept
/// since tags are redisplayed in the order the editor entered them.
pub fn normalize(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

/// Decode a persisted tag list. Non-string entries are skipped.
pub fn decode(text: &str) -> Result<Vec<String>, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(serde::de::Error::custom(format!("expected a JSON array of tags, got {}", other))),
    }
}

pub fn encode(tags: &[String]) -> String {
    // A Vec<String> always serializes
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_order() {
        let tags = vec![" AI ".into(), "NLP".into(), "".into(), "AI".into(), "Ethics".into()];
        assert_eq!(normalize(tags), vec!["AI", "NLP", "Ethics"]);
    }

    #[test]
    fn decode_accepts_legacy_shapes() {
        assert_eq!(decode(r#"["a","b"]"#).unwrap(), vec!["a", "b"]);
        assert_eq!(decode("").unwrap(), Vec::<String>::new());
        assert_eq!(decode("null").unwrap(), Vec::<String>::new());
        assert_eq!(decode(r#"["a",1,"a"]"#).unwrap(), vec!["a", "a"]);
        assert!(decode(r#"{"a":1}"#).is_err());
        assert!(decode("not json").is_err());
    }

    #[test]
    fn encode_is_json_array() {
        assert_eq!(encode(&["AI".to_string(), "NLP".to_string()]), r#"["AI","NLP"]"#);
    }
}
