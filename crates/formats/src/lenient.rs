//! Forgiving field decoders for records produced by a language model.
//!
//! The chat-history service writes its summary by hand, so field types drift:
//! a budget comes back as `5000`, a missing value as `null`, a participant
//! list as one comma-separated string. These decoders accept those shapes and
//! only reject values that cannot be read as text at all (nested objects).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes a text field. `null` becomes empty, numbers and booleans are
/// rendered, and an array of scalars is joined with `", "`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => {
            let parts = items
                .into_iter()
                .map(scalar_to_string)
                .collect::<Result<Vec<_>, _>>()
                .map_err(D::Error::custom)?;
            Ok(parts
                .into_iter()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "))
        }
        other => scalar_to_string(other)
            .map(Option::unwrap_or_default)
            .map_err(D::Error::custom),
    }
}

/// Decodes a list of names. An array keeps its text entries as written and
/// drops `null`s; a single comma-separated string is split, trimmed, and
/// blank pieces dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(split_names(&s)),
        Value::Array(items) => Ok(items
            .into_iter()
            .map(scalar_to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom)?
            .into_iter()
            .flatten()
            .collect()),
        other => Ok(scalar_to_string(other)
            .map_err(D::Error::custom)?
            .into_iter()
            .collect()),
    }
}

fn split_names(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn scalar_to_string(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) => Err("expected a text value, found a nested list".to_string()),
        Value::Object(_) => Err("expected a text value, found an object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::string")]
        text: String,
        #[serde(default, deserialize_with = "super::string_list")]
        list: Vec<String>,
    }

    fn probe(json: &str) -> Result<Probe, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn scalars_become_text() {
        assert_eq!(probe(r#"{"text": 5000}"#).unwrap().text, "5000");
        assert_eq!(probe(r#"{"text": 12.5}"#).unwrap().text, "12.5");
        assert_eq!(probe(r#"{"text": true}"#).unwrap().text, "true");
        assert_eq!(probe(r#"{"text": null}"#).unwrap().text, "");
        assert_eq!(probe(r#"{}"#).unwrap().text, "");
    }

    #[test]
    fn text_arrays_are_joined() {
        let p = probe(r#"{"text": ["Jun 15", null, "Jun 22"]}"#).unwrap();
        assert_eq!(p.text, "Jun 15, Jun 22");
    }

    #[test]
    fn objects_are_rejected() {
        assert!(probe(r#"{"text": {"amount": 5}}"#).is_err());
        assert!(probe(r#"{"list": [{"name": "Ana"}]}"#).is_err());
    }

    #[test]
    fn list_accepts_csv_and_arrays() {
        let p = probe(r#"{"list": " Ana, Ben ,, Cleo "}"#).unwrap();
        assert_eq!(p.list, vec!["Ana", "Ben", "Cleo"]);

        let p = probe(r#"{"list": ["Ana", null, 7]}"#).unwrap();
        assert_eq!(p.list, vec!["Ana", "7"]);

        assert!(probe(r#"{"list": null}"#).unwrap().list.is_empty());
    }

    #[test]
    fn array_entries_are_kept_verbatim() {
        let p = probe(r#"{"list": [" Ana ", "", "Smith, Jr."]}"#).unwrap();
        assert_eq!(p.list, vec![" Ana ", "", "Smith, Jr."]);
    }
}
