use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::MalformedInput;

pub const DEFAULT_YEAR: &str = "2012";
pub const DEFAULT_TITLE: &str = "The Amazing Spider-Man 2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub year: String,
    pub title: String,
}

impl Record {
    /// The record written when a request arrives without a body.
    pub fn with_default_payload() -> Self {
        Record {
            id: Uuid::new_v4().to_string(),
            year: DEFAULT_YEAR.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, MalformedInput> {
        Ok(Record {
            id: required(fields, "id")?,
            year: required(fields, "year")?,
            title: required(fields, "title")?,
        })
    }
}

/// Parses a raw request body into its top-level JSON object.
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>, MalformedInput> {
    let body = std::str::from_utf8(body)?;
    match serde_json::from_str(body)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(MalformedInput::NotAnObject),
    }
}

/// String form of a JSON value: strings verbatim, everything else as compact JSON.
/// `null` has no string form.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn required(fields: &Map<String, Value>, name: &'static str) -> Result<String, MalformedInput> {
    fields
        .get(name)
        .and_then(text_of)
        .ok_or(MalformedInput::MissingField(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn coerces_scalars_to_strings() {
        let fields = parse_body(br#"{"id": 42, "year": 1999, "title": "The Matrix"}"#).unwrap();
        let record = Record::from_fields(&fields).unwrap();

        assert_eq!(
            record,
            Record {
                id: "42".to_string(),
                year: "1999".to_string(),
                title: "The Matrix".to_string(),
            }
        );
    }

    #[test]
    fn keeps_string_fields_verbatim() {
        let fields =
            parse_body(br#"{"id": "abc-1", "year": "2001", "title": "Spirited Away", "extra": true}"#)
                .unwrap();
        let record = Record::from_fields(&fields).unwrap();

        assert_eq!(record.id, "abc-1");
        assert_eq!(record.year, "2001");
        assert_eq!(record.title, "Spirited Away");
    }

    #[test]
    fn fractional_year_keeps_decimal_form() {
        let fields = parse_body(br#"{"id": "x", "year": 2012.5, "title": "t"}"#).unwrap();
        assert_eq!(Record::from_fields(&fields).unwrap().year, "2012.5");
    }

    #[test]
    fn missing_or_null_field_is_rejected() {
        let fields = parse_body(br#"{"id": "x", "title": "t"}"#).unwrap();
        assert!(matches!(
            Record::from_fields(&fields),
            Err(MalformedInput::MissingField("year"))
        ));

        let fields = parse_body(br#"{"id": null, "year": 1, "title": "t"}"#).unwrap();
        assert!(matches!(
            Record::from_fields(&fields),
            Err(MalformedInput::MissingField("id"))
        ));
    }

    #[test]
    fn rejects_invalid_json_and_non_objects() {
        assert!(matches!(
            parse_body(b"not json"),
            Err(MalformedInput::InvalidJson(_))
        ));
        assert!(matches!(
            parse_body(br#"["id", "year"]"#),
            Err(MalformedInput::NotAnObject)
        ));
    }

    #[test]
    fn rejects_bodies_that_are_not_utf8() {
        assert!(matches!(
            parse_body(b"{\"id\": \"a\", \"year\": 2001, \"title\": \"X\xff\"}"),
            Err(MalformedInput::NotText(_))
        ));
    }

    #[test]
    fn default_payload_gets_a_fresh_id_each_time() {
        let ids: HashSet<String> = (0..100)
            .map(|_| {
                let record = Record::with_default_payload();
                assert_eq!(record.year, DEFAULT_YEAR);
                assert_eq!(record.title, DEFAULT_TITLE);
                record.id
            })
            .collect();

        assert_eq!(ids.len(), 100);
    }
}
