//! Book model for storage and display.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Editable;
use crate::error::AppError;

/// Editable fields of a book, as stored at `books/{id}`.
///
/// All fields are free text; empty strings are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub author: String,
    /// Publication date as entered (not validated as a date)
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub publication_date: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub publisher: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub genre: String,
}

impl Editable for BookFields {
    const FIELDS: &'static [&'static str] =
        &["name", "author", "publicationDate", "publisher", "genre"];

    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "author" => Some(&self.author),
            "publicationDate" => Some(&self.publication_date),
            "publisher" => Some(&self.publisher),
            "genre" => Some(&self.genre),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "author" => Some(&mut self.author),
            "publicationDate" => Some(&mut self.publication_date),
            "publisher" => Some(&mut self.publisher),
            "genre" => Some(&mut self.genre),
            _ => None,
        }
    }
}

/// A book as mirrored from the shared collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    /// Generated identifier (the child key under `books`)
    pub id: String,
    pub fields: BookFields,
}

impl Book {
    /// Decode one child of the books collection, injecting its key as the id.
    pub fn from_value(id: &str, value: Value) -> Result<Self, AppError> {
        let fields: BookFields = serde_json::from_value(value)
            .map_err(|e| AppError::Decode(format!("books/{}: {}", id, e)))?;
        Ok(Self {
            id: id.to_string(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let book = Book::from_value("-Nabc", json!({ "name": "Dune" })).unwrap();
        assert_eq!(book.id, "-Nabc");
        assert_eq!(book.fields.name, "Dune");
        assert_eq!(book.fields.author, "");
    }

    #[test]
    fn test_non_string_fields_kept_as_text() {
        let book = Book::from_value(
            "-Nabc",
            json!({ "name": "Dune", "publicationDate": 1965, "genre": null, "publisher": true }),
        )
        .unwrap();
        assert_eq!(book.fields.publication_date, "1965");
        assert_eq!(book.fields.genre, "");
        assert_eq!(book.fields.publisher, "true");
    }

    #[test]
    fn test_non_object_is_decode_error() {
        let err = Book::from_value("-Nabc", json!("not a book")).unwrap_err();
        assert!(matches!(err, AppError::Decode(msg) if msg.starts_with("books/-Nabc")));
    }

    #[test]
    fn test_every_listed_field_is_editable() {
        let mut fields = BookFields::default();
        for key in BookFields::FIELDS {
            *fields.field_mut(key).unwrap() = key.to_string();
            assert_eq!(fields.field(key), Some(*key));
        }
        assert_eq!(serde_json::to_value(&fields).unwrap()["publicationDate"], "publicationDate");
    }

    #[test]
    fn test_serializes_camel_case_without_id() {
        let fields = BookFields {
            publication_date: "1965".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["publicationDate"], "1965");
        assert!(value.get("id").is_none());
    }
}
