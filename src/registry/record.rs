//! Student record types
//!
//! A stored student document is a flat string map with exactly five
//! capitalized keys. `StudentSubmission` is the raw, unvalidated form of
//! those fields as received from a caller; `StudentFields` only exists
//! after validation succeeded.

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Document key for the student's name
pub const NAME: &str = "Name";
/// Document key for the email address
pub const EMAIL: &str = "Email";
/// Document key for the contact number
pub const CONTACT: &str = "Contact";
/// Document key for gender
pub const GENDER: &str = "Gender";
/// Document key for the chosen stream
pub const STREAM: &str = "Stream";

/// All business keys, in form order
pub const FIELD_KEYS: [&str; 5] = [NAME, EMAIL, CONTACT, GENDER, STREAM];

/// Raw submission as supplied by a request handler.
///
/// Every field may be absent. Accepts both the lowercase form names
/// (`name`, `email`, ...) and the stored document keys (`Name`, `Email`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSubmission {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "Contact")]
    pub contact: Option<String>,
    #[serde(default, alias = "Gender")]
    pub gender: Option<String>,
    #[serde(default, alias = "Stream")]
    pub stream: Option<String>,
}

impl StudentSubmission {
    /// Build a submission with every field present
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        contact: impl Into<String>,
        gender: impl Into<String>,
        stream: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            contact: Some(contact.into()),
            gender: Some(gender.into()),
            stream: Some(stream.into()),
        }
    }
}

/// The five business fields of a student, known to be valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Contact")]
    pub contact: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Stream")]
    pub stream: String,
}

impl StudentFields {
    /// Convert into the store's document representation
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(NAME.to_string(), self.name.clone());
        doc.insert(EMAIL.to_string(), self.email.clone());
        doc.insert(CONTACT.to_string(), self.contact.clone());
        doc.insert(GENDER.to_string(), self.gender.clone());
        doc.insert(STREAM.to_string(), self.stream.clone());
        doc
    }

    /// Read the five fields back out of a stored document.
    ///
    /// Keys missing from the document read as empty strings; the store
    /// never holds such documents when written through this crate.
    pub fn from_document(doc: &Document) -> Self {
        let field = |key: &str| doc.get(key).cloned().unwrap_or_default();
        Self {
            name: field(NAME),
            email: field(EMAIL),
            contact: field(CONTACT),
            gender: field(GENDER),
            stream: field(STREAM),
        }
    }
}

impl From<StudentFields> for StudentSubmission {
    fn from(fields: StudentFields) -> Self {
        Self {
            name: Some(fields.name),
            email: Some(fields.email),
            contact: Some(fields.contact),
            gender: Some(fields.gender),
            stream: Some(fields.stream),
        }
    }
}

/// A persisted student: store-assigned id plus the five fields.
///
/// Serializes flat, as `{"id": ..., "Name": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: StudentFields,
}

impl StudentRecord {
    pub fn new(id: impl Into<String>, fields: StudentFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn from_document(id: impl Into<String>, doc: &Document) -> Self {
        Self::new(id, StudentFields::from_document(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> StudentFields {
        StudentFields {
            name: "Asha".into(),
            email: "asha@test.in".into(),
            contact: "+919876543210".into(),
            gender: "F".into(),
            stream: "Science".into(),
        }
    }

    #[test]
    fn test_document_uses_capitalized_keys() {
        let doc = fields().to_document();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        let mut expected = FIELD_KEYS.to_vec();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(doc[EMAIL], "asha@test.in");
    }

    #[test]
    fn test_from_document_missing_key_is_empty() {
        let mut doc = fields().to_document();
        doc.remove(STREAM);
        let back = StudentFields::from_document(&doc);
        assert_eq!(back.stream, "");
        assert_eq!(back.name, "Asha");
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = StudentRecord::new("abc", fields());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["Name"], "Asha");
        assert_eq!(json["Contact"], "+919876543210");
    }

    #[test]
    fn test_submission_accepts_both_key_styles() {
        let lower: StudentSubmission =
            serde_json::from_str(r#"{"name":"A","email":"a@b.com"}"#).unwrap();
        let upper: StudentSubmission =
            serde_json::from_str(r#"{"Name":"A","Email":"a@b.com"}"#).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.contact, None);
    }
}
