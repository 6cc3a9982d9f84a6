//! Scalar field values and the field map every record carries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single scalar stored in a record field.
///
/// URL-valued fields are plain `Text` here; the schema (`FieldKind::Url`)
/// carries the distinction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Blank means "not filled in": text that is empty after trimming.
    ///
    /// Booleans and timestamps are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Field name → value map of one record (or of a partial update).
///
/// Ordered by field name so that equal maps compare and print identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overwrite every key present in `patch`; keys absent from it stay as they are.
    pub fn merge(&mut self, patch: &Fields) {
        for (name, value) in &patch.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Required text field.
    pub fn text(&self, name: &str) -> DomainResult<&str> {
        self.opt_text(name)?
            .ok_or_else(|| DomainError::schema(format!("missing text field '{name}'")))
    }

    /// Optional text field; present-but-wrong-type is still an error.
    pub fn opt_text(&self, name: &str) -> DomainResult<Option<&str>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(FieldValue::Text(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(name, "text", other)),
        }
    }

    pub fn bool(&self, name: &str) -> DomainResult<bool> {
        self.opt_bool(name)?
            .ok_or_else(|| DomainError::schema(format!("missing bool field '{name}'")))
    }

    pub fn opt_bool(&self, name: &str) -> DomainResult<Option<bool>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(FieldValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(name, "bool", other)),
        }
    }

    pub fn timestamp(&self, name: &str) -> DomainResult<DateTime<Utc>> {
        self.opt_timestamp(name)?
            .ok_or_else(|| DomainError::schema(format!("missing timestamp field '{name}'")))
    }

    pub fn opt_timestamp(&self, name: &str) -> DomainResult<Option<DateTime<Utc>>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(FieldValue::Timestamp(t)) => Ok(Some(*t)),
            Some(other) => Err(mismatch(name, "timestamp", other)),
        }
    }
}

fn mismatch(name: &str, expected: &str, found: &FieldValue) -> DomainError {
    DomainError::schema(format!(
        "field '{name}' should be {expected}, found {}",
        found.kind_name()
    ))
}

impl FromIterator<(String, FieldValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_is_whitespace_only_text() {
        assert!(FieldValue::text("   ").is_blank());
        assert!(FieldValue::text("").is_blank());
        assert!(!FieldValue::text(" x ").is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }

    #[test]
    fn merge_overwrites_only_patched_keys() {
        let mut fields = Fields::new().with("title", "Old").with("completed", false);
        fields.merge(&Fields::new().with("completed", true));

        assert_eq!(fields.text("title").unwrap(), "Old");
        assert!(fields.bool("completed").unwrap());
    }

    #[test]
    fn typed_accessors_report_mismatch() {
        let fields = Fields::new().with("completed", "yes");
        let err = fields.bool("completed").unwrap_err();
        assert!(matches!(err, DomainError::Schema(m) if m.contains("should be bool")));
        assert_eq!(fields.opt_text("missing").unwrap(), None);
        assert!(fields.text("missing").is_err());
    }

    #[test]
    fn serde_keeps_value_kinds_apart() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let fields = Fields::new()
            .with("name", "2024-05-01T12:00:00Z")
            .with("timestamp", at);

        let json = serde_json::to_string(&fields).unwrap();
        let back: Fields = serde_json::from_str(&json).unwrap();

        assert_eq!(back, fields);
        assert_eq!(back.opt_text("name").unwrap(), Some("2024-05-01T12:00:00Z"));
        assert_eq!(back.timestamp("timestamp").unwrap(), at);
    }
}
