//! Per-entity field schemas and the local validation run before any mutation.
//!
//! Validation here is client-side only: the gateway never re-validates, and a
//! request that fails these checks must never reach the network.

use chrono::{DateTime, Utc};

use crate::error::{DomainError, DomainResult};
use crate::value::{FieldValue, Fields};

/// Expected value kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Text holding a URL (links, image locations, data URLs).
    Url,
    Bool,
    Timestamp,
}

impl FieldKind {
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text | FieldKind::Url, FieldValue::Text(_))
                | (FieldKind::Bool, FieldValue::Bool(_))
                | (FieldKind::Timestamp, FieldValue::Timestamp(_))
        )
    }
}

/// Value filled in on create when the caller did not supply the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    None,
    Text(&'static str),
    Bool(bool),
    /// The creation instant.
    Now,
}

impl FieldDefault {
    fn resolve(self, now: DateTime<Utc>) -> Option<FieldValue> {
        match self {
            FieldDefault::None => None,
            FieldDefault::Text(s) => Some(FieldValue::text(s)),
            FieldDefault::Bool(b) => Some(FieldValue::Bool(b)),
            FieldDefault::Now => Some(FieldValue::Timestamp(now)),
        }
    }
}

/// Schema entry for one field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Must be non-blank on create, and non-blank whenever present in an update.
    pub required: bool,
    /// Entered by the user in the create modal.
    pub input: bool,
    /// Pre-populated and submitted by the edit modal.
    pub editable: bool,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            input: true,
            editable: true,
            default: FieldDefault::None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            input: true,
            editable: true,
            default: FieldDefault::None,
        }
    }

    /// A field the client fills in itself (never shown as a form input).
    pub const fn generated(name: &'static str, kind: FieldKind, default: FieldDefault) -> Self {
        Self {
            name,
            kind,
            required: false,
            input: false,
            editable: false,
            default,
        }
    }

    pub const fn or_default(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    /// Shown on create, locked in the edit modal.
    pub const fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }
}

/// Look up a field by name.
pub fn field<'a>(schema: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    schema.iter().find(|spec| spec.name == name)
}

/// Validate a create request and fill defaults.
///
/// Rejects unknown fields, wrong value kinds and blank required fields. Every
/// blank required field is reported at once so the form can show them together.
pub fn prepare_create(schema: &[FieldSpec], input: Fields, now: DateTime<Utc>) -> DomainResult<Fields> {
    check_shape(schema, &input)?;

    let missing: Vec<&str> = schema
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| input.get(spec.name).is_none_or(FieldValue::is_blank))
        .map(|spec| spec.name)
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::validation(format!(
            "please fill in: {}",
            missing.join(", ")
        )));
    }

    let mut prepared = input;
    for spec in schema {
        if prepared.contains(spec.name) {
            continue;
        }
        if let Some(value) = spec.default.resolve(now) {
            prepared.insert(spec.name, value);
        }
    }
    Ok(prepared)
}

/// Validate a partial update.
///
/// Only the submitted keys are checked; a required field may be left out of a
/// patch but may not be blanked by it.
pub fn prepare_patch(schema: &[FieldSpec], patch: Fields) -> DomainResult<Fields> {
    if patch.is_empty() {
        return Err(DomainError::validation("nothing to update"));
    }
    check_shape(schema, &patch)?;

    let blanked: Vec<&str> = patch
        .iter()
        .filter(|(name, value)| {
            value.is_blank() && field(schema, name).is_some_and(|spec| spec.required)
        })
        .map(|(name, _)| name)
        .collect();
    if !blanked.is_empty() {
        return Err(DomainError::validation(format!(
            "cannot be empty: {}",
            blanked.join(", ")
        )));
    }
    Ok(patch)
}

fn check_shape(schema: &[FieldSpec], fields: &Fields) -> DomainResult<()> {
    for (name, value) in fields.iter() {
        let spec = field(schema, name)
            .ok_or_else(|| DomainError::validation(format!("unknown field '{name}'")))?;
        if !spec.kind.accepts(value) {
            return Err(DomainError::validation(format!(
                "field '{name}' expects {:?}, got {}",
                spec.kind,
                value.kind_name()
            )));
        }
    }
    Ok(())
}
