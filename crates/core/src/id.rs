//! Gateway-assigned record identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a stored record.
///
/// Only the gateway mints these (on create). The client never generates one;
/// it only parses identifiers it received back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Parse an identifier returned by the gateway.
    ///
    /// Identifiers are single path segments: non-blank and without `/`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::invalid_id("RecordId: empty"));
        }
        if raw.contains('/') {
            return Err(DomainError::invalid_id(format!(
                "RecordId: '{raw}' contains '/'"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_opaque_segment() {
        let id: RecordId = "Xk3b9QpL2".parse().unwrap();
        assert_eq!(id.as_str(), "Xk3b9QpL2");
        assert_eq!(id.to_string(), "Xk3b9QpL2");
    }

    #[test]
    fn parse_rejects_blank_and_paths() {
        assert!(matches!(RecordId::parse("  "), Err(DomainError::InvalidId(_))));
        assert!(matches!(RecordId::parse("todos/abc"), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn serde_goes_through_validation() {
        let id: RecordId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
    }
}
