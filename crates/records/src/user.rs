use serde::{Deserialize, Serialize};

use admindash_core::{DomainResult, Entity, FieldKind, FieldSpec, Fields, SyncMode};

/// Dashboard-managed user account record. The users screen follows the
/// collection live.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::required("email", FieldKind::Text),
        FieldSpec::required("password", FieldKind::Text),
    ];
    const SYNC: SyncMode = SyncMode::Push;

    fn from_fields(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            name: fields.text("name")?.to_string(),
            email: fields.text("email")?.to_string(),
            password: fields.opt_text("password")?.unwrap_or_default().to_string(),
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("name", self.name.as_str())
            .with("email", self.email.as_str())
            .with("password", self.password.as_str())
    }
}
