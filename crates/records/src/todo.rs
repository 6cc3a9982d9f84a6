use serde::{Deserialize, Serialize};

use admindash_core::{DomainResult, Entity, FieldDefault, FieldKind, FieldSpec, Fields};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Patch flipping the completion flag ("Mark Complete" / "Mark Incomplete").
    pub fn toggle_patch(&self) -> Fields {
        Fields::new().with("completed", !self.completed)
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "Pending" }
    }
}

impl Entity for Todo {
    const COLLECTION: &'static str = "todos";
    const LABEL: &'static str = "Todo";
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::generated("completed", FieldKind::Bool, FieldDefault::Bool(false)),
    ];

    fn from_fields(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            title: fields.text("title")?.to_string(),
            completed: fields.opt_bool("completed")?.unwrap_or(false),
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("title", self.title.as_str())
            .with("completed", self.completed)
    }
}
