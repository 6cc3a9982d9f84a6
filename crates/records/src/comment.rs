use serde::{Deserialize, Serialize};

use admindash_core::{DomainResult, Entity, FieldDefault, FieldKind, FieldSpec, Fields};

/// Author recorded on comments posted from the dashboard.
pub const DEFAULT_AUTHOR: &str = "Admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author: String,
}

impl Comment {
    /// Avatar letter: first character of the author.
    pub fn initial(&self) -> char {
        self.author.chars().next().unwrap_or('A')
    }
}

impl Entity for Comment {
    const COLLECTION: &'static str = "comments";
    const LABEL: &'static str = "Comment";
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("text", FieldKind::Text),
        FieldSpec::generated("author", FieldKind::Text, FieldDefault::Text(DEFAULT_AUTHOR)),
    ];

    fn from_fields(fields: &Fields) -> DomainResult<Self> {
        let author = match fields.opt_text("author")? {
            Some(a) if !a.trim().is_empty() => a.to_string(),
            _ => DEFAULT_AUTHOR.to_string(),
        };
        Ok(Self {
            text: fields.text("text")?.to_string(),
            author,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("text", self.text.as_str())
            .with("author", self.author.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_author_reads_as_admin() {
        let comment = Comment::from_fields(&Fields::new().with("text", "Nice shot")).unwrap();
        assert_eq!(comment.author, "Admin");
        assert_eq!(comment.initial(), 'A');
    }

    #[test]
    fn explicit_author_is_kept() {
        let comment = Comment::from_fields(
            &Fields::new().with("text", "hi").with("author", "Zoe"),
        )
        .unwrap();
        assert_eq!(comment.initial(), 'Z');
    }
}
