use serde::{Deserialize, Serialize};

use admindash_core::{DomainResult, Entity, FieldKind, FieldSpec, Fields};

/// Photo album card: title, blurb and cover image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub title: String,
    pub description: String,
    pub cover_image: String,
}

impl Entity for Album {
    const COLLECTION: &'static str = "albums";
    const LABEL: &'static str = "Album";
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::required("description", FieldKind::Text),
        FieldSpec::required("coverImage", FieldKind::Url),
    ];

    fn from_fields(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            title: fields.text("title")?.to_string(),
            description: fields.opt_text("description")?.unwrap_or_default().to_string(),
            cover_image: fields.opt_text("coverImage")?.unwrap_or_default().to_string(),
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("title", self.title.as_str())
            .with("description", self.description.as_str())
            .with("coverImage", self.cover_image.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stored_field_names() {
        let fields = Fields::new()
            .with("title", "Summer")
            .with("description", "Beach days")
            .with("coverImage", "https://img.example/summer.jpg");

        let album = Album::from_fields(&fields).unwrap();
        assert_eq!(album.cover_image, "https://img.example/summer.jpg");
        assert_eq!(album.to_fields(), fields);
    }

    #[test]
    fn title_is_the_only_field_a_stored_album_must_have() {
        let album = Album::from_fields(&Fields::new().with("title", "Bare")).unwrap();
        assert_eq!(album.description, "");
        assert!(Album::from_fields(&Fields::new().with("description", "x")).is_err());
    }
}
