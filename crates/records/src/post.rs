use serde::{Deserialize, Serialize};

use admindash_core::{
    DomainResult, Entity, FieldDefault, FieldKind, FieldSpec, Fields, SyncMode,
};

/// Feed post. The posts screen follows the collection live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub content: String,
    pub profile_url: String,
    /// Image URL or inline data URL; empty when the post has no image.
    pub post_image: String,
}

impl Post {
    pub fn has_image(&self) -> bool {
        !self.post_image.trim().is_empty()
    }
}

impl Entity for Post {
    const COLLECTION: &'static str = "posts";
    const LABEL: &'static str = "Post";
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("content", FieldKind::Text),
        FieldSpec::required("profileUrl", FieldKind::Url).read_only(),
        FieldSpec::optional("postImage", FieldKind::Url).or_default(FieldDefault::Text("")),
    ];
    const SYNC: SyncMode = SyncMode::Push;

    fn from_fields(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            content: fields.text("content")?.to_string(),
            profile_url: fields.opt_text("profileUrl")?.unwrap_or_default().to_string(),
            post_image: fields.opt_text("postImage")?.unwrap_or_default().to_string(),
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("content", self.content.as_str())
            .with("profileUrl", self.profile_url.as_str())
            .with("postImage", self.post_image.as_str())
    }
}
