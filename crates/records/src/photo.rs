use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use admindash_core::{DomainResult, Entity, FieldDefault, FieldKind, FieldSpec, Fields};

/// A user photo. The image location is fixed once created; only the
/// owner's name and email can be edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub name: String,
    /// Older uploads were stored without an email.
    pub email: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Entity for Photo {
    const COLLECTION: &'static str = "photos";
    const LABEL: &'static str = "Photo";
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("url", FieldKind::Url).read_only(),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::required("email", FieldKind::Text),
        FieldSpec::generated("timestamp", FieldKind::Timestamp, FieldDefault::Now),
    ];

    fn from_fields(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            url: fields.text("url")?.to_string(),
            name: fields.opt_text("name")?.unwrap_or_default().to_string(),
            email: fields.opt_text("email")?.map(str::to_string),
            timestamp: fields.opt_timestamp("timestamp")?,
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new()
            .with("url", self.url.as_str())
            .with("name", self.name.as_str());
        if let Some(email) = &self.email {
            fields.insert("email", email.as_str());
        }
        if let Some(at) = self.timestamp {
            fields.insert("timestamp", at);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn upload_shaped_record_without_email_decodes() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let fields = Fields::new()
            .with("url", "https://cdn.example/p.png")
            .with("name", "p.png")
            .with("timestamp", at);

        let photo = Photo::from_fields(&fields).unwrap();
        assert_eq!(photo.email, None);
        assert_eq!(photo.timestamp, Some(at));
        assert_eq!(photo.to_fields(), fields);
    }

    #[test]
    fn url_is_locked_in_edit_modal() {
        let url = Photo::SCHEMA.iter().find(|s| s.name == "url").unwrap();
        assert!(url.input);
        assert!(!url.editable);
    }
}
