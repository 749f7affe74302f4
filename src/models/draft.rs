use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{fold_legacy, Entity, FieldDefault, Insertion, Member};

/// A post draft. Drafts are listed newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub content: String,
    pub status: DraftStatus,
    pub author: Member,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Publishing state of a draft.
///
/// - `Draft`: Still being written
/// - `Ready`: Approved, waiting to be posted
/// - `Posted`: Published
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Draft,
    Ready,
    Posted,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Posted => "posted",
        }
    }
}

impl Entity for Draft {
    const COLLECTION: &'static str = "drafts";
    const NAME: &'static str = "Draft";
    const INSERTION: Insertion = Insertion::Prepend;
    const TRACKS_UPDATES: bool = true;
    const DEFAULTS: &'static [(&'static str, FieldDefault)] = &[
        ("content", FieldDefault::Required),
        ("status", FieldDefault::Text("draft")),
        ("author", FieldDefault::Text("jarvis")),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }

    /// Drafts no longer carry a `title`; a legacy one becomes the first
    /// paragraph of `content`.
    fn upgrade(fields: &mut Map<String, Value>) {
        if !fields.contains_key("title") {
            return;
        }
        let title = fields.remove("title");
        let content = fields.remove("content");
        if let Some(content) = fold_legacy(title, content) {
            fields.insert("content".to_string(), Value::String(content));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upgrade_prefixes_legacy_title() {
        let Value::Object(mut fields) = json!({ "title": "Thread", "content": "1/ hello" }) else {
            unreachable!();
        };
        Draft::upgrade(&mut fields);
        assert_eq!(fields["content"], "Thread\n\n1/ hello");
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn upgrade_leaves_canonical_records_alone() {
        let Value::Object(mut fields) = json!({ "content": "1/ hello" }) else {
            unreachable!();
        };
        Draft::upgrade(&mut fields);
        assert_eq!(fields["content"], "1/ hello");
    }
}
