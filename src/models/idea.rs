use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{fold_legacy, is_blank, Entity, FieldDefault, Insertion};

/// A captured idea.
///
/// Older records used `title` + `description` instead of `content`; those are
/// folded into `content` when read (see [`Entity::upgrade`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub content: String,
    pub category: IdeaCategory,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IdeaCategory {
    Tweet,
    Product,
    Other,
}

impl IdeaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tweet => "tweet",
            Self::Product => "product",
            Self::Other => "other",
        }
    }
}

impl Entity for Idea {
    const COLLECTION: &'static str = "ideas";
    const NAME: &'static str = "Idea";
    const INSERTION: Insertion = Insertion::Append;
    const TRACKS_UPDATES: bool = false;
    const DEFAULTS: &'static [(&'static str, FieldDefault)] = &[
        ("content", FieldDefault::Required),
        ("category", FieldDefault::Text("other")),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn upgrade(fields: &mut Map<String, Value>) {
        let title = fields.remove("title");
        let description = fields.remove("description");
        if is_blank(fields.get("content")) {
            if let Some(content) = fold_legacy(title, description) {
                fields.insert("content".to_string(), Value::String(content));
            }
        }
    }
}
