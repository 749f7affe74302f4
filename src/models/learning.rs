use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, FieldDefault, Insertion};

/// Document member holding the ingestion cursor next to the learnings list.
pub const CURSOR_FIELD: &str = "lastCheckedBookmarkId";

/// A digested bookmark: the original tweet plus a summary and key points.
///
/// Learnings are written by an external ingestion job, which also advances
/// the collection's bookmark cursor (see [`CURSOR_FIELD`]). They are listed
/// newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Learning {
    pub id: String,
    pub tweet_id: String,
    pub tweet_url: String,
    pub author: String,
    pub author_handle: String,
    pub original_content: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub category: LearningCategory,
    pub status: LearningStatus,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LearningCategory {
    Ai,
    Crypto,
    Marketing,
    Product,
    Other,
}

impl LearningCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Crypto => "crypto",
            Self::Marketing => "marketing",
            Self::Product => "product",
            Self::Other => "other",
        }
    }
}

/// Reading progress of a learning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LearningStatus {
    Unread,
    Reading,
    Done,
}

impl LearningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Reading => "reading",
            Self::Done => "done",
        }
    }
}

impl Entity for Learning {
    const COLLECTION: &'static str = "learnings";
    const NAME: &'static str = "Learning";
    const INSERTION: Insertion = Insertion::Prepend;
    const TRACKS_UPDATES: bool = true;
    const DEFAULTS: &'static [(&'static str, FieldDefault)] = &[
        ("tweetId", FieldDefault::Text("")),
        ("tweetUrl", FieldDefault::Text("")),
        ("author", FieldDefault::Text("")),
        ("authorHandle", FieldDefault::Text("")),
        ("originalContent", FieldDefault::Text("")),
        ("summary", FieldDefault::Text("")),
        ("keyPoints", FieldDefault::EmptyList),
        ("category", FieldDefault::Text("other")),
        ("status", FieldDefault::Text("unread")),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}
