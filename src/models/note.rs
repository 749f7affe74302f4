use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, FieldDefault, Insertion};

/// A dated free-form note.
///
/// A note created without a title takes the first line of its content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// The note body (markdown supported).
    pub content: String,
    /// The day the note is about, `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Entity for Note {
    const COLLECTION: &'static str = "notes";
    const NAME: &'static str = "Note";
    const INSERTION: Insertion = Insertion::Append;
    const TRACKS_UPDATES: bool = false;
    const DEFAULTS: &'static [(&'static str, FieldDefault)] = &[
        ("content", FieldDefault::Text("")),
        ("title", FieldDefault::FirstLineOf("content")),
        ("date", FieldDefault::Today),
    ];

    fn id(&self) -> &str {
        &self.id
    }
}
