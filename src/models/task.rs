use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, FieldDefault, Insertion, Member};

/// A work item on the task board.
///
/// Tasks move through [`TaskStatus`] columns and are assigned to one
/// [`Member`]. New tasks are appended, so the board lists them oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: Member,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// The board column a task sits in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl Entity for Task {
    const COLLECTION: &'static str = "tasks";
    const NAME: &'static str = "Task";
    const INSERTION: Insertion = Insertion::Append;
    const TRACKS_UPDATES: bool = true;
    const DEFAULTS: &'static [(&'static str, FieldDefault)] = &[
        ("title", FieldDefault::Required),
        ("description", FieldDefault::Text("")),
        ("status", FieldDefault::Text("todo")),
        ("assignee", FieldDefault::Text("jarvis")),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}
