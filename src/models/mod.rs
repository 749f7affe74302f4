//! Domain models for the workshop dashboard.
//!
//! # Collections
//!
//! Every record type lives in its own collection, persisted as one JSON
//! document. Records share a common envelope (`id`, `createdAt`, and for some
//! types `updatedAt`) around their domain fields:
//!
//! - [`Task`]: Work item on the kanban board, appended oldest-first.
//! - [`Idea`]: Short captured idea, appended oldest-first.
//! - [`Draft`]: Post draft, prepended newest-first.
//! - [`Note`]: Dated free-form note, appended oldest-first.
//! - [`Learning`]: Summary of a bookmarked tweet, prepended newest-first.
//!
//! # Defaults
//!
//! Each entity declares a table of [`FieldDefault`] rules that the collection
//! service applies to incoming records before they are typed. The service and
//! store stay entity-agnostic; everything entity-specific is expressed through
//! the [`Entity`] trait.

mod draft;
mod idea;
mod learning;
mod note;
mod task;

pub use draft::*;
pub use idea::*;
pub use learning::*;
pub use note::*;
pub use task::*;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Maximum length of a title derived from content.
const HEADLINE_LEN: usize = 50;

/// Where a newly created record lands in its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Oldest first: new records go to the end.
    Append,
    /// Newest first: new records go to the front.
    Prepend,
}

/// How a field is filled in when a create request leaves it blank.
///
/// A field counts as blank when it is absent, `null` or the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// The caller must provide a value.
    Required,
    /// A fixed string value.
    Text(&'static str),
    /// An empty list.
    EmptyList,
    /// Today's date as `YYYY-MM-DD`.
    Today,
    /// The first line of another field, truncated.
    FirstLineOf(&'static str),
}

/// A record type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Plural name: file stem, document key and URL segment.
    const COLLECTION: &'static str;
    /// Human-readable singular name used in error messages.
    const NAME: &'static str;
    const INSERTION: Insertion;
    /// Whether the record carries an `updatedAt` timestamp.
    const TRACKS_UPDATES: bool;
    /// Default rules applied in order on create.
    const DEFAULTS: &'static [(&'static str, FieldDefault)];

    fn id(&self) -> &str;

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Rewrite a legacy record shape into the canonical one.
    fn upgrade(_fields: &mut Map<String, Value>) {}
}

/// Author of a task or draft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Member {
    Zohan,
    Jarvis,
}

impl Member {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zohan => "zohan",
            Self::Jarvis => "jarvis",
        }
    }
}

/// Current time at millisecond precision.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly after `previous`, normally the current time.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Format a timestamp the way records store it (ISO-8601, UTC, milliseconds).
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde helper writing a record timestamp in the [`timestamp`] format, so a
/// whole second keeps its `.000`.
pub fn serialize_timestamp<S: Serializer>(
    at: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp(*at))
}

pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Fill blank fields according to `rules`.
///
/// Rules run in order, so a [`FieldDefault::FirstLineOf`] rule sees fields
/// defaulted by earlier rules. Returns the message for the first missing
/// required field.
pub fn fill_defaults(
    fields: &mut Map<String, Value>,
    rules: &[(&'static str, FieldDefault)],
    today: NaiveDate,
) -> Result<(), String> {
    for &(field, rule) in rules {
        if !is_blank(fields.get(field)) {
            continue;
        }
        let value =
            default_value(fields, rule, today).ok_or_else(|| format!("{} is required", field))?;
        fields.insert(field.to_string(), value);
    }
    Ok(())
}

/// Fill blank optional fields of a record read back from storage.
///
/// Like [`fill_defaults`], but required fields are left for deserialization
/// to report.
pub fn fill_stored_defaults(
    fields: &mut Map<String, Value>,
    rules: &[(&'static str, FieldDefault)],
    today: NaiveDate,
) {
    for &(field, rule) in rules {
        if !is_blank(fields.get(field)) {
            continue;
        }
        if let Some(value) = default_value(fields, rule, today) {
            fields.insert(field.to_string(), value);
        }
    }
}

fn default_value(fields: &Map<String, Value>, rule: FieldDefault, today: NaiveDate) -> Option<Value> {
    let value = match rule {
        FieldDefault::Required => return None,
        FieldDefault::Text(text) => Value::String(text.to_string()),
        FieldDefault::EmptyList => Value::Array(Vec::new()),
        FieldDefault::Today => Value::String(today.format("%Y-%m-%d").to_string()),
        FieldDefault::FirstLineOf(source) => Value::String(headline(fields.get(source))),
    };
    Some(value)
}

fn headline(source: Option<&Value>) -> String {
    let line = source
        .and_then(Value::as_str)
        .and_then(|text| text.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or("");

    if line.is_empty() {
        return "Untitled".to_string();
    }
    if line.chars().count() > HEADLINE_LEN {
        let cut: String = line.chars().take(HEADLINE_LEN).collect();
        format!("{}...", cut.trim_end())
    } else {
        line.to_string()
    }
}

/// Join a legacy heading and body into one content string.
///
/// Blank parts are skipped; both present are separated by a blank line.
fn fold_legacy(heading: Option<Value>, body: Option<Value>) -> Option<String> {
    let part = |value: Option<Value>| match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    };

    match (part(heading), part(body)) {
        (Some(heading), Some(body)) => Some(format!("{}\n\n{}", heading, body)),
        (Some(text), None) | (None, Some(text)) => Some(text),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn fills_blank_fields_and_keeps_provided_ones() {
        let mut map = fields(json!({ "status": "done", "description": "" }));
        let rules = [
            ("status", FieldDefault::Text("todo")),
            ("description", FieldDefault::Text("")),
            ("assignee", FieldDefault::Text("jarvis")),
        ];

        fill_defaults(&mut map, &rules, today()).unwrap();

        assert_eq!(map["status"], "done");
        assert_eq!(map["description"], "");
        assert_eq!(map["assignee"], "jarvis");
    }

    #[test]
    fn null_counts_as_blank() {
        let mut map = fields(json!({ "keyPoints": null }));
        fill_defaults(&mut map, &[("keyPoints", FieldDefault::EmptyList)], today()).unwrap();
        assert_eq!(map["keyPoints"], json!([]));
    }

    #[test]
    fn required_field_reports_its_name() {
        let mut map = fields(json!({ "title": "" }));
        let err = fill_defaults(&mut map, &[("title", FieldDefault::Required)], today())
            .unwrap_err();
        assert_eq!(err, "title is required");
    }

    #[test]
    fn today_rule_formats_date() {
        let mut map = Map::new();
        fill_defaults(&mut map, &[("date", FieldDefault::Today)], today()).unwrap();
        assert_eq!(map["date"], "2026-10-19");
    }

    #[test]
    fn first_line_rule_truncates_long_lines() {
        let long = "a".repeat(80);
        let mut map = fields(json!({ "content": format!("\n{}\nsecond", long) }));
        fill_defaults(
            &mut map,
            &[("title", FieldDefault::FirstLineOf("content"))],
            today(),
        )
        .unwrap();
        assert_eq!(map["title"], format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn first_line_rule_falls_back_to_untitled() {
        let mut map = fields(json!({ "content": "   " }));
        fill_defaults(
            &mut map,
            &[("title", FieldDefault::FirstLineOf("content"))],
            today(),
        )
        .unwrap();
        assert_eq!(map["title"], "Untitled");
    }

    #[test]
    fn stored_defaults_skip_required_fields() {
        let mut map = fields(json!({ "content": "Retro" }));
        let rules = [
            ("id", FieldDefault::Required),
            ("title", FieldDefault::FirstLineOf("content")),
            ("keyPoints", FieldDefault::EmptyList),
        ];

        fill_stored_defaults(&mut map, &rules, today());

        assert!(map.get("id").is_none());
        assert_eq!(map["title"], "Retro");
        assert_eq!(map["keyPoints"], json!([]));
    }

    #[test]
    fn advance_is_strictly_increasing() {
        let future = Utc::now() + Duration::seconds(60);
        assert!(advance(future) > future);

        let past = Utc::now() - Duration::seconds(60);
        assert!(advance(past) > past);
    }

    #[test]
    fn timestamp_uses_milliseconds_and_z_suffix() {
        let at = DateTime::parse_from_rfc3339("2026-10-19T08:30:00.120Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp(at), "2026-10-19T08:30:00.120Z");
    }

    #[test]
    fn whole_seconds_keep_their_milliseconds() {
        let at = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let value = serialize_timestamp(&at, serde_json::value::Serializer).unwrap();
        assert_eq!(value, json!("2026-01-01T00:00:00.000Z"));
    }

    #[test]
    fn fold_legacy_joins_parts() {
        let joined = fold_legacy(Some(json!("Head")), Some(json!("Body")));
        assert_eq!(joined.as_deref(), Some("Head\n\nBody"));
        assert_eq!(fold_legacy(Some(json!("")), Some(json!("Body"))).as_deref(), Some("Body"));
        assert_eq!(fold_legacy(None, None), None);
    }
}
