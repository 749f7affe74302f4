use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{self, Entity};

/// Why a stored or fetched document could not be read as a collection.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("`{0}` is not a list")]
    NotAList(&'static str),

    #[error("record {index} is invalid: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One collection as it is persisted: `{ "<collection>": [records...], ...meta }`.
///
/// Members other than the record list (the learnings cursor, for instance)
/// are kept in `meta` and written back untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<E> {
    pub records: Vec<E>,
    pub meta: Map<String, Value>,
}

impl<E> Default for Document<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            meta: Map::new(),
        }
    }
}

impl<E: Entity> Document<E> {
    pub fn new(records: Vec<E>) -> Self {
        Self {
            records,
            meta: Map::new(),
        }
    }

    /// Parse a document, upgrading legacy records along the way.
    ///
    /// Optional fields a stored record omits get their create-time defaults.
    /// A missing record list is an empty collection; anything else that does
    /// not fit the entity is an error.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(mut meta) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let items = match meta.remove(E::COLLECTION) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(DocumentError::NotAList(E::COLLECTION)),
        };

        let today = models::now().date_naive();
        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, mut item)| {
                if let Value::Object(fields) = &mut item {
                    E::upgrade(fields);
                    models::fill_stored_defaults(fields, E::DEFAULTS, today);
                }
                serde_json::from_value(item).map_err(|source| DocumentError::Record { index, source })
            })
            .collect::<Result<Vec<E>, _>>()?;

        Ok(Self { records, meta })
    }

    pub fn find(&self, id: &str) -> Option<&E> {
        self.records.iter().find(|record| record.id() == id)
    }
}

impl<E: Entity> Serialize for Document<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.meta.len()))?;
        map.serialize_entry(E::COLLECTION, &self.records)?;
        for (key, value) in &self.meta {
            if key != E::COLLECTION {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Idea, Note, Task};
    use serde_json::json;

    fn task(id: &str) -> Value {
        json!({
            "id": id,
            "title": "T",
            "description": "",
            "status": "todo",
            "assignee": "jarvis",
            "createdAt": "2026-10-19T08:00:00.000Z",
            "updatedAt": "2026-10-19T08:00:00.000Z"
        })
    }

    #[test]
    fn missing_list_is_empty_collection() {
        let document = Document::<Task>::from_value(json!({})).unwrap();
        assert!(document.records.is_empty());
    }

    #[test]
    fn keeps_meta_members() {
        let document =
            Document::<Task>::from_value(json!({ "tasks": [task("1")], "owner": "zohan" })).unwrap();
        assert_eq!(document.records.len(), 1);
        assert_eq!(document.meta["owner"], "zohan");

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["owner"], "zohan");
        assert_eq!(value["tasks"][0]["id"], "1");
    }

    #[test]
    fn rejects_non_object_documents() {
        let result = Document::<Task>::from_value(json!([task("1")]));
        assert!(matches!(result, Err(DocumentError::NotAnObject)));
    }

    #[test]
    fn reports_the_index_of_a_bad_record() {
        let mut bad = task("2");
        bad["status"] = json!("blocked");
        let result = Document::<Task>::from_value(json!({ "tasks": [task("1"), bad] }));
        assert!(matches!(result, Err(DocumentError::Record { index: 1, .. })));
    }

    #[test]
    fn fills_optional_fields_missing_from_stored_records() {
        let document = Document::<Note>::from_value(json!({
            "notes": [{
                "id": "2",
                "content": "Standup\nnotes",
                "date": "2026-10-18",
                "createdAt": "2026-10-18T08:00:00.000Z"
            }]
        }))
        .unwrap();
        assert_eq!(document.records[0].title, "Standup");
    }

    #[test]
    fn missing_required_field_is_still_an_error() {
        let mut bad = task("1");
        bad.as_object_mut().unwrap().remove("title");
        let result = Document::<Task>::from_value(json!({ "tasks": [bad] }));
        assert!(matches!(result, Err(DocumentError::Record { index: 0, .. })));
    }

    #[test]
    fn upgrades_legacy_records() {
        let document = Document::<Idea>::from_value(json!({
            "ideas": [{
                "id": "1",
                "title": "Old",
                "description": "shape",
                "category": "tweet",
                "createdAt": "2026-10-19T08:00:00.000Z"
            }]
        }))
        .unwrap();
        assert_eq!(document.records[0].content, "Old\n\nshape");
    }
}
