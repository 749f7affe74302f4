//! Collection operations shared by every entity type.
//!
//! [`Collection`] turns list/create/update/delete requests into store
//! read-modify-write cycles. It owns identity and timestamps: ids are
//! generated here, `createdAt` is set once and `updatedAt` is always
//! recomputed. Entity-specific behaviour comes from [`Entity`].
//!
//! Mutations read through [`Store::try_load`]: a document that exists but
//! does not parse is reported as a storage error instead of being replaced.

mod learnings;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Context;
use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{self, Entity, Insertion};
use crate::store::{Document, Store};

/// Highest id handed out by this process, in milliseconds since the epoch.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request body does not describe a valid record.
    #[error("{0}")]
    Invalid(String),

    /// A caller-supplied id is already taken.
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Generate a record id from the current time.
///
/// Ids are millisecond timestamps, bumped past the previous id when two are
/// requested within the same millisecond.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let (Ok(previous) | Err(previous)) =
        LAST_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        });
    now.max(previous + 1).to_string()
}

/// The operations on one collection.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    store: Store,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Collection<E> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            entity: PhantomData,
        }
    }

    /// The full collection in stored order.
    pub fn list(&self) -> Document<E> {
        self.store.load()
    }

    pub fn create(&self, input: Value) -> Result<E, ServiceError> {
        self.create_with(input, |_| {})
    }

    /// Create a record and let `before_save` adjust the document in the same
    /// write.
    pub fn create_with(
        &self,
        input: Value,
        before_save: impl FnOnce(&mut Document<E>),
    ) -> Result<E, ServiceError> {
        let mut fields = into_fields(input)?;
        let now = models::now();

        E::upgrade(&mut fields);
        models::fill_defaults(&mut fields, E::DEFAULTS, now.date_naive())
            .map_err(ServiceError::Invalid)?;

        if models::is_blank(fields.get("id")) {
            fields.insert("id".to_string(), Value::String(next_id()));
        }
        if models::is_blank(fields.get("createdAt")) {
            fields.insert("createdAt".to_string(), Value::String(models::timestamp(now)));
        }
        if E::TRACKS_UPDATES {
            fields.insert("updatedAt".to_string(), Value::String(models::timestamp(now)));
        }

        let record: E = typed(fields)?;

        let mut document = self.store.try_load::<E>()?;
        if document.find(record.id()).is_some() {
            return Err(ServiceError::Duplicate(E::NAME));
        }

        match E::INSERTION {
            Insertion::Append => document.records.push(record.clone()),
            Insertion::Prepend => document.records.insert(0, record.clone()),
        }
        before_save(&mut document);
        self.store.save(&document)?;

        tracing::info!("Created {} {}", E::NAME, record.id());
        Ok(record)
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// Fields in the patch replace stored ones; everything else survives.
    /// `id` and `createdAt` in the patch are ignored. Returns `None` without
    /// writing anything when no record has that id.
    pub fn update(&self, id: &str, patch: Value) -> Result<Option<E>, ServiceError> {
        let patch = into_fields(patch)?;

        let mut document = self.store.try_load::<E>()?;
        let Some(index) = document.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let existing = &document.records[index];
        let previous_update = existing.updated_at();
        let mut fields = match serde_json::to_value(existing).context("Failed to serialize record")? {
            Value::Object(fields) => fields,
            _ => return Err(anyhow::anyhow!("{} did not serialize to an object", E::NAME).into()),
        };

        for (key, value) in patch {
            if matches!(key.as_str(), "id" | "createdAt" | "updatedAt") {
                continue;
            }
            fields.insert(key, value);
        }
        if E::TRACKS_UPDATES {
            let touched = previous_update.map_or_else(models::now, models::advance);
            fields.insert("updatedAt".to_string(), Value::String(models::timestamp(touched)));
        }

        let merged: E = typed(fields)?;
        document.records[index] = merged.clone();
        self.store.save(&document)?;

        tracing::info!("Updated {} {}", E::NAME, id);
        Ok(Some(merged))
    }

    /// Remove every record with `id`. Returns whether anything was removed;
    /// nothing is written when nothing matched.
    pub fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let mut document = self.store.try_load::<E>()?;
        let before = document.records.len();
        document.records.retain(|r| r.id() != id);

        if document.records.len() == before {
            tracing::debug!("No {} {} to delete", E::NAME, id);
            return Ok(false);
        }

        self.store.save(&document)?;
        tracing::info!("Deleted {} {}", E::NAME, id);
        Ok(true)
    }
}

fn into_fields(value: Value) -> Result<Map<String, Value>, ServiceError> {
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(ServiceError::Invalid(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

fn typed<E: Entity>(fields: Map<String, Value>) -> Result<E, ServiceError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| ServiceError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let ids: Vec<i64> = (0..100)
            .map(|_| next_id().parse().expect("numeric id"))
            .collect();
        assert!(ids.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn ids_are_timestamp_derived() {
        let before = Utc::now().timestamp_millis();
        let id: i64 = next_id().parse().unwrap();
        assert!(id >= before);
    }

    #[test]
    fn rejects_non_object_bodies() {
        let result = into_fields(Value::String("task".to_string()));
        assert!(matches!(result, Err(ServiceError::Invalid(_))));
    }
}
