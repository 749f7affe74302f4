use serde_json::Value;

use super::{Collection, ServiceError};
use crate::models::{is_blank, Learning, CURSOR_FIELD};
use crate::store::Document;

impl Document<Learning> {
    /// The id of the last bookmark the ingestion job has processed.
    pub fn cursor(&self) -> Option<&str> {
        self.meta.get(CURSOR_FIELD).and_then(Value::as_str)
    }

    pub fn set_cursor(&mut self, cursor: Option<String>) {
        match cursor {
            Some(cursor) => {
                self.meta.insert(CURSOR_FIELD.to_string(), Value::String(cursor));
            }
            None => {
                self.meta.remove(CURSOR_FIELD);
            }
        }
    }
}

impl Collection<Learning> {
    /// Create a learning. A non-empty cursor in the input advances the
    /// bookmark cursor in the same write.
    pub fn create_learning(&self, input: Value) -> Result<Learning, ServiceError> {
        let cursor = match input.get(CURSOR_FIELD) {
            value if is_blank(value) => None,
            Some(Value::String(cursor)) => Some(cursor.clone()),
            Some(_) => return Err(cursor_type_error()),
            None => None,
        };

        self.create_with(input, |document| {
            if let Some(cursor) = cursor {
                document.set_cursor(Some(cursor));
            }
        })
    }

    /// Replace the bookmark cursor without touching any record. `null`
    /// clears it.
    pub fn set_cursor(&self, cursor: Value) -> Result<Option<String>, ServiceError> {
        let cursor = match cursor {
            Value::String(cursor) => Some(cursor),
            Value::Null => None,
            _ => return Err(cursor_type_error()),
        };

        let mut document = self.store.try_load::<Learning>()?;
        document.set_cursor(cursor.clone());
        self.store.save(&document)?;

        tracing::info!("Bookmark cursor set to {:?}", cursor);
        Ok(cursor)
    }
}

fn cursor_type_error() -> ServiceError {
    ServiceError::Invalid(format!("{} must be a string or null", CURSOR_FIELD))
}
