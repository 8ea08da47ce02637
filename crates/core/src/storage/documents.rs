//! Pure document transformations applied on every write.
//!
//! The gateway's clock is authoritative for `createdAt` and `updatedAt`;
//! whatever the client put in those fields is overwritten here.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::serde::to_datetime;

use super::{Document, Result, StoreError};

pub const ID: &str = "id";
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Serializes a record into a document.
pub fn encode<T: Serialize + ?Sized>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidData(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserializes a document into a record.
pub fn decode<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Returns the `updatedAt` to write given the stored one.
///
/// Successive writes to the same record always move `updatedAt` forward,
/// by one microsecond when the clock has not advanced past the stored value.
pub fn bump_updated_at(previous: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous.and_then(to_datetime) {
        Some(prev) if prev >= now => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// Stamps a new document with its server-generated id and timestamps.
pub fn prepare_insert(mut document: Document, id: &str, now: DateTime<Utc>) -> Document {
    document.insert(ID.to_string(), Value::String(id.to_string()));
    document.insert(CREATED_AT.to_string(), timestamp_value(now));
    document.insert(UPDATED_AT.to_string(), timestamp_value(now));
    document
}

/// Shallow-merges `patch` into `existing`.
///
/// `id` and `createdAt` in the patch are ignored; `updatedAt` is always
/// recomputed with [`bump_updated_at`].
pub fn apply_patch(existing: &mut Document, patch: Document, now: DateTime<Utc>) {
    let updated_at = bump_updated_at(existing.get(UPDATED_AT), now);
    for (key, value) in patch {
        if key == ID || key == CREATED_AT || key == UPDATED_AT {
            continue;
        }
        existing.insert(key, value);
    }
    existing.insert(UPDATED_AT.to_string(), timestamp_value(updated_at));
}

/// Builds the document stored by a create-or-replace write.
///
/// `createdAt` survives from the previous version when there is one.
pub fn prepare_upsert(
    previous: Option<&Document>,
    mut document: Document,
    id: &str,
    now: DateTime<Utc>,
) -> Document {
    let created_at = previous
        .and_then(|prev| prev.get(CREATED_AT))
        .cloned()
        .unwrap_or_else(|| timestamp_value(now));
    let updated_at = bump_updated_at(previous.and_then(|prev| prev.get(UPDATED_AT)), now);

    document.insert(ID.to_string(), Value::String(id.to_string()));
    document.insert(CREATED_AT.to_string(), created_at);
    document.insert(UPDATED_AT.to_string(), timestamp_value(updated_at));
    document
}
