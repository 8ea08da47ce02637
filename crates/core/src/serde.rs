//! Serde helpers for document fields.
//!
//! Documents written by other clients do not agree on a timestamp
//! representation. These helpers accept every shape we have seen and
//! normalize it to `DateTime<Utc>`:
//!
//! - RFC 3339 strings (`"2024-05-01T09:30:00Z"`)
//! - bare dates (`"2024-05-01"`, midnight UTC)
//! - timestamp objects (`{"seconds": 1714555800, "nanoseconds": 0}`, also
//!   with leading underscores)
//! - epoch milliseconds (`1714555800000`)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Converts a loosely-typed JSON value into a UTC timestamp.
///
/// Returns `None` for `null`, empty strings and anything unparseable.
pub fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

/// Returns true when the value normalizes to a timestamp.
pub fn is_valid_timestamp(value: &Value) -> bool {
    to_datetime(value).is_some()
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize a required timestamp from any supported representation.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    to_datetime(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}")))
}

/// Deserialize an optional timestamp. Unparseable values become `None`.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_datetime))
}

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(deserialize_with = "deserialize_timestamp")]
        at: DateTime<Utc>,
        #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
        due: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        note: Option<String>,
    }

    fn may_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_to_datetime_rfc3339() {
        assert_eq!(to_datetime(&json!("2024-05-01T09:30:00Z")), Some(may_first()));
        assert_eq!(
            to_datetime(&json!("2024-05-01T11:30:00+02:00")),
            Some(may_first())
        );
    }

    #[test]
    fn test_to_datetime_bare_date() {
        assert_eq!(
            to_datetime(&json!("2024-05-01")),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_to_datetime_timestamp_object() {
        let seconds = may_first().timestamp();
        assert_eq!(
            to_datetime(&json!({"seconds": seconds, "nanoseconds": 0})),
            Some(may_first())
        );
        assert_eq!(
            to_datetime(&json!({"_seconds": seconds, "_nanoseconds": 0})),
            Some(may_first())
        );
    }

    #[test]
    fn test_to_datetime_epoch_millis() {
        let millis = may_first().timestamp_millis();
        assert_eq!(to_datetime(&json!(millis)), Some(may_first()));
    }

    #[test]
    fn test_to_datetime_rejects_garbage() {
        assert_eq!(to_datetime(&Value::Null), None);
        assert_eq!(to_datetime(&json!("")), None);
        assert_eq!(to_datetime(&json!("yesterday")), None);
        assert_eq!(to_datetime(&json!(true)), None);
        assert_eq!(to_datetime(&json!({"nanoseconds": 5})), None);
        assert!(!is_valid_timestamp(&json!([1, 2, 3])));
    }

    #[test]
    fn test_deserialize_mixed_representations() {
        let millis = may_first().timestamp_millis();
        let value = json!({
            "at": {"seconds": may_first().timestamp(), "nanoseconds": 0},
            "due": millis,
            "note": "  "
        });

        let result: TestStruct = serde_json::from_value(value).unwrap();

        assert_eq!(result.at, may_first());
        assert_eq!(result.due, Some(may_first()));
        assert_eq!(result.note, None);
    }

    #[test]
    fn test_deserialize_optional_timestamp_invalid_is_none() {
        let value = json!({"at": "2024-05-01T09:30:00Z", "due": "not a date"});

        let result: TestStruct = serde_json::from_value(value).unwrap();

        assert_eq!(result.due, None);
    }

    #[test]
    fn test_deserialize_required_timestamp_invalid_errors() {
        let value = json!({"at": "not a date"});

        let result: Result<TestStruct, _> = serde_json::from_value(value);

        assert!(result.is_err());
    }
}
