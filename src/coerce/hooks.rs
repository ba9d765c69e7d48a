//! Type hooks for instance reconstruction.
//!
//! A hook takes the decoded value at one schema position and returns the
//! native form. Every hook accepts string-or-native input: the native type
//! passes through unchanged, text is parsed permissively, and anything a
//! parser rejects surfaces as an invalid-format error naming the offending
//! value and the target type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::CoerceError;
use crate::model::Value;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Parse a date-time literal, accepting RFC 3339/2822 and a set of common
/// naive formats. Naive inputs are taken as UTC; date-only inputs resolve
/// to midnight.
pub(crate) fn parse_datetime_text(text: &str) -> Result<DateTime<Utc>, CoerceError> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.and_time(NaiveTime::MIN).and_utc());
        }
    }
    Err(CoerceError::InvalidFormat {
        target: "datetime",
        value: text.to_string(),
    })
}

/// Parse a date literal, falling back to the date-time parser truncated to
/// its date component.
pub(crate) fn parse_date_text(text: &str) -> Result<NaiveDate, CoerceError> {
    let trimmed = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    match parse_datetime_text(trimmed) {
        Ok(datetime) => Ok(datetime.date_naive()),
        Err(_) => Err(CoerceError::InvalidFormat {
            target: "date",
            value: text.to_string(),
        }),
    }
}

/// Parse a time literal, falling back to the date-time parser truncated to
/// its time component.
pub(crate) fn parse_time_text(text: &str) -> Result<NaiveTime, CoerceError> {
    let trimmed = text.trim();
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, format) {
            return Ok(time);
        }
    }
    match parse_datetime_text(trimmed) {
        Ok(datetime) => Ok(datetime.time()),
        Err(_) => Err(CoerceError::InvalidFormat {
            target: "time",
            value: text.to_string(),
        }),
    }
}

/// Parse a UUID literal
pub(crate) fn parse_uuid_text(text: &str) -> Result<Uuid, CoerceError> {
    Uuid::parse_str(text.trim()).map_err(|_| CoerceError::InvalidFormat {
        target: "UUID",
        value: text.to_string(),
    })
}

/// Default hook for date-time positions
pub fn datetime_hook(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Datetime(_) => Ok(value),
        Value::String(text) => parse_datetime_text(&text).map(Value::Datetime),
        other => Err(CoerceError::InvalidFormat {
            target: "datetime",
            value: format!("{other:?}"),
        }),
    }
}

/// Default hook for date positions
pub fn date_hook(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Date(_) => Ok(value),
        Value::String(text) => parse_date_text(&text).map(Value::Date),
        other => Err(CoerceError::InvalidFormat {
            target: "date",
            value: format!("{other:?}"),
        }),
    }
}

/// Default hook for time positions
pub fn time_hook(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Time(_) => Ok(value),
        Value::String(text) => parse_time_text(&text).map(Value::Time),
        other => Err(CoerceError::InvalidFormat {
            target: "time",
            value: format!("{other:?}"),
        }),
    }
}

/// Default hook for bytes positions; text encodes as UTF-8
pub fn bytes_hook(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bytes(_) | Value::Fixed(_) => Ok(value),
        Value::String(text) => Ok(Value::Bytes(text.into_bytes())),
        other => Err(CoerceError::InvalidFormat {
            target: "bytes",
            value: format!("{other:?}"),
        }),
    }
}

/// Default hook for UUID positions
pub fn uuid_hook(value: Value) -> Result<Value, CoerceError> {
    match value {
        Value::Uuid(_) => Ok(value),
        Value::String(text) => parse_uuid_text(&text).map(Value::Uuid),
        other => Err(CoerceError::InvalidFormat {
            target: "UUID",
            value: format!("{other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_datetime_accepts_common_forms() {
        let inputs = [
            "2024-03-01T10:30:00Z",
            "2024-03-01T10:30:00+00:00",
            "2024-03-01 10:30:00",
            "2024-03-01T10:30:00.250",
            "2024/03/01 10:30:00",
        ];
        for input in inputs {
            let parsed = parse_datetime_text(input).unwrap();
            assert_eq!(parsed.year(), 2024, "input {input}");
            assert_eq!(parsed.hour(), 10, "input {input}");
        }
    }

    #[test]
    fn test_parse_datetime_normalizes_offsets() {
        let parsed = parse_datetime_text("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(parsed.hour(), 8);
    }

    #[test]
    fn test_parse_datetime_promotes_bare_dates() {
        let parsed = parse_datetime_text("2024-03-01").unwrap();
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.day(), 1);
    }

    #[test]
    fn test_parse_failure_names_value_and_target() {
        match parse_datetime_text("not-a-date") {
            Err(CoerceError::InvalidFormat { target, value }) => {
                assert_eq!(target, "datetime");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("Expected invalid format, got {other:?}"),
        }
    }

    #[test]
    fn test_date_and_time_truncation() {
        let date = parse_date_text("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let time = parse_time_text("10:30:05.123").unwrap();
        assert_eq!(time.second(), 5);
    }

    #[test]
    fn test_hooks_pass_native_values_through() {
        let now = Utc::now();
        match datetime_hook(Value::Datetime(now)).unwrap() {
            Value::Datetime(v) => assert_eq!(v, now),
            other => panic!("Expected datetime, got {other:?}"),
        }
        match bytes_hook(Value::Bytes(vec![1, 2])).unwrap() {
            Value::Bytes(v) => assert_eq!(v, vec![1, 2]),
            other => panic!("Expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_bytes_hook_encodes_text_as_utf8() {
        match bytes_hook(Value::String("héllo".to_string())).unwrap() {
            Value::Bytes(v) => assert_eq!(v, "héllo".as_bytes().to_vec()),
            other => panic!("Expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_uuid_hook_parses_text() {
        let literal = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        match uuid_hook(Value::String(literal.to_string())).unwrap() {
            Value::Uuid(v) => assert_eq!(v.to_string(), literal),
            other => panic!("Expected uuid, got {other:?}"),
        }
        match uuid_hook(Value::String("zzz".to_string())) {
            Err(CoerceError::InvalidFormat { target, .. }) => assert_eq!(target, "UUID"),
            other => panic!("Expected invalid format, got {other:?}"),
        }
    }
}
