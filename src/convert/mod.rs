//! Value conversion between representations.
//!
//! Three forms flow through the engine: native values (chrono temporals,
//! `BigDecimal`, native containers), the codec's value tree, and Avro JSON.
//! `outbound` normalizes native instances into codec values for encoding,
//! `inbound` reconstructs typed instances from decoded codec values, and
//! `json` maps codec values to and from the Avro JSON encoding. This module
//! holds the numeric conversions and byte conventions they share.

pub(crate) mod inbound;
pub(crate) mod json;
pub(crate) mod outbound;

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use num_bigint::BigInt;

use crate::schema::{AvroSchema, RecordSchema};

// Days from 0001-01-01 (CE) to the Unix epoch
const EPOCH_DAYS_CE: i32 = 719_163;

pub(crate) fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_CE)?)
}

pub(crate) fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_CE
}

pub(crate) fn time_from_millis(millis: i32) -> Option<NaiveTime> {
    if millis < 0 {
        return None;
    }
    let seconds = (millis / 1_000) as u32;
    let nanos = (millis % 1_000) as u32 * 1_000_000;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
}

pub(crate) fn millis_from_time(time: NaiveTime) -> i32 {
    (time.num_seconds_from_midnight() * 1_000 + time.nanosecond() / 1_000_000) as i32
}

pub(crate) fn time_from_micros(micros: i64) -> Option<NaiveTime> {
    if micros < 0 {
        return None;
    }
    let seconds = u32::try_from(micros / 1_000_000).ok()?;
    let nanos = (micros % 1_000_000) as u32 * 1_000;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
}

pub(crate) fn micros_from_time(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * 1_000_000 + (time.nanosecond() / 1_000) as i64
}

pub(crate) fn datetime_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

pub(crate) fn datetime_from_micros(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}

/// The unscaled integer of a decimal at exactly `scale`, or `None` when the
/// value carries more fractional digits than the scale holds or more
/// significant digits than the precision allows. Nothing is rounded away.
pub(crate) fn decimal_unscaled(value: &BigDecimal, precision: u32, scale: u32) -> Option<BigInt> {
    let (_, exponent) = value.normalized().into_bigint_and_exponent();
    if exponent > scale as i64 {
        return None;
    }
    let (unscaled, _) = value.with_scale(scale as i64).into_bigint_and_exponent();
    let digits = unscaled.magnitude().to_str_radix(10).len() as u32;
    if digits > precision {
        return None;
    }
    Some(unscaled)
}

pub(crate) fn decimal_from_unscaled(bytes: &[u8], scale: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from_signed_bytes_be(bytes), scale as i64)
}

/// Left-pad two's-complement bytes to a fixed width
pub(crate) fn sign_extend(bytes: &[u8], size: usize) -> Option<Vec<u8>> {
    if bytes.len() > size {
        return None;
    }
    let fill = if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        0xff
    } else {
        0x00
    };
    let mut out = vec![fill; size - bytes.len()];
    out.extend_from_slice(bytes);
    Some(out)
}

/// Render bytes with the Avro JSON convention: one char per byte
pub(crate) fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Read bytes back from the one-char-per-byte convention; `None` when the
/// text carries characters above U+00FF
pub(crate) fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

/// Named record schemas reachable from a root, for resolving references
/// while walking codec values
pub(crate) struct SchemaIndex<'a> {
    records: HashMap<String, &'a RecordSchema>,
}

impl<'a> SchemaIndex<'a> {
    pub(crate) fn from_schema(schema: &'a AvroSchema) -> Self {
        let mut index = Self {
            records: HashMap::new(),
        };
        index.collect(schema);
        index
    }

    fn collect(&mut self, schema: &'a AvroSchema) {
        match schema {
            AvroSchema::Record(record) => {
                self.records.insert(record.fullname(), record);
                self.records.entry(record.name.clone()).or_insert(record);
                for field in &record.fields {
                    self.collect(&field.schema);
                }
            }
            AvroSchema::Array(inner) | AvroSchema::Map(inner) => self.collect(inner),
            AvroSchema::Union(variants) => {
                for variant in variants {
                    self.collect(variant);
                }
            }
            AvroSchema::Logical(logical) => self.collect(&logical.base),
            AvroSchema::Null
            | AvroSchema::Boolean
            | AvroSchema::Int
            | AvroSchema::Long
            | AvroSchema::Float
            | AvroSchema::Double
            | AvroSchema::Bytes
            | AvroSchema::String
            | AvroSchema::Enum(_)
            | AvroSchema::Fixed(_)
            | AvroSchema::Named(_) => {}
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a RecordSchema> {
        self.records.get(name).copied()
    }
}
