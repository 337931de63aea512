//! Deterministic identifiers for recurring occurrences.
//!
//! An occurrence is identified by `<template id>_<start of day in base-36
//! milliseconds>`. The same template and day always produce the same id, so
//! a completed occurrence that was stored under that id keeps shadowing the
//! generated one no matter how often the range is recomputed.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;
use crate::models::Task;
use crate::timezone::CalendarContext;

pub const INSTANCE_ID_SEPARATOR: char = '_';

const RADIX: u32 = 36;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The decoded parts of an instance identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub template_id: String,
    /// Start of the occurrence day, in Unix milliseconds
    pub date_millis: i64,
}

impl InstanceRef {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date_millis)
    }

    /// The occurrence day in `ctx`'s calendar.
    pub fn date(&self, ctx: &CalendarContext) -> Option<NaiveDate> {
        self.starts_at().map(|instant| ctx.local_date(instant))
    }
}

/// Builds the identifier of `template_id`'s occurrence on `date`.
///
/// Template ids must be non-empty and free of the separator; this keeps
/// every instance id decodable without guessing which separator splits it.
pub fn make_instance_id(
    template_id: &str,
    date: NaiveDate,
    ctx: &CalendarContext,
) -> Result<String, CoreError> {
    if template_id.is_empty() {
        return Err(CoreError::InvalidInput("template id is empty".to_string()));
    }
    if template_id.contains(INSTANCE_ID_SEPARATOR) {
        return Err(CoreError::InvalidInput(format!(
            "template id '{}' contains the reserved separator '{}'",
            template_id, INSTANCE_ID_SEPARATOR
        )));
    }
    let millis = ctx.start_of_day(date).timestamp_millis();
    Ok(format!(
        "{}{}{}",
        template_id,
        INSTANCE_ID_SEPARATOR,
        encode_base36(millis)
    ))
}

/// Decodes an instance identifier; anything malformed is simply not an
/// instance id.
pub fn parse_instance_id(id: &str) -> Option<InstanceRef> {
    let (template_id, encoded) = id.rsplit_once(INSTANCE_ID_SEPARATOR)?;
    if template_id.is_empty() || template_id.contains(INSTANCE_ID_SEPARATOR) {
        return None;
    }
    let date_millis = decode_base36(encoded)?;
    Some(InstanceRef {
        template_id: template_id.to_string(),
        date_millis,
    })
}

/// Whether `task` is the occurrence of `template` it claims to be by id.
pub fn is_instance_of(task: &Task, template: &Task, ctx: &CalendarContext) -> bool {
    let date = ctx.local_date(task.due_at);
    make_instance_id(&template.id, date, ctx).is_ok_and(|expected| expected == task.id)
}

fn encode_base36(value: i64) -> String {
    let mut magnitude = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(magnitude % RADIX as u64) as usize]);
        magnitude /= RADIX as u64;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    // Only ASCII digits and '-' were pushed.
    String::from_utf8_lossy(&digits).into_owned()
}

fn decode_base36(encoded: &str) -> Option<i64> {
    let digits = encoded.strip_prefix('-').unwrap_or(encoded);
    if digits.is_empty()
        || !digits
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
    {
        return None;
    }
    i64::from_str_radix(encoded, RADIX).ok()
}
