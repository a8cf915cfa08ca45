use crate::{error::CompileError, params::ParamBag, value::Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

///
/// TimeRange
///
/// Resolved time window on one column. Instants are UTC; the zone the
/// day-level keywords were interpreted in rides along for backends that
/// need it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimeRange {
    pub column: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub timezone: Tz,
}

///
/// Resolve a time window from request parameters, first match wins:
///
/// - `date`: a single day in the entity zone.
/// - `date_from` / `date_to`: inclusive day-level range; `date_to`
///   defaults to now.
/// - `datetime_from` / `datetime_to`: exact instants; `datetime_to`
///   defaults to now.
///
/// `time_column` overrides the entity's configured column. No recognized
/// key means no window.
///
pub(crate) fn resolve_time(
    params: &ParamBag,
    default_column: &str,
    zone: &str,
    now: DateTime<Utc>,
) -> Result<Option<TimeRange>, CompileError> {
    let tz: Tz = zone
        .parse()
        .map_err(|_| CompileError::invalid_input(format!("unknown time zone '{zone}'")))?;

    let column = params
        .get("time_column")
        .and_then(Value::as_text)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(default_column)
        .to_string();

    if let Some(value) = params.get("date").filter(|v| v.is_filled()) {
        let day = parse_date("date", value)?;
        let (from, to) = day_bounds(day, tz);
        return Ok(Some(TimeRange {
            column,
            from: Some(from),
            to: Some(to),
            timezone: tz,
        }));
    }

    if let Some(value) = params.get("date_from").filter(|v| v.is_filled()) {
        let from = day_bounds(parse_date("date_from", value)?, tz).0;
        let to = match params.get("date_to").filter(|v| v.is_filled()) {
            Some(value) => day_bounds(parse_date("date_to", value)?, tz).1,
            None => now,
        };
        return Ok(Some(TimeRange {
            column,
            from: Some(from),
            to: Some(to),
            timezone: tz,
        }));
    }

    if let Some(value) = params.get("datetime_from").filter(|v| v.is_filled()) {
        let from = parse_instant("datetime_from", value, tz)?;
        let to = match params.get("datetime_to").filter(|v| v.is_filled()) {
            Some(value) => parse_instant("datetime_to", value, tz)?,
            None => now,
        };
        return Ok(Some(TimeRange {
            column,
            from: Some(from),
            to: Some(to),
            timezone: tz,
        }));
    }

    Ok(None)
}

// Inclusive [start-of-day, end-of-day] bounds in the given zone, as UTC.
fn day_bounds(day: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN);
    let end = day
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN));

    (local_to_utc(start, tz), local_to_utc(end, tz))
}

// DST gaps/folds resolve to the earliest valid instant.
fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local).earliest() {
        Some(instant) => instant.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&local),
    }
}

fn parse_date(key: &str, value: &Value) -> Result<NaiveDate, CompileError> {
    let text = value
        .as_text()
        .ok_or_else(|| CompileError::invalid_input(format!("'{key}' must be a date string")))?;

    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| CompileError::invalid_input(format!("'{key}' is not a valid date: '{text}'")))
}

fn parse_instant(key: &str, value: &Value, tz: Tz) -> Result<DateTime<Utc>, CompileError> {
    let text = value.as_text().ok_or_else(|| {
        CompileError::invalid_input(format!("'{key}' must be a datetime string"))
    })?;
    let text = text.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(local) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(local_to_utc(local, tz));
        }
    }

    // A bare date is accepted as midnight in the entity zone.
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(local_to_utc(day.and_time(NaiveTime::MIN), tz));
    }

    Err(CompileError::invalid_input(format!(
        "'{key}' is not a valid datetime: '{text}'"
    )))
}
