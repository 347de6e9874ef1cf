//! Local-time reconstruction and booking/forecast matching.

use super::series::{ForecastPoint, ForecastSeries};
use crate::error::ValidationError;
use crate::records::ScheduledActivity;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

/// Layouts tried after RFC 3339, for `%z` offsets without a colon.
const TIMESTAMP_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%z",
];

const DISPLAY_FORMAT: &str = "%A, %B %-d, %I:%M %p";

fn timestamp_error(raw: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Timestamp {
        raw: raw.to_string(),
        reason: reason.into(),
    }
}

fn two_digits(raw: &str, digits: &str) -> Result<i32, ValidationError> {
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(timestamp_error(raw, "offset is not [+-]HHMM"));
    }
    digits
        .parse()
        .map_err(|_| timestamp_error(raw, "offset is not [+-]HHMM"))
}

/// Signed UTC offset embedded at the tail of a start-time string:
/// `...+0930`, `...-0500`, `...+09:30` or a trailing `Z`.
///
/// The sign applies to the hour and minute parts alike.
pub fn parse_embedded_offset(raw: &str) -> Result<FixedOffset, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('Z') || trimmed.ends_with('z') {
        return FixedOffset::east_opt(0).ok_or_else(|| timestamp_error(raw, "offset out of range"));
    }

    let colon_form = trimmed.len() >= 6 && trimmed.as_bytes()[trimmed.len() - 3] == b':';
    let tail_len = if colon_form { 6 } else { 5 };
    let tail = trimmed
        .len()
        .checked_sub(tail_len)
        .and_then(|start| trimmed.get(start..))
        .filter(|tail| tail.is_ascii())
        .ok_or_else(|| timestamp_error(raw, "no trailing offset"))?;

    let (sign, rest) = tail.split_at(1);
    let sign = match sign {
        "+" => 1,
        "-" => -1,
        _ => return Err(timestamp_error(raw, "offset has no sign")),
    };
    let (hours, minutes) = if colon_form {
        (&rest[..2], &rest[3..])
    } else {
        rest.split_at(2)
    };
    let hours = two_digits(raw, hours)?;
    let minutes = two_digits(raw, minutes)?;
    if hours > 23 || minutes > 59 {
        return Err(timestamp_error(raw, "offset out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| timestamp_error(raw, "offset out of range"))
}

/// Absolute instant of a start-time string.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    TIMESTAMP_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(trimmed, layout).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok_or_else(|| timestamp_error(raw, "not an ISO 8601 timestamp with offset"))
}

/// Instant shifted by `record_offset - host_offset` and viewed in the host's
/// zone, so its wall clock reads as the record's own local time.
pub fn display_instant(
    instant: DateTime<Utc>,
    record_offset: FixedOffset,
    host_offset: FixedOffset,
) -> DateTime<FixedOffset> {
    let shift = i64::from(record_offset.local_minus_utc() - host_offset.local_minus_utc());
    (instant + TimeDelta::seconds(shift)).with_timezone(&host_offset)
}

/// `Wednesday, April 5, 07:00 AM`.
pub fn format_display(local: DateTime<FixedOffset>) -> String {
    local.format(DISPLAY_FORMAT).to_string()
}

/// Active, scheduled bookings strictly after `now`, in input order, paired
/// with their parsed start instant.
pub fn upcoming(
    activities: &[ScheduledActivity],
    now: DateTime<Utc>,
) -> Result<Vec<(&ScheduledActivity, DateTime<Utc>)>, ValidationError> {
    let mut kept = Vec::new();
    for activity in activities {
        if !activity.active || !activity.activity_was_scheduled {
            continue;
        }
        let starts_at = parse_instant(&activity.start_date)?;
        if starts_at > now {
            kept.push((activity, starts_at));
        }
    }
    Ok(kept)
}

/// One booking and the forecast covering it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForecast {
    pub activity_uuid: String,
    pub starts_at: DateTime<Utc>,
    /// Record-local start time, formatted for display.
    pub local_label: String,
    pub forecast: Option<ForecastPoint>,
}

/// Match every upcoming booking against `series`. Malformed start times or
/// offsets fail the whole correlation.
pub fn correlate(
    activities: &[ScheduledActivity],
    series: &ForecastSeries,
    now: DateTime<Utc>,
    host_offset: FixedOffset,
) -> Result<Vec<BookingForecast>, ValidationError> {
    upcoming(activities, now)?
        .into_iter()
        .map(|(activity, starts_at)| {
            let record_offset = parse_embedded_offset(&activity.start_date)?;
            let local = display_instant(starts_at, record_offset, host_offset);
            Ok(BookingForecast {
                activity_uuid: activity.uuid.clone(),
                starts_at,
                local_label: format_display(local),
                forecast: series.point_at(starts_at).cloned(),
            })
        })
        .collect()
}
