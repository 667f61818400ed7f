//! Conversion between the wall-clock strings an editor works with
//! (`2025-01-10T09:00`) and absolute instants used on the wire.

use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::PlannerError;

pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Local,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalCodec {
    zone: Zone,
}

impl Default for TemporalCodec {
    fn default() -> Self {
        Self::local()
    }
}

impl TemporalCodec {
    /// Wall clock follows the system time zone.
    pub fn local() -> Self {
        Self { zone: Zone::Local }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            zone: Zone::Fixed(offset),
        }
    }

    pub fn utc() -> Self {
        Self::with_offset(Utc.fix())
    }

    /// Parses a wall-clock string into an instant. Full RFC 3339 strings are
    /// accepted as-is since they already carry their offset.
    pub fn to_instant(&self, value: &str) -> Result<DateTime<Utc>, PlannerError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlannerError::InvalidTimestamp(value.to_string()));
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(instant.with_timezone(&Utc));
        }

        let naive = ACCEPTED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .ok_or_else(|| PlannerError::InvalidTimestamp(value.to_string()))?;

        let resolved = match self.zone {
            Zone::Local => earliest(Local.from_local_datetime(&naive)),
            Zone::Fixed(offset) => earliest(offset.from_local_datetime(&naive)),
        };

        resolved.ok_or_else(|| PlannerError::InvalidTimestamp(value.to_string()))
    }

    pub fn to_local_wall_clock(&self, instant: &DateTime<Utc>) -> String {
        match self.zone {
            Zone::Local => instant.with_timezone(&Local).format(WALL_CLOCK_FORMAT).to_string(),
            Zone::Fixed(offset) => instant
                .with_timezone(&offset)
                .format(WALL_CLOCK_FORMAT)
                .to_string(),
        }
    }
}

// Ambiguous local times (DST fall-back) resolve to the first occurrence;
// skipped ones (spring-forward) do not exist and fail.
fn earliest<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    result.earliest().map(|dt| dt.with_timezone(&Utc))
}

/// Parses offsets such as `+09:00`, `-0530` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, PlannerError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| PlannerError::Config(format!("invalid UTC offset: {}", value)));
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(PlannerError::Config(format!("invalid UTC offset: {}", value))),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PlannerError::Config(format!("invalid UTC offset: {}", value)));
    }

    let hours: i32 = digits[..2]
        .parse()
        .map_err(|_| PlannerError::Config(format!("invalid UTC offset: {}", value)))?;
    let minutes: i32 = digits[2..]
        .parse()
        .map_err(|_| PlannerError::Config(format!("invalid UTC offset: {}", value)))?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| PlannerError::Config(format!("invalid UTC offset: {}", value)))
}
