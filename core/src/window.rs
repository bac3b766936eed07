//! Backfill time windows.
//!
//! A window is given either explicitly (start, optional end) or as a relative
//! offset of days/hours/minutes ending now. Timestamps are UTC ISO-8601 with a
//! literal `Z`.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resolved window sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: Option<String>,
}

/// Caller-supplied window description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSpec {
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl WindowSpec {
    pub fn explicit(start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            start: Some(start.into()),
            end,
            ..Default::default()
        }
    }

    pub fn offset(days: u64, hours: u64, minutes: u64) -> Self {
        Self {
            days,
            hours,
            minutes,
            ..Default::default()
        }
    }

    /// Build an offset spec from loosely typed values (numbers or numeric strings).
    pub fn from_offset_values(days: &Value, hours: &Value, minutes: &Value) -> CoreResult<Self> {
        Ok(Self::offset(
            coerce_offset(days, "days")?,
            coerce_offset(hours, "hours")?,
            coerce_offset(minutes, "minutes")?,
        ))
    }

    fn has_offset(&self) -> bool {
        self.days > 0 || self.hours > 0 || self.minutes > 0
    }

    fn explicit_start(&self) -> Option<&str> {
        self.start.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn resolve(&self) -> CoreResult<TimeWindow> {
        self.resolve_at(Utc::now())
    }

    /// Resolve against a fixed `now`.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> CoreResult<TimeWindow> {
        match (self.explicit_start(), self.has_offset()) {
            (Some(_), true) => Err(CoreError::InvalidArgument(
                "provide either `start` or `days`/`hours`/`minutes`, not both".to_string(),
            )),
            (Some(start), false) => Ok(TimeWindow {
                start: start.to_string(),
                end: self.end.clone().filter(|e| !e.trim().is_empty()),
            }),
            (None, true) => {
                let delta = offset_duration(self.days, self.hours, self.minutes)?;
                let start = now.checked_sub_signed(delta).ok_or_else(|| {
                    CoreError::InvalidArgument("offset reaches before the representable range".to_string())
                })?;
                Ok(TimeWindow {
                    start: format_utc(start),
                    end: Some(format_utc(now)),
                })
            }
            (None, false) => Err(CoreError::MissingArgument(
                "either `start` or `days`/`hours`/`minutes` must be provided".to_string(),
            )),
        }
    }
}

/// Format as ISO-8601 UTC with millisecond precision and a literal `Z`.
pub fn format_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Coerce a numeric-like value to a non-negative integer. `null` counts as zero.
pub fn coerce_offset(value: &Value, name: &str) -> CoreResult<u64> {
    let invalid = || {
        CoreError::InvalidArgument(format!(
            "`{}` must be a non-negative integer. Got: {}",
            name, value
        ))
    };
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else {
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u64),
                    _ => Err(invalid()),
                }
            }
        }
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn offset_duration(days: u64, hours: u64, minutes: u64) -> CoreResult<Duration> {
    let total_minutes = days
        .checked_mul(24 * 60)
        .and_then(|d| hours.checked_mul(60).and_then(|h| d.checked_add(h)))
        .and_then(|dh| dh.checked_add(minutes))
        .and_then(|m| i64::try_from(m).ok())
        .ok_or_else(|| CoreError::InvalidArgument("offset is too large".to_string()))?;
    Duration::try_minutes(total_minutes)
        .ok_or_else(|| CoreError::InvalidArgument("offset is too large".to_string()))
}
