use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// One logged shift, as consumed by the weekly aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    pub subject_id: String,          // ⇔ time_entries.user_id
    pub site_id: Option<String>,     // ⇔ time_entries.workplace_id
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: DateTime<FixedOffset>,
    pub break_minutes: i64,
}

impl TimeInterval {
    pub fn new(
        subject_id: impl Into<String>,
        site_id: Option<String>,
        started_at: DateTime<FixedOffset>,
        ended_at: DateTime<FixedOffset>,
        break_minutes: i64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            site_id,
            started_at,
            ended_at,
            break_minutes,
        }
    }

    /// Elapsed minutes (rounded half-up from milliseconds) minus the break,
    /// never below zero. A negative break counts as no break.
    pub fn worked_minutes(&self) -> i64 {
        let elapsed_ms = (self.ended_at - self.started_at).num_milliseconds();
        let elapsed = (elapsed_ms + 30_000).div_euclid(60_000);
        if elapsed <= 0 {
            return 0;
        }
        let brk = self.break_minutes.max(0);

        (elapsed - brk).max(0)
    }
}

/// Row shape returned by the interval source before timestamp parsing.
#[derive(Debug, Clone)]
pub struct RawInterval {
    pub id: i64,
    pub subject_id: String,
    pub site_id: Option<String>,
    pub started_at: String,
    pub ended_at: String,
    pub break_minutes: i64,
    pub notes: Option<String>,
}

impl RawInterval {
    pub fn parse(&self) -> AppResult<TimeInterval> {
        let started_at = DateTime::parse_from_rfc3339(&self.started_at)
            .map_err(|_| AppError::InvalidTimestamp(self.started_at.clone()))?;
        let ended_at = DateTime::parse_from_rfc3339(&self.ended_at)
            .map_err(|_| AppError::InvalidTimestamp(self.ended_at.clone()))?;

        Ok(TimeInterval {
            subject_id: self.subject_id.clone(),
            site_id: self.site_id.clone(),
            started_at,
            ended_at,
            break_minutes: self.break_minutes,
        })
    }
}

/// A shift about to be registered.
#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub user_id: String,
    pub workplace_id: Option<i64>,
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: DateTime<FixedOffset>,
    pub break_minutes: i64,
    pub notes: Option<String>,
}
