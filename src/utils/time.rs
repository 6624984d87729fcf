//! Time utilities: parsing HH:MM and rendering instants in a calendar.

use crate::errors::{AppError, AppResult};
use crate::utils::date::Calendar;
use chrono::{DateTime, FixedOffset, NaiveTime};

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

pub fn parse_required_time(t: &str) -> AppResult<NaiveTime> {
    parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))
}

/// `HH:MM` of an instant read in the given calendar.
pub fn clock_text(calendar: &Calendar, instant: &DateTime<FixedOffset>) -> String {
    calendar.time_of(instant).format("%H:%M").to_string()
}
