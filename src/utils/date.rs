//! Calendar helpers: ISO-week alignment, weekend detection, month spans and
//! the configured calendar (time zone) used to turn instants into dates.

use crate::errors::{AppError, AppResult};
use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use std::fmt;

/// Monday of the week containing `date` (weekday Mon=0..Sun=6 subtracted).
pub fn start_of_iso_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -(date.weekday().num_days_from_monday() as i64))
}

/// Shift by whole days, saturating at the ends of chrono's date range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn all_days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let Some(mut d) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return out;
    };

    while d.month() == month {
        out.push(d);
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }

    out
}

/// `YYYY-MM` → first day of that month.
pub fn parse_month(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(s.to_string()))
}

pub fn month_name(month: &str) -> &'static str {
    match month {
        "01" => "January",
        "02" => "February",
        "03" => "March",
        "04" => "April",
        "05" => "May",
        "06" => "June",
        "07" => "July",
        "08" => "August",
        "09" => "September",
        "10" => "October",
        "11" => "November",
        "12" => "December",
        _ => "",
    }
}

/// Danish weekday names, Monday first (timesheet labels).
pub fn weekday_name_da(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mandag",
        Weekday::Tue => "Tirsdag",
        Weekday::Wed => "Onsdag",
        Weekday::Thu => "Torsdag",
        Weekday::Fri => "Fredag",
        Weekday::Sat => "Lørdag",
        Weekday::Sun => "Søndag",
    }
}

/// The calendar used to read an instant's local date and time.
///
/// Every report uses the same calendar, so weekday and week attribution
/// never mix local time with UTC.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Calendar {
    #[default]
    Local,
    Zone(Tz),
}

impl Calendar {
    /// `local` (any case) or an IANA zone name such as `Europe/Copenhagen`.
    pub fn parse(name: &str) -> AppResult<Self> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Ok(Calendar::Local);
        }

        name.parse::<Tz>()
            .map(Calendar::Zone)
            .map_err(|e| AppError::Config(format!("unknown time zone '{name}': {e}")))
    }

    pub fn utc() -> Self {
        Calendar::Zone(chrono_tz::UTC)
    }

    pub fn date_of(&self, instant: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            Calendar::Local => instant.with_timezone(&Local).date_naive(),
            Calendar::Zone(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    pub fn time_of(&self, instant: &DateTime<FixedOffset>) -> NaiveTime {
        match self {
            Calendar::Local => instant.with_timezone(&Local).time(),
            Calendar::Zone(tz) => instant.with_timezone(tz).time(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        let now = Utc::now().fixed_offset();
        self.date_of(&now)
    }

    /// Wall-clock date + time in this calendar → absolute instant.
    /// Ambiguous times (DST fall-back) resolve to the earlier instant.
    pub fn to_instant(&self, date: NaiveDate, time: NaiveTime) -> AppResult<DateTime<FixedOffset>> {
        let naive = date.and_time(time);
        let resolved = match self {
            Calendar::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Calendar::Zone(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        };

        resolved.ok_or_else(|| {
            AppError::InvalidTime(format!("{naive} does not exist in time zone {self}"))
        })
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Calendar::Local => f.write_str("local"),
            Calendar::Zone(tz) => f.write_str(tz.name()),
        }
    }
}
