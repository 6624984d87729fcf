// src/export/range.rs
use crate::core::aggregator::WeekWindow;
use crate::errors::{AppError, AppResult};
use crate::utils::date::{add_days, parse_date};
use chrono::{Datelike, NaiveDate};

/// Parse `--range` into an inclusive `(first, last)` day pair.
///
/// Accepted: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or two values of the same
/// shape joined by `:` (e.g. `2025-09:2025-11`).
pub(crate) fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let r = r.trim();

    let (first, last) = match r.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (a.trim(), b.trim());
            if a.len() != b.len() {
                return Err(invalid(r, "start and end must have the same format"));
            }
            (span(a)?.0, span(b)?.1)
        }
        None => span(r)?,
    };

    if last < first {
        return Err(invalid(r, "end is before start"));
    }
    Ok((first, last))
}

/// `None` and `all` mean no explicit window.
pub(crate) fn range_window(range: Option<&str>) -> AppResult<Option<WeekWindow>> {
    match range.map(str::trim) {
        None => Ok(None),
        Some(r) if r.is_empty() || r.eq_ignore_ascii_case("all") => Ok(None),
        Some(r) => {
            let (first, last) = parse_range(r)?;
            Ok(Some(WeekWindow::new(first, add_days(last, 1))))
        }
    }
}

/// First and last day covered by one range token.
fn span(token: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match token.len() {
        4 => {
            let y: i32 = token.parse().map_err(|_| invalid(token, "invalid year"))?;
            let first =
                NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(|| invalid(token, "invalid year"))?;
            let last =
                NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(|| invalid(token, "invalid year"))?;
            Ok((first, last))
        }
        7 => {
            let first = parse_date(&format!("{token}-01"))
                .ok_or_else(|| invalid(token, "invalid month"))?;
            Ok((first, last_of_month(first)))
        }
        10 => {
            let d = parse_date(token).ok_or_else(|| invalid(token, "invalid date"))?;
            Ok((d, d))
        }
        _ => Err(invalid(token, "unsupported range format")),
    }
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .map(|next| add_days(next, -1))
        .unwrap_or(first)
}

fn invalid(r: &str, why: &str) -> AppError {
    AppError::InvalidDate(format!("{r} ({why})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_tokens() {
        assert_eq!(parse_range("2025").unwrap(), (d(2025, 1, 1), d(2025, 12, 31)));
        assert_eq!(parse_range("2024-02").unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(parse_range("2025-12").unwrap(), (d(2025, 12, 1), d(2025, 12, 31)));
        assert_eq!(parse_range("2025-10-13").unwrap(), (d(2025, 10, 13), d(2025, 10, 13)));
    }

    #[test]
    fn ranges_need_matching_shapes_and_order() {
        assert_eq!(
            parse_range("2025-09:2025-11").unwrap(),
            (d(2025, 9, 1), d(2025, 11, 30))
        );
        assert!(parse_range("2025:2025-11").is_err());
        assert!(parse_range("2025-11-02:2025-11-01").is_err());
        assert!(parse_range("2025-13").is_err());
        assert!(parse_range("last week").is_err());
    }

    #[test]
    fn window_is_half_open() {
        let w = range_window(Some("2025-10")).unwrap().unwrap();
        assert_eq!(w, WeekWindow::new(d(2025, 10, 1), d(2025, 11, 1)));
        assert!(range_window(Some("ALL")).unwrap().is_none());
        assert!(range_window(None).unwrap().is_none());
    }
}
