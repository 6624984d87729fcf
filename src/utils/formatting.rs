//! Formatting utilities used for CLI and export outputs.

/// `510` → `8h 30m`
pub fn hhmm(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{}h {}m", sign, m / 60, m % 60)
}

/// Decimal hours rounded to two places: `510` → `8.5`, `20` → `0.33`.
pub fn hours_decimal(mins: i64) -> f64 {
    (mins as f64 / 60.0 * 100.0).round() / 100.0
}

/// Decimal hours as table text, blank when zero (timesheet cells).
pub fn hours_cell(mins: i64) -> String {
    if mins == 0 {
        String::new()
    } else {
        format_hours(hours_decimal(mins))
    }
}

/// Prints `8.5` as `8.5` and `8.0` as `8`.
pub fn format_hours(h: f64) -> String {
    let s = format!("{:.2}", h);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Overview tables: one decimal and an `h` suffix, e.g. `42.5 h`.
pub fn hours_short(mins: i64) -> String {
    format!("{:.1} h", mins as f64 / 60.0)
}
