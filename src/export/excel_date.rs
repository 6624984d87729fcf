// src/export/excel_date.rs
use chrono::NaiveDate;

/// `YYYY-MM-DD` → Excel serial day number (1900 date system).
pub(crate) fn date_to_excel_serial(s: &str) -> Option<f64> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    Some((date - epoch).num_days() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_serials() {
        assert_eq!(date_to_excel_serial("1900-03-01"), Some(61.0));
        assert_eq!(date_to_excel_serial("2025-10-13"), Some(45943.0));
        assert_eq!(date_to_excel_serial("2025W42"), None);
    }
}
