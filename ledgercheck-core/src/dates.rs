use chrono::{Days, Local, NaiveDate};

/// Calendar format used by the ledger API for movement dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Local calendar date `days` away from today, formatted as `dd/mm/yyyy`.
pub fn offset_date(days: i64) -> String {
    offset_date_from(Local::now().date_naive(), days)
}

/// Same as [`offset_date`] but anchored at `base` instead of today.
///
/// Arithmetic is done on calendar days, so DST transitions never shift the result.
/// Offsets that would leave chrono's supported range return `base` unchanged.
pub fn offset_date_from(base: NaiveDate, days: i64) -> String {
    let shifted = if days >= 0 {
        base.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        base.checked_sub_days(Days::new(days.unsigned_abs()))
    };

    shifted.unwrap_or(base).format(DATE_FORMAT).to_string()
}

/// Parses a `dd/mm/yyyy` string back into a date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}
