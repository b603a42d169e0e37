use chrono::{Days, NaiveDate};

/// Parse a day selector: `today`, `yesterday`, `YYYY-MM-DD` or `YYYY/MM/DD`
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    match s.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| "Date out of range".to_string()),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(other, "%Y/%m/%d"))
            .map_err(|_| {
                format!("Invalid date '{s}'. Use 'today', 'yesterday', YYYY-MM-DD or YYYY/MM/DD.")
            }),
    }
}

pub fn local_today() -> NaiveDate {
    chrono::offset::Local::now().date_naive()
}
