//! Date helper functions

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

/// Medium date for display, like `Jan 5, 2024`
///
/// Undated posts get the draft label instead.
pub fn post_date<Tz: TimeZone>(date: Option<&DateTime<Tz>>, draft_label: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => draft_label.to_string(),
    }
}

/// Four-digit current year, in the given timezone or local time
pub fn current_year(tz: Option<chrono_tz::Tz>) -> String {
    let year = match tz {
        Some(tz) => Utc::now().with_timezone(&tz).year(),
        None => Local::now().year(),
    };
    format!("{:04}", year)
}

/// Format a date in ISO 8601 for `<time datetime>` attributes
pub fn iso_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_post_date() {
        let date = Local.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(post_date(Some(&date), "Draft"), "Jan 5, 2024");

        let date = Local.with_ymd_and_hms(2023, 10, 14, 0, 0, 0).unwrap();
        assert_eq!(post_date(Some(&date), "Draft"), "Oct 14, 2023");
    }

    #[test]
    fn test_post_date_undated() {
        assert_eq!(post_date::<Local>(None, "Draft"), "Draft");
        assert_eq!(post_date::<Local>(None, "Unpublished"), "Unpublished");
    }

    #[test]
    fn test_current_year() {
        let year = current_year(None);
        assert_eq!(year.len(), 4);
        assert_eq!(year, Local::now().year().to_string());
        assert_eq!(current_year(Some(chrono_tz::UTC)).len(), 4);
    }

    #[test]
    fn test_iso_date() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let date = tz.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(iso_date(&date), "2024-06-01T08:00:00+02:00");
    }
}
