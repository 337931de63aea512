use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use tempo_core::models::WeekdaySet;
use tempo_core::timezone::CalendarContext;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parses a calendar day: `YYYY-MM-DD`, `today`, `tomorrow` or `yesterday`.
pub fn parse_date(input: &str, ctx: &CalendarContext, now: DateTime<Utc>) -> Result<NaiveDate> {
    let today = ctx.today(now);
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today.succ_opt().ok_or_else(|| anyhow!("Date out of range")),
        "yesterday" => today.pred_opt().ok_or_else(|| anyhow!("Date out of range")),
        _ => NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| {
            anyhow!(
                "Failed to parse date '{}'. Use YYYY-MM-DD, today, tomorrow or yesterday",
                input
            )
        }),
    }
}

/// Parses a due instant in `ctx`'s wall clock.
///
/// A bare day means the start of that day; `YYYY-MM-DD HH:MM` keeps the time.
pub fn parse_due(input: &str, ctx: &CalendarContext, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, format) {
            return ctx
                .timezone()
                .from_local_datetime(&local)
                .earliest()
                .map(|instant| instant.with_timezone(&Utc))
                .ok_or_else(|| anyhow!("'{}' does not exist in {}", trimmed, ctx.timezone()));
        }
    }
    parse_date(trimmed, ctx, now).map(|date| ctx.start_of_day(date))
}

/// Parses a weekday list such as `mon,wed,fri` (names or 0=Sunday..6=Saturday).
pub fn parse_weekdays(input: &str) -> Result<WeekdaySet> {
    let mut days = WeekdaySet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = match part.parse::<u8>() {
            Ok(index) if index <= 6 => (0..index).fold(Weekday::Sun, |day, _| day.succ()),
            Ok(index) => return Err(anyhow!("Invalid weekday index {}: expected 0 (Sunday) to 6 (Saturday)", index)),
            Err(_) => part
                .parse::<Weekday>()
                .map_err(|_| anyhow!("Invalid weekday '{}'. Use mon, tue, wed, thu, fri, sat, sun", part))?,
        };
        days.insert(day);
    }
    if days.is_empty() {
        return Err(anyhow!("No weekdays given"));
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_date_keywords_follow_calendar() {
        let utc = CalendarContext::utc();
        assert_eq!(parse_date("today", &utc, now()).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        // Already Saturday in Tokyo
        let tokyo = CalendarContext::from_name("Asia/Tokyo").unwrap();
        assert_eq!(parse_date("Today", &tokyo, now()).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(parse_date("tomorrow", &tokyo, now()).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let utc = CalendarContext::utc();
        assert!(parse_date("next blursday", &utc, now()).is_err());
        assert!(parse_date("2024-02-30", &utc, now()).is_err());
    }

    #[test]
    fn test_parse_due_uses_local_wall_clock() {
        let berlin = CalendarContext::from_name("Europe/Berlin").unwrap();
        assert_eq!(
            parse_due("2024-06-01 09:30", &berlin, now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 7, 30, 0).unwrap()
        );
        assert_eq!(
            parse_due("2024-06-01", &berlin, now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_weekdays() {
        let days = parse_weekdays("mon, Wednesday,5").unwrap();
        assert_eq!(days.indices(), vec![1, 3, 5]);
        assert!(parse_weekdays("mon,funday").is_err());
        assert!(parse_weekdays("7").is_err());
        assert!(parse_weekdays(" , ").is_err());
    }
}
