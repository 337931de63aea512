use crate::error::CoreError;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone).map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// The wall-clock calendar every date computation is evaluated in.
///
/// Recurrence is defined on local calendar days: "every Monday" means the
/// Monday of the user's calendar, not of UTC. The context is passed to every
/// operation that turns a timestamp into a day or a day into a timestamp, so
/// results never depend on the host's ambient timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarContext {
    timezone: Tz,
}

impl Default for CalendarContext {
    fn default() -> Self {
        Self::utc()
    }
}

impl CalendarContext {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Builds a context from an IANA timezone name such as `Europe/Berlin`.
    pub fn from_name(timezone: &str) -> Result<Self, CoreError> {
        validate_timezone(timezone).map(Self::new)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The local calendar day containing `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    /// The first instant of `date` in this calendar.
    ///
    /// Local midnight does not exist on some DST transition days; the first
    /// valid wall-clock time of the day is used instead.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        for hour in 0..24 {
            let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
                continue;
            };
            if let Some(local) = self
                .timezone
                .from_local_datetime(&date.and_time(time))
                .earliest()
            {
                return local.with_timezone(&Utc);
            }
        }
        // Unreachable for real tz data: no zone skips a whole day's worth of hours.
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
    }

    /// Normalizes an instant to the start of its local day.
    pub fn start_of_day_at(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_day(self.local_date(instant))
    }

    /// Today's date as seen from `now`; the core never reads the system clock.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_date(now)
    }

    /// Format datetime with timezone-aware display
    pub fn format(&self, instant: DateTime<Utc>, format: &str) -> String {
        instant.with_timezone(&self.timezone).format(format).to_string()
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Calendar-month difference, ignoring the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (i64::from(to.year()) - i64::from(from.year())) * 12
        + (i64::from(to.month()) - i64::from(from.month()))
}

/// Calendar-year difference, ignoring month and day.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year()) - i64::from(from.year())
}

/// Adds calendar months, clamping to the last day of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u64) -> Option<NaiveDate> {
    let months = u32::try_from(months).ok()?;
    date.checked_add_months(Months::new(months))
}

/// Whether `year`/`month` has a day numbered `day`.
pub fn month_has_day(year: i32, month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(matches!(
            validate_timezone("Invalid/Timezone"),
            Err(CoreError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_local_date_uses_context_timezone() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(CalendarContext::utc().local_date(instant), date(2024, 1, 1));

        let new_york = CalendarContext::from_name("America/New_York").unwrap();
        assert_eq!(new_york.local_date(instant), date(2023, 12, 31));
    }

    #[test]
    fn test_start_of_day_is_local_midnight() {
        let berlin = CalendarContext::from_name("Europe/Berlin").unwrap();
        let start = berlin.start_of_day(date(2024, 6, 1));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap());
        assert_eq!(berlin.local_date(start), date(2024, 6, 1));
    }

    #[test]
    fn test_start_of_day_skips_missing_midnight() {
        // Santiago springs forward at local midnight.
        let santiago = CalendarContext::from_name("America/Santiago").unwrap();
        let day = date(2023, 9, 3);
        let start = santiago.start_of_day(day);
        assert_eq!(santiago.local_date(start), day);
    }

    #[test]
    fn test_unit_differences() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 3, 1)), 60);
        assert_eq!(days_between(date(2024, 3, 1), date(2024, 1, 1)), -60);
        assert_eq!(months_between(date(2023, 11, 30), date(2024, 2, 1)), 3);
        assert_eq!(years_between(date(2020, 12, 31), date(2024, 1, 1)), 4);
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(add_months(date(2024, 2, 29), 12), Some(date(2025, 2, 28)));
        assert!(month_has_day(2024, 2, 29));
        assert!(!month_has_day(2023, 2, 29));
    }
}
