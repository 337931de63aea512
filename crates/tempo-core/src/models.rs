use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Quick,
    Deep,
}

/// Unit of a recurrence step.
///
/// Rows synced from other clients may carry a pattern this build does not
/// know; those deserialize to `Other` and the engine degrades gracefully
/// instead of refusing to load them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Other(String),
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Monthly => "monthly",
            RecurrencePattern::Yearly => "yearly",
            RecurrencePattern::Other(name) => name,
        }
    }

    /// Lenient conversion used when reading stored rules.
    pub fn from_name(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| RecurrencePattern::Other(name.to_string()))
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence pattern: {0}")]
pub struct ParseRecurrencePatternError(String);

impl FromStr for RecurrencePattern {
    type Err = ParseRecurrencePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            "yearly" => Ok(RecurrencePattern::Yearly),
            _ => Err(ParseRecurrencePatternError(s.to_string())),
        }
    }
}

impl Serialize for RecurrencePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecurrencePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(RecurrencePattern::from_name(&name))
    }
}

const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A set of weekdays, stored as indices `0 = Sunday ..= 6 = Saturday`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

#[derive(Error, Debug, PartialEq)]
#[error("Invalid weekday index {0}: expected 0 (Sunday) to 6 (Saturday)")]
pub struct WeekdayIndexError(u8);

impl WeekdaySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_indices(indices: &[u8]) -> Result<Self, WeekdayIndexError> {
        let mut set = Self::new();
        for &index in indices {
            if index > 6 {
                return Err(WeekdayIndexError(index));
            }
            set.0 |= 1 << index;
        }
        Ok(set)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in Sunday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEKDAYS_FROM_SUNDAY
            .into_iter()
            .filter(move |day| self.contains(*day))
    }

    pub fn indices(&self) -> Vec<u8> {
        self.iter().map(|day| day.num_days_from_sunday() as u8).collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = WeekdayIndexError;

    fn try_from(indices: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&indices)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.indices()
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|day| day.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Repeat rule carried by a template task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub pattern: RecurrencePattern,
    /// "Every N units"; must be at least 1
    pub interval: u32,
    /// Only meaningful for weekly rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<WeekdaySet>,
    /// No occurrence falls on a day after this instant's local day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum number of occurrences, the anchor counting as the first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

impl RecurrenceRule {
    /// Builds a rule the way the editor does: weekday sets are only kept
    /// for weekly rules.
    pub fn new(
        pattern: RecurrencePattern,
        interval: u32,
        days_of_week: Option<WeekdaySet>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        let days_of_week = match pattern {
            RecurrencePattern::Weekly => days_of_week,
            _ => None,
        };
        Self {
            pattern,
            interval,
            days_of_week,
            end_date,
            occurrences: None,
        }
    }

    pub fn daily(interval: u32) -> Self {
        Self::new(RecurrencePattern::Daily, interval, None, None)
    }

    pub fn weekly(interval: u32) -> Self {
        Self::new(RecurrencePattern::Weekly, interval, None, None)
    }

    pub fn weekly_on(interval: u32, days: WeekdaySet) -> Self {
        Self::new(RecurrencePattern::Weekly, interval, Some(days), None)
    }

    pub fn monthly(interval: u32) -> Self {
        Self::new(RecurrencePattern::Monthly, interval, None, None)
    }

    pub fn yearly(interval: u32) -> Self {
        Self::new(RecurrencePattern::Yearly, interval, None, None)
    }

    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn limited_to(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    /// Interval used for arithmetic. A zero interval in stored data is read
    /// as 1 so that modulo arithmetic stays defined.
    pub fn interval(&self) -> u32 {
        self.interval.max(1)
    }

    /// The weekday set, if this is a weekly rule with a non-empty set.
    pub fn weekday_set(&self) -> Option<WeekdaySet> {
        match self.pattern {
            RecurrencePattern::Weekly => self.days_of_week.filter(|set| !set.is_empty()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let RecurrencePattern::Other(name) = &self.pattern {
            return Err(CoreError::InvalidRule(format!("unknown pattern '{}'", name)));
        }
        if self.interval == 0 {
            return Err(CoreError::InvalidRule("interval must be at least 1".to_string()));
        }
        if self.occurrences == Some(0) {
            return Err(CoreError::InvalidRule(
                "occurrence limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.interval();
        match &self.pattern {
            RecurrencePattern::Daily if n == 1 => write!(f, "Daily"),
            RecurrencePattern::Daily => write!(f, "Every {} days", n),
            RecurrencePattern::Weekly => match (self.weekday_set(), n) {
                (Some(days), 1) => write!(f, "Weekly on {}", days),
                (Some(days), _) => write!(f, "Every {} weeks on {}", n, days),
                (None, 1) => write!(f, "Weekly"),
                (None, _) => write!(f, "Every {} weeks", n),
            },
            RecurrencePattern::Monthly if n == 1 => write!(f, "Monthly"),
            RecurrencePattern::Monthly => write!(f, "Every {} months", n),
            RecurrencePattern::Yearly if n == 1 => write!(f, "Yearly"),
            RecurrencePattern::Yearly => write!(f, "Every {} years", n),
            RecurrencePattern::Other(_) => write!(f, "Repeating"),
        }
    }
}

/// Role of a task in a recurring series.
///
/// Templates own the rule, instances point back at their template, and a
/// single value can never be both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Single,
    /// Series definition. Its own `due_at` is the anchor occurrence and its
    /// completion fields describe that occurrence only.
    Template { recurrence: RecurrenceRule },
    /// A generated or materialized occurrence of a template
    Instance { recurring_parent_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub task_type: TaskType,
    /// Markdown body for deep tasks, empty for quick ones
    #[serde(default)]
    pub content: String,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Manual sort key within a day
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub kind: TaskKind,
}

impl Task {
    /// Creates a one-off quick task with a fresh time-ordered id.
    pub fn new(title: impl Into<String>, due_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            task_type: TaskType::Quick,
            content: String::new(),
            due_at,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
            order: now.timestamp_millis(),
            kind: TaskKind::Single,
        }
    }

    pub fn deep(mut self, content: impl Into<String>) -> Self {
        self.task_type = TaskType::Deep;
        self.content = content.into();
        self
    }

    /// Turns the task into a template repeating by `rule`.
    pub fn recurring(mut self, rule: RecurrenceRule) -> Self {
        self.kind = TaskKind::Template { recurrence: rule };
        self
    }

    pub fn recurrence(&self) -> Option<&RecurrenceRule> {
        match &self.kind {
            TaskKind::Template { recurrence } => Some(recurrence),
            _ => None,
        }
    }

    pub fn recurring_parent_id(&self) -> Option<&str> {
        match &self.kind {
            TaskKind::Instance { recurring_parent_id } => Some(recurring_parent_id),
            _ => None,
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, TaskKind::Template { .. })
    }

    pub fn is_recurring_instance(&self) -> bool {
        matches!(self.kind, TaskKind::Instance { .. })
    }

    pub fn toggle_completed(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
        self.updated_at = now;
    }

    pub fn reschedule(&mut self, due_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.due_at = due_at;
        self.updated_at = now;
    }

    pub fn set_content(&mut self, content: impl Into<String>, now: DateTime<Utc>) {
        self.content = content.into();
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!("Weekly".parse::<RecurrencePattern>(), Ok(RecurrencePattern::Weekly));
            assert!("fortnightly".parse::<RecurrencePattern>().is_err());
        }

        #[test]
        fn test_unknown_pattern_deserializes_as_other() {
            let pattern: RecurrencePattern = serde_json::from_str("\"hourly\"").unwrap();
            assert_eq!(pattern, RecurrencePattern::Other("hourly".to_string()));
            assert_eq!(serde_json::to_string(&pattern).unwrap(), "\"hourly\"");
        }
    }

    mod weekday_set_tests {
        use super::*;

        #[test]
        fn test_indices_are_sunday_based() {
            let set = WeekdaySet::from_indices(&[3, 1]).unwrap();
            assert!(set.contains(Weekday::Mon));
            assert!(set.contains(Weekday::Wed));
            assert!(!set.contains(Weekday::Sun));
            assert_eq!(set.indices(), vec![1, 3]);
            assert_eq!(set.len(), 2);
        }

        #[test]
        fn test_rejects_out_of_range_index() {
            assert_eq!(WeekdaySet::from_indices(&[7]), Err(WeekdayIndexError(7)));
            assert!(serde_json::from_str::<WeekdaySet>("[1, 9]").is_err());
        }

        #[test]
        fn test_serializes_as_index_list() {
            let set: WeekdaySet = [Weekday::Sat, Weekday::Sun].into_iter().collect();
            assert_eq!(serde_json::to_string(&set).unwrap(), "[0,6]");
            assert_eq!(set.to_string(), "Sun, Sat");
        }
    }

    mod rule_tests {
        use super::*;

        #[test]
        fn test_weekday_set_dropped_for_non_weekly() {
            let days = WeekdaySet::from_indices(&[1]).unwrap();
            let rule = RecurrenceRule::new(RecurrencePattern::Monthly, 1, Some(days), None);
            assert_eq!(rule.days_of_week, None);
        }

        #[test]
        fn test_empty_weekday_set_is_absent() {
            let rule = RecurrenceRule::weekly_on(1, WeekdaySet::new());
            assert_eq!(rule.weekday_set(), None);
        }

        #[test]
        fn test_validate() {
            assert!(RecurrenceRule::daily(1).validate().is_ok());
            assert!(matches!(
                RecurrenceRule::daily(0).validate(),
                Err(CoreError::InvalidRule(_))
            ));
            assert!(RecurrenceRule::daily(1).limited_to(0).validate().is_err());
            let other = RecurrenceRule::new(RecurrencePattern::Other("x".into()), 1, None, None);
            assert!(other.validate().is_err());
        }

        #[test]
        fn test_zero_interval_reads_as_one() {
            assert_eq!(RecurrenceRule::daily(0).interval(), 1);
        }

        #[test]
        fn test_display() {
            let mon_wed = WeekdaySet::from_indices(&[1, 3]).unwrap();
            assert_eq!(RecurrenceRule::daily(1).to_string(), "Daily");
            assert_eq!(RecurrenceRule::daily(3).to_string(), "Every 3 days");
            assert_eq!(RecurrenceRule::weekly(1).to_string(), "Weekly");
            assert_eq!(RecurrenceRule::weekly_on(1, mon_wed).to_string(), "Weekly on Mon, Wed");
            assert_eq!(
                RecurrenceRule::weekly_on(2, mon_wed).to_string(),
                "Every 2 weeks on Mon, Wed"
            );
            assert_eq!(RecurrenceRule::monthly(6).to_string(), "Every 6 months");
            assert_eq!(RecurrenceRule::yearly(1).to_string(), "Yearly");
        }
    }

    mod task_tests {
        use super::*;

        #[test]
        fn test_kind_accessors() {
            let template = Task::new("Standup", at(2024, 1, 1), at(2024, 1, 1))
                .recurring(RecurrenceRule::daily(1));
            assert!(template.is_template());
            assert!(!template.is_recurring_instance());
            assert!(template.recurrence().is_some());
            assert_eq!(template.recurring_parent_id(), None);
        }

        #[test]
        fn test_serializes_flat_with_kind_tag() {
            let mut task = Task::new("Pay rent", at(2024, 1, 1), at(2024, 1, 1));
            task.kind = TaskKind::Instance {
                recurring_parent_id: "abc".to_string(),
            };
            let json = serde_json::to_value(&task).unwrap();
            assert_eq!(json["kind"], "instance");
            assert_eq!(json["recurring_parent_id"], "abc");

            let back: Task = serde_json::from_value(json).unwrap();
            assert_eq!(back, task);
        }

        #[test]
        fn test_toggle_completed() {
            let mut task = Task::new("Stretch", at(2024, 1, 1), at(2024, 1, 1));
            task.toggle_completed(at(2024, 1, 2));
            assert!(task.completed);
            assert_eq!(task.completed_at, Some(at(2024, 1, 2)));

            task.toggle_completed(at(2024, 1, 3));
            assert!(!task.completed);
            assert_eq!(task.completed_at, None);
            assert_eq!(task.updated_at, at(2024, 1, 3));
        }
    }
}
