use chrono::{Datelike, NaiveDate};

use crate::models::{RecurrencePattern, RecurrenceRule, Task, WeekdaySet};
use crate::timezone::{
    days_between, month_has_day, months_between, years_between, CalendarContext,
};

/// Whether `template`'s series has an occurrence on `target`.
///
/// Non-templates never match. The template's own day (the anchor) always
/// matches; generators skip it because the template row stands for it.
pub fn should_occur_on(template: &Task, target: NaiveDate, ctx: &CalendarContext) -> bool {
    match template.recurrence() {
        Some(rule) => matches_rule(rule, ctx.local_date(template.due_at), target, ctx),
        None => false,
    }
}

/// Decides membership of `target` in the series anchored at `anchor`.
///
/// Checks run in a fixed order: before the anchor, after the end date's
/// local day, the anchor itself, then the per-pattern arithmetic and the
/// occurrence limit.
pub fn matches_rule(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    target: NaiveDate,
    ctx: &CalendarContext,
) -> bool {
    if target < anchor {
        return false;
    }
    if let Some(end) = rule.end_date {
        if target > ctx.local_date(end) {
            return false;
        }
    }
    if target == anchor {
        return true;
    }
    pattern_matches(rule, anchor, target) && within_limit(rule, anchor, target)
}

fn pattern_matches(rule: &RecurrenceRule, anchor: NaiveDate, target: NaiveDate) -> bool {
    let interval = i64::from(rule.interval());
    let days = days_between(anchor, target);
    match &rule.pattern {
        RecurrencePattern::Daily => days % interval == 0,
        RecurrencePattern::Weekly => match rule.weekday_set() {
            Some(set) => set.contains(target.weekday()) && (days / 7) % interval == 0,
            None => days % 7 == 0 && (days / 7) % interval == 0,
        },
        RecurrencePattern::Monthly => {
            target.day() == anchor.day() && months_between(anchor, target) % interval == 0
        }
        RecurrencePattern::Yearly => {
            target.month() == anchor.month()
                && target.day() == anchor.day()
                && years_between(anchor, target) % interval == 0
        }
        RecurrencePattern::Other(_) => false,
    }
}

/// Whether `target` fits the pattern but lies past the occurrence limit.
///
/// Ordinals grow with the date, so once this holds no later day can occur.
pub(crate) fn limit_exhausted(rule: &RecurrenceRule, anchor: NaiveDate, target: NaiveDate) -> bool {
    rule.occurrences.is_some()
        && target > anchor
        && pattern_matches(rule, anchor, target)
        && !within_limit(rule, anchor, target)
}

fn within_limit(rule: &RecurrenceRule, anchor: NaiveDate, target: NaiveDate) -> bool {
    match rule.occurrences {
        None => true,
        Some(limit) => occurrence_ordinal(rule, anchor, target)
            .is_some_and(|ordinal| ordinal <= u64::from(limit)),
    }
}

/// 1-based position of `target` in the series, the anchor being the first.
///
/// Only meaningful for dates that match the rule; `None` for patterns the
/// engine cannot evaluate or dates before the anchor.
pub fn occurrence_ordinal(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    target: NaiveDate,
) -> Option<u64> {
    if target < anchor {
        return None;
    }
    if target == anchor {
        return Some(1);
    }
    let interval = u64::from(rule.interval());
    let days = u64::try_from(days_between(anchor, target)).ok()?;
    match &rule.pattern {
        RecurrencePattern::Daily => Some(days / interval + 1),
        RecurrencePattern::Weekly => match rule.weekday_set() {
            Some(set) => Some(weekday_set_ordinal(set, interval, anchor, target, days)),
            None => Some(days / 7 / interval + 1),
        },
        RecurrencePattern::Monthly => {
            let steps = u64::try_from(months_between(anchor, target)).ok()? / interval;
            if anchor.day() <= 28 {
                return Some(steps + 1);
            }
            // Whether a month has day 29 repeats every 400 years; 30 and 31 every year.
            let cycle = if anchor.day() == 29 { GREGORIAN_MONTHS } else { 12 };
            let first_month = i64::from(anchor.year()) * 12 + i64::from(anchor.month0());
            let stride = i64::try_from(interval % GREGORIAN_MONTHS).ok()?;
            Some(count_periodic(steps + 1, interval, cycle, |step| {
                let month = (first_month + step * stride).rem_euclid(GREGORIAN_MONTHS as i64);
                month_has_day(2000 + (month / 12) as i32, (month % 12) as u32 + 1, anchor.day())
            }))
        }
        RecurrencePattern::Yearly => {
            let steps = u64::try_from(years_between(anchor, target)).ok()? / interval;
            if !(anchor.month() == 2 && anchor.day() == 29) {
                return Some(steps + 1);
            }
            let stride = i64::try_from(interval % GREGORIAN_YEARS).ok()?;
            let first_year = i64::from(anchor.year());
            Some(count_periodic(steps + 1, interval, GREGORIAN_YEARS, |step| {
                let year = (first_year + step * stride).rem_euclid(GREGORIAN_YEARS as i64);
                month_has_day(2000 + year as i32, 2, 29)
            }))
        }
        RecurrencePattern::Other(_) => None,
    }
}

const GREGORIAN_YEARS: u64 = 400;
const GREGORIAN_MONTHS: u64 = GREGORIAN_YEARS * 12;

/// Number of steps `k` in `0..n` for which `hit(k)` holds, given that
/// `hit` only depends on `k * interval` modulo `cycle`.
fn count_periodic(n: u64, interval: u64, cycle: u64, hit: impl Fn(i64) -> bool) -> u64 {
    let period = cycle / gcd(interval % cycle, cycle);
    let hits_below = |len: u64| (0..len).filter(|&step| hit(step as i64)).count() as u64;
    n / period * hits_below(period) + hits_below(n % period)
}

fn gcd(a: u64, b: u64) -> u64 {
    if a == 0 {
        b
    } else {
        gcd(b % a, a)
    }
}

/// Counts matching days in every qualifying week before `target`'s week,
/// plus the anchor when it is off-set, plus matches in `target`'s week up
/// to and including `target`.
fn weekday_set_ordinal(
    set: WeekdaySet,
    interval: u64,
    anchor: NaiveDate,
    target: NaiveDate,
    days: u64,
) -> u64 {
    let week = days / 7;
    let earlier_weeks = week.div_ceil(interval);
    let off_set_anchor = u64::from(!set.contains(anchor.weekday()));
    let week_start = anchor
        .checked_add_days(chrono::Days::new(week * 7))
        .unwrap_or(target);
    let in_week = week_start
        .iter_days()
        .take_while(|day| *day <= target)
        .filter(|day| set.contains(day.weekday()))
        .count() as u64;
    earlier_weeks * u64::from(set.len()) + off_set_anchor + in_week
}
