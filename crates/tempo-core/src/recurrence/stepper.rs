use chrono::{Datelike, Days, NaiveDate};

use crate::models::{RecurrencePattern, RecurrenceRule, WeekdaySet};
use crate::timezone::{add_months, days_between, month_has_day, months_between, years_between};

/// Computes the next candidate date strictly after `from`.
///
/// `anchor` is the series' first occurrence. Monthly and yearly steps clamp
/// into short months and then return to the anchor's day-of-month as soon
/// as a month has it, so a series anchored on the 31st does not drift to the
/// 29th after February. Weekly steps with a weekday set count weeks in
/// anchor-aligned 7-day blocks, the same blocks the matcher counts.
///
/// Returns `None` only when the next date is outside chrono's range.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    from: NaiveDate,
) -> Option<NaiveDate> {
    let interval = u64::from(rule.interval());
    match &rule.pattern {
        RecurrencePattern::Daily => from.checked_add_days(Days::new(interval)),
        RecurrencePattern::Weekly => match rule.weekday_set() {
            Some(days) => next_in_weekday_set(days, interval, anchor, from),
            None => from.checked_add_days(Days::new(interval * 7)),
        },
        RecurrencePattern::Monthly => {
            let next = add_months(from, interval)?;
            Some(with_anchor_day(next, anchor))
        }
        RecurrencePattern::Yearly => {
            let next = add_months(from, interval * 12)?;
            if next.month() == anchor.month() {
                Some(with_anchor_day(next, anchor))
            } else {
                Some(next)
            }
        }
        RecurrencePattern::Other(_) => from.succ_opt(),
    }
}

/// Jumps from the anchor to a position at or before `target` in O(1).
///
/// The result is only a starting point for iteration: it is aligned to the
/// series' step grid but is not necessarily an occurrence itself.
pub fn fast_forward(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    target: NaiveDate,
) -> Option<NaiveDate> {
    if target <= anchor {
        return Some(anchor);
    }
    let interval = i64::from(rule.interval());
    let days = days_between(anchor, target);
    match &rule.pattern {
        RecurrencePattern::Daily => {
            let steps = days / interval;
            add_days(anchor, steps * interval)
        }
        RecurrencePattern::Weekly => {
            // Start of the last qualifying week at or before target. With a
            // weekday set this is not necessarily a matching day, the stepper
            // walks forward from here.
            let steps = (days / 7) / interval;
            add_days(anchor, steps * interval * 7)
        }
        RecurrencePattern::Monthly => {
            let steps = months_between(anchor, target) / interval;
            land_on_or_before(target, steps, |n| {
                add_months(anchor, u64::try_from(n * interval).ok()?)
            })
        }
        RecurrencePattern::Yearly => {
            let steps = years_between(anchor, target) / interval;
            land_on_or_before(target, steps, |n| {
                add_months(anchor, u64::try_from(n * interval * 12).ok()?)
            })
        }
        RecurrencePattern::Other(_) => Some(anchor),
    }
}

/// Evaluates `position(steps)`, backing off one step when it lands after
/// `target` (the anchor's day may lie later in the target's month).
fn land_on_or_before<F>(target: NaiveDate, steps: i64, position: F) -> Option<NaiveDate>
where
    F: Fn(i64) -> Option<NaiveDate>,
{
    let landing = position(steps)?;
    if landing > target && steps > 0 {
        position(steps - 1)
    } else {
        Some(landing)
    }
}

fn next_in_weekday_set(
    days: WeekdaySet,
    interval: u64,
    anchor: NaiveDate,
    from: NaiveDate,
) -> Option<NaiveDate> {
    let interval = i64::try_from(interval).ok()?;
    let candidate = first_matching_on_or_after(days, from.succ_opt()?)?;
    let block = days_between(anchor, candidate).div_euclid(7);
    if block.rem_euclid(interval) == 0 {
        return Some(candidate);
    }
    let next_block = (block.div_euclid(interval) + 1) * interval;
    let block_start = add_days(anchor, next_block * 7)?;
    first_matching_on_or_after(days, block_start)
}

fn first_matching_on_or_after(days: WeekdaySet, start: NaiveDate) -> Option<NaiveDate> {
    let mut date = start;
    for _ in 0..7 {
        if days.contains(date.weekday()) {
            return Some(date);
        }
        date = date.succ_opt()?;
    }
    None
}

fn with_anchor_day(date: NaiveDate, anchor: NaiveDate) -> NaiveDate {
    if month_has_day(date.year(), date.month(), anchor.day()) {
        date.with_day(anchor.day()).unwrap_or(date)
    } else {
        date
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::try_from(days).ok()?))
}
