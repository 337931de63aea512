use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc, Weekday};
use owo_colors::{OwoColorize, Style};
use tempo_core::models::{RecurrenceRule, Task, WeekdaySet};
use tempo_core::timezone::CalendarContext;

use crate::cli::{AddCommand, RecurrenceShortcut};
use crate::parser::{parse_date, parse_due, parse_weekdays};
use crate::store::TaskStore;

pub fn add_task(
    store: &mut TaskStore,
    command: AddCommand,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<()> {
    let due_at = match command.due.as_deref() {
        Some(raw) => parse_due(raw, ctx, now)?,
        None => ctx.start_of_day(ctx.today(now)),
    };

    let mut task = Task::new(command.title, due_at, now);
    if command.deep || command.content.is_some() {
        task = task.deep(command.content.unwrap_or_default());
    }

    let rule = match command.every {
        Some(shortcut) => {
            let options = RecurrenceOptions {
                interval: command.interval,
                on: command.on,
                until: command.until,
                count: command.count,
            };
            Some(build_rule(shortcut, &options, ctx, now)?)
        }
        None => None,
    };
    if let Some(rule) = rule {
        task = task.recurring(rule);
    }

    let added = task.clone();
    store.upsert(task);
    store.save()?;

    print_created(&added, ctx);
    Ok(())
}

/// Recurrence flags of `add`, detached from the rest of the command.
struct RecurrenceOptions {
    interval: u32,
    on: Option<String>,
    until: Option<String>,
    count: Option<u32>,
}

fn build_rule(
    shortcut: RecurrenceShortcut,
    options: &RecurrenceOptions,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<RecurrenceRule> {
    let interval = options.interval;
    let mut rule = match (shortcut, options.on.as_deref()) {
        (RecurrenceShortcut::Daily, None) => RecurrenceRule::daily(interval),
        (RecurrenceShortcut::Weekly, None) => RecurrenceRule::weekly(interval),
        (RecurrenceShortcut::Weekly, Some(days)) => {
            RecurrenceRule::weekly_on(interval, parse_weekdays(days)?)
        }
        (RecurrenceShortcut::Monthly, None) => RecurrenceRule::monthly(interval),
        (RecurrenceShortcut::Yearly, None) => RecurrenceRule::yearly(interval),
        (RecurrenceShortcut::Weekdays, None) => RecurrenceRule::weekly_on(
            interval,
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
                .into_iter()
                .collect::<WeekdaySet>(),
        ),
        (RecurrenceShortcut::Weekends, None) => RecurrenceRule::weekly_on(
            interval,
            [Weekday::Sat, Weekday::Sun].into_iter().collect::<WeekdaySet>(),
        ),
        (other, Some(_)) => {
            return Err(anyhow!(
                "--on can only be used with --every weekly, not '{}'",
                other
            ))
        }
    };

    if let Some(until) = options.until.as_deref() {
        rule = rule.until(ctx.start_of_day(parse_date(until, ctx, now)?));
    }
    if let Some(count) = options.count {
        rule = rule.limited_to(count);
    }
    rule.validate()?;
    Ok(rule)
}

fn print_created(task: &Task, ctx: &CalendarContext) {
    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();

    match task.recurrence() {
        Some(rule) => {
            println!(
                "{} Created recurring task: {}",
                "✓".style(success_style),
                task.title.bright_white().bold()
            );
            println!("  {} Task ID: {}", "→".style(info_style), task.id.yellow());
            println!(
                "  {} Starts: {}",
                "→".style(info_style),
                ctx.format(task.due_at, "%a %Y-%m-%d %H:%M").cyan()
            );
            println!("  {} Repeats: {}", "→".style(info_style), rule.to_string().cyan());

            println!("\n{} Next steps:", "💡".style(subtle_style));
            println!(
                "   {} Preview upcoming: tempo preview {}",
                "•".style(subtle_style),
                task.id.yellow()
            );
            println!(
                "   {} See this week: tempo agenda",
                "•".style(subtle_style)
            );
        }
        None => {
            println!(
                "{} Created task: {}",
                "✓".style(success_style),
                task.title.bright_white().bold()
            );
            println!("  {} Task ID: {}", "→".style(info_style), task.id.yellow());
            println!(
                "  {} Due: {}",
                "→".style(info_style),
                ctx.format(task.due_at, "%Y-%m-%d %H:%M").cyan()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use tempo_core::models::RecurrencePattern;

    fn options(on: Option<&str>, until: Option<&str>, count: Option<u32>) -> RecurrenceOptions {
        RecurrenceOptions {
            interval: 1,
            on: on.map(str::to_string),
            until: until.map(str::to_string),
            count,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_weekdays_shortcut() {
        let ctx = CalendarContext::utc();
        let rule = build_rule(RecurrenceShortcut::Weekdays, &options(None, None, None), &ctx, now()).unwrap();
        assert_eq!(rule.pattern, RecurrencePattern::Weekly);
        assert_eq!(rule.weekday_set().unwrap().indices(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_weekly_on_days_with_limits() {
        let ctx = CalendarContext::utc();
        let rule = build_rule(
            RecurrenceShortcut::Weekly,
            &options(Some("mon,wed"), Some("2024-03-01"), Some(5)),
            &ctx,
            now(),
        )
        .unwrap();
        assert_eq!(rule.weekday_set().unwrap().indices(), vec![1, 3]);
        assert_eq!(
            rule.end_date.map(|end| ctx.local_date(end)),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(rule.occurrences, Some(5));
    }

    #[test]
    fn test_on_requires_weekly() {
        let ctx = CalendarContext::utc();
        assert!(build_rule(RecurrenceShortcut::Monthly, &options(Some("mon"), None, None), &ctx, now()).is_err());
        assert!(build_rule(RecurrenceShortcut::Weekends, &options(Some("sat"), None, None), &ctx, now()).is_err());
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let ctx = CalendarContext::utc();
        assert!(build_rule(RecurrenceShortcut::Daily, &options(None, None, Some(0)), &ctx, now()).is_err());
    }
}
