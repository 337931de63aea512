use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use super::matcher::{limit_exhausted, matches_rule};
use super::stepper::{fast_forward, next_occurrence};
use crate::error::CoreError;
use crate::identity::make_instance_id;
use crate::models::{RecurrenceRule, Task, TaskKind};
use crate::timezone::CalendarContext;

/// Ascending walk over the dates a series occurs on.
///
/// Candidates come from the stepper and are confirmed by the matcher, so a
/// date is yielded only if `matches_rule` accepts it. The walk stops past
/// `until`, once the occurrence limit is used up, or after `step_limit`
/// candidates, whichever comes first.
pub(crate) struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    anchor: NaiveDate,
    ctx: &'a CalendarContext,
    from: NaiveDate,
    until: Option<NaiveDate>,
    cursor: Option<NaiveDate>,
    steps: u64,
    step_limit: u64,
}

impl<'a> Occurrences<'a> {
    pub(crate) fn new(
        rule: &'a RecurrenceRule,
        anchor: NaiveDate,
        ctx: &'a CalendarContext,
        from: NaiveDate,
    ) -> Self {
        let cursor = if anchor < from {
            fast_forward(rule, anchor, from).or(Some(anchor))
        } else {
            Some(anchor)
        };
        let until = rule.end_date.map(|end| ctx.local_date(end));
        Self {
            rule,
            anchor,
            ctx,
            from,
            until,
            cursor,
            steps: 0,
            step_limit: u64::MAX,
        }
    }

    pub(crate) fn until(mut self, last: NaiveDate) -> Self {
        self.until = Some(self.until.map_or(last, |end| end.min(last)));
        self
    }

    pub(crate) fn step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }

    fn advance(&self, cursor: NaiveDate) -> Option<NaiveDate> {
        match next_occurrence(self.rule, self.anchor, cursor) {
            Some(next) if next > cursor => Some(next),
            // The stepper must always move forward; force progress if it doesn't.
            Some(_) => cursor.succ_opt(),
            None => None,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            let cursor = self.cursor?;
            if self.until.is_some_and(|until| cursor > until) || self.steps >= self.step_limit {
                self.cursor = None;
                return None;
            }
            self.steps += 1;
            if limit_exhausted(self.rule, self.anchor, cursor) {
                self.cursor = None;
                return None;
            }
            self.cursor = self.advance(cursor);
            if cursor >= self.from && matches_rule(self.rule, self.anchor, cursor, self.ctx) {
                return Some(cursor);
            }
        }
    }
}

/// Virtual occurrences of `template` inside `[range_start, range_end]`.
///
/// The anchor day is never produced since the template row itself stands for
/// it. Non-templates and inverted ranges yield nothing.
pub fn generate_instances(
    template: &Task,
    range_start: NaiveDate,
    range_end: NaiveDate,
    ctx: &CalendarContext,
) -> Vec<Task> {
    let Some(rule) = template.recurrence() else {
        return Vec::new();
    };
    if range_start > range_end {
        return Vec::new();
    }
    if let Err(e) = rule.validate() {
        warn!(template_id = %template.id, error = %e, "Expanding template with an invalid rule");
    }
    let anchor = ctx.local_date(template.due_at);

    let mut walk = Occurrences::new(rule, anchor, ctx, range_start).until(range_end);
    let mut instances = Vec::new();
    for date in walk.by_ref() {
        if date == anchor {
            continue;
        }
        match virtual_instance(template, date, ctx) {
            Ok(instance) => {
                trace!(instance_id = %instance.id, %date, "Generated virtual instance");
                instances.push(instance);
            }
            Err(e) => {
                warn!(template_id = %template.id, error = %e, "Cannot identify occurrences of template");
                return Vec::new();
            }
        }
    }

    debug!(
        template_id = %template.id,
        pattern = %rule.pattern,
        steps = walk.steps(),
        generated = instances.len(),
        %range_start,
        %range_end,
        "Generated recurring instances"
    );
    instances
}

/// Builds the unsaved occurrence of `template` on `date`.
///
/// The copy keeps title, type, content and order, starts incomplete, is due
/// at the start of `date` and points back at the template.
pub fn virtual_instance(
    template: &Task,
    date: NaiveDate,
    ctx: &CalendarContext,
) -> Result<Task, CoreError> {
    Ok(Task {
        id: make_instance_id(&template.id, date, ctx)?,
        due_at: ctx.start_of_day(date),
        completed: false,
        completed_at: None,
        kind: TaskKind::Instance {
            recurring_parent_id: template.id.clone(),
        },
        ..template.clone()
    })
}
