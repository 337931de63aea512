//! Recurrence engine: stepping, matching and range expansion of templates.
//!
//! Everything here works on local calendar days of a [`CalendarContext`].
//! The stepper proposes candidate dates, the matcher is the single authority
//! on membership, and the generator walks the former through the latter.

mod generator;
mod matcher;
mod stepper;

pub use generator::{generate_instances, virtual_instance};
pub use matcher::{matches_rule, occurrence_ordinal, should_occur_on};
pub use stepper::{fast_forward, next_occurrence};

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::models::{RecurrenceRule, Task};
use crate::timezone::CalendarContext;
use generator::Occurrences;

/// Upper bound on candidates examined by open-ended lookups.
///
/// Ranged generation is bounded by its range; previews and "next" lookups
/// are not, and a rule whose candidates never match would otherwise spin.
pub const MAX_LOOKAHEAD_STEPS: u64 = 100_000;

/// Manages recurrence calculations for a single template.
#[derive(Debug, Clone)]
pub struct RecurrenceManager {
    template: Task,
    rule: RecurrenceRule,
    anchor: NaiveDate,
    ctx: CalendarContext,
}

impl RecurrenceManager {
    /// Creates a manager for `template` evaluated in `ctx`.
    ///
    /// # Arguments
    /// * `template` - A task carrying a recurrence rule
    /// * `ctx` - Calendar the series' days are computed in
    ///
    /// # Returns
    /// * `Result<Self, CoreError>` - Manager or `NotATemplate` for plain tasks
    ///   and instances
    pub fn new(template: Task, ctx: CalendarContext) -> Result<Self, CoreError> {
        let rule = template
            .recurrence()
            .cloned()
            .ok_or_else(|| CoreError::NotATemplate(template.id.clone()))?;
        let anchor = ctx.local_date(template.due_at);
        Ok(Self {
            template,
            rule,
            anchor,
            ctx,
        })
    }

    pub fn template(&self) -> &Task {
        &self.template
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// The series' first occurrence, the template's own local day.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn context(&self) -> &CalendarContext {
        &self.ctx
    }

    pub fn should_occur_on(&self, date: NaiveDate) -> bool {
        matches_rule(&self.rule, self.anchor, date, &self.ctx)
    }

    /// Virtual occurrences within `[start, end]`, anchor excluded.
    pub fn generate_instances(&self, start: NaiveDate, end: NaiveDate) -> Vec<Task> {
        generate_instances(&self.template, start, end, &self.ctx)
    }

    /// First occurrence strictly after `after`.
    ///
    /// # Returns
    /// * `Option<NaiveDate>` - Next occurrence, or None if the series has
    ///   ended or nothing matched within [`MAX_LOOKAHEAD_STEPS`] candidates
    pub fn next_occurrence(&self, after: NaiveDate) -> Option<NaiveDate> {
        let from = after.succ_opt()?;
        self.preview_occurrences(from, 1).into_iter().next()
    }

    /// Preview upcoming occurrences of this series.
    ///
    /// # Arguments
    /// * `from` - First day to consider (inclusive)
    /// * `count` - Maximum number of occurrences to return
    ///
    /// # Returns
    /// * `Vec<NaiveDate>` - Ascending occurrence days. Unlike range generation
    ///   the anchor is included when it falls on or after `from`.
    pub fn preview_occurrences(&self, from: NaiveDate, count: usize) -> Vec<NaiveDate> {
        if count == 0 {
            return Vec::new();
        }
        Occurrences::new(&self.rule, self.anchor, &self.ctx, from)
            .step_limit(MAX_LOOKAHEAD_STEPS)
            .take(count)
            .collect()
    }
}
