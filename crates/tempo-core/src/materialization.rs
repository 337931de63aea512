//! Turning virtual occurrences into rows the caller can persist.
//!
//! Nothing here stores anything. The returned task carries the occurrence's
//! deterministic id, so once the caller saves it [`crate::reconcile::merge`]
//! stops generating the virtual default for that day.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::error::CoreError;
use crate::identity::{make_instance_id, parse_instance_id};
use crate::models::Task;
use crate::recurrence::{matches_rule, virtual_instance};
use crate::timezone::CalendarContext;

/// Builds the persisted exception for `template`'s occurrence on `date`.
///
/// # Errors
/// * `NotATemplate` - `template` has no recurrence rule
/// * `InvalidInput` - the series does not occur on `date`, or `date` is the
///   anchor (the template row itself represents that occurrence)
pub fn promote_occurrence(
    template: &Task,
    date: NaiveDate,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<Task, CoreError> {
    let rule = template
        .recurrence()
        .ok_or_else(|| CoreError::NotATemplate(template.id.clone()))?;
    let anchor = ctx.local_date(template.due_at);
    if date == anchor {
        return Err(CoreError::InvalidInput(format!(
            "{} is the first occurrence of '{}'; update the template instead",
            date, template.title
        )));
    }
    if !matches_rule(rule, anchor, date, ctx) {
        return Err(CoreError::InvalidInput(format!(
            "'{}' does not occur on {}",
            template.title, date
        )));
    }

    let mut task = virtual_instance(template, date, ctx)?;
    task.created_at = now;
    task.updated_at = now;
    debug!(template_id = %template.id, instance_id = %task.id, %date, "Promoted occurrence");
    Ok(task)
}

/// Promotes the occurrence and marks it completed at `now`.
pub fn complete_occurrence(
    template: &Task,
    date: NaiveDate,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<Task, CoreError> {
    let mut task = promote_occurrence(template, date, ctx, now)?;
    task.completed = true;
    task.completed_at = Some(now);
    Ok(task)
}

/// Resolves an instance id against `templates` and promotes it.
///
/// The id must decode, name one of `templates` and be exactly the id that
/// template produces for the decoded day in `ctx`; ids minted under another
/// calendar do not round-trip and are rejected.
pub fn promote_instance(
    instance_id: &str,
    templates: &[Task],
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<Task, CoreError> {
    let reference = parse_instance_id(instance_id)
        .ok_or_else(|| CoreError::NotFound(instance_id.to_string()))?;
    let template = templates
        .iter()
        .find(|task| task.id == reference.template_id)
        .ok_or_else(|| CoreError::NotFound(reference.template_id.clone()))?;
    let date = reference
        .date(ctx)
        .ok_or_else(|| CoreError::InvalidInput(format!("'{}' has no valid date", instance_id)))?;
    if make_instance_id(&template.id, date, ctx)? != instance_id {
        return Err(CoreError::InvalidInput(format!(
            "'{}' does not identify an occurrence in {}",
            instance_id,
            ctx.timezone()
        )));
    }
    promote_occurrence(template, date, ctx, now)
}
