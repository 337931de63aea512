use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::Task;
use crate::recurrence::generate_instances;
use crate::timezone::CalendarContext;

/// Cheap pre-filter: whether `template`'s series could have an occurrence
/// in `[range_start, range_end]`.
///
/// False for non-templates, series anchored after the range and series
/// whose end date's local day is before the range.
pub fn may_intersect(
    template: &Task,
    range_start: NaiveDate,
    range_end: NaiveDate,
    ctx: &CalendarContext,
) -> bool {
    let Some(rule) = template.recurrence() else {
        return false;
    };
    if ctx.local_date(template.due_at) > range_end {
        return false;
    }
    rule.end_date
        .map_or(true, |end| ctx.local_date(end) >= range_start)
}

/// Merges persisted rows with the virtual occurrences of `templates`.
///
/// `persisted` is every stored row due in the range, templates included.
/// A virtual occurrence is dropped when a row with its id already exists,
/// so completed or edited occurrences win over the generated default and
/// no occurrence is represented twice. Persisted rows come first, in the
/// order given, followed by the surviving virtual instances.
pub fn merge(
    persisted: Vec<Task>,
    templates: &[Task],
    range_start: NaiveDate,
    range_end: NaiveDate,
    ctx: &CalendarContext,
) -> Vec<Task> {
    let mut seen: HashSet<String> = persisted.iter().map(|task| task.id.clone()).collect();
    let mut shadowed = 0usize;
    let mut virtuals = Vec::new();

    for template in templates
        .iter()
        .filter(|template| may_intersect(template, range_start, range_end, ctx))
    {
        for instance in generate_instances(template, range_start, range_end, ctx) {
            if seen.insert(instance.id.clone()) {
                virtuals.push(instance);
            } else {
                shadowed += 1;
            }
        }
    }

    debug!(
        persisted = persisted.len(),
        templates = templates.len(),
        virtual_instances = virtuals.len(),
        shadowed,
        %range_start,
        %range_end,
        "Merged task range"
    );

    let mut merged = persisted;
    merged.extend(virtuals);
    merged
}
