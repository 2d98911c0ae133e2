use crate::{
    definition::EventDefinition, exception::OccurrenceException, occurrence::Occurrence,
    timespan::TimeSpan,
};
use chrono::Duration;
use std::collections::HashSet;

/// Expands the definitions into the occurrences overlapping `window`.
///
/// Non recurring definitions are emitted as is when they overlap the window. Recurring
/// definitions are repeated every 7 days from their anchor and every generated occurrence
/// whose `(event_id, start)` matches an exception is dropped. The output is not sorted.
pub fn expand(
    definitions: &[EventDefinition],
    exceptions: &[OccurrenceException],
    window: &TimeSpan,
) -> Vec<Occurrence> {
    let cancelled = exceptions
        .iter()
        .map(|ex| (ex.event_id, ex.occurrence_start))
        .collect::<HashSet<_>>();

    let mut occurrences = Vec::new();
    let mut recurring = Vec::new();
    for definition in definitions {
        if definition.repeat_weekly {
            recurring.extend(
                expand_series(definition, window)
                    .into_iter()
                    .filter(|o| !cancelled.contains(&(definition.id, o.start))),
            );
        } else if definition.span().overlaps(window) {
            occurrences.push(definition.anchor_occurrence());
        }
    }

    occurrences.extend(recurring);
    occurrences
}

/// Every weekly occurrence of a recurring definition overlapping `window`, exceptions ignored.
/// Generation stops as soon as an occurrence starts at or after the end of the window.
pub fn expand_series(definition: &EventDefinition, window: &TimeSpan) -> Vec<Occurrence> {
    let week = Duration::weeks(1);
    let mut start = definition.start;
    let mut end = definition.end;

    // Jump over the whole weeks that end before the window, the anchor may be years ago.
    // The shifted end stays at or before the window start so this can not overflow.
    if end <= window.start() {
        let skipped = Duration::weeks((window.start() - end).num_weeks());
        start += skipped;
        end += skipped;
    }

    let mut occurrences = Vec::new();
    while start < window.end() {
        if end > window.start() {
            occurrences.push(Occurrence::new(definition, start, end));
        }
        match (start.checked_add_signed(week), end.checked_add_signed(week)) {
            (Some(next_start), Some(next_end)) => {
                start = next_start;
                end = next_end;
            }
            // No later week is representable
            _ => break,
        }
    }
    occurrences
}
