use super::task::{validate_priority, Occurrence};
use crate::error::TaskError;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Template copied into every generated occurrence.
///
/// `%d` in the name or description is replaced by the 1-based occurrence
/// number and `%%` by a literal percent sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceTemplate {
    pub priority: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl OccurrenceTemplate {
    pub fn new(name: impl Into<String>, priority: u32) -> Result<Self, TaskError> {
        Ok(Self {
            priority: validate_priority(priority)?,
            name: name.into(),
            description: String::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Substitute the occurrence number into a template string
pub fn fill_template(template: &str, occurrence: u64) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('d') => {
                chars.next();
                out.push_str(&occurrence.to_string());
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Which occurrences of a schedule are done.
///
/// Everything up to `last_completed` counts as done except the indices in
/// `exceptions`, which are the holes left when a later occurrence was
/// completed first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTracker {
    /// Highest completed occurrence (1-based, 0 = none)
    #[serde(default)]
    pub last_completed: u64,
    /// Indices below `last_completed` that are still open
    #[serde(default)]
    pub exceptions: BTreeSet<u64>,
}

impl CompletionTracker {
    /// Record occurrence `index` as done. Completing an index twice is a no-op.
    pub fn complete(&mut self, index: u64) -> Result<(), TaskError> {
        if index == 0 {
            return Err(TaskError::InvalidOccurrence(index));
        }

        if self.is_completed(index) {
            return Ok(());
        }

        if index > self.last_completed {
            // Everything skipped over stays open
            self.exceptions.extend(self.last_completed + 1..index);
            self.last_completed = index;
        } else {
            self.exceptions.remove(&index);
        }

        Ok(())
    }

    /// Every exception must be a hole strictly below the high-water mark
    pub fn validate(&self) -> Result<(), TaskError> {
        match self.exceptions.iter().find(|i| **i == 0 || **i >= self.last_completed) {
            Some(&index) => Err(TaskError::InvalidException {
                index,
                last_completed: self.last_completed,
            }),
            None => Ok(()),
        }
    }

    pub fn is_completed(&self, index: u64) -> bool {
        index != 0 && index <= self.last_completed && !self.exceptions.contains(&index)
    }
}

/// A start time, an optional end time and a cycle of delays that together
/// define an unbounded sequence of occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceSchedule {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub start: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Local>>,
    #[serde(rename = "delays_secs", with = "delays_secs")]
    delays: Vec<Duration>,
    pub template: OccurrenceTemplate,
    #[serde(default)]
    pub tracker: CompletionTracker,
}

impl RecurrenceSchedule {
    pub fn new(
        start: DateTime<Local>,
        end: Option<DateTime<Local>>,
        delays: Vec<Duration>,
        template: OccurrenceTemplate,
    ) -> Result<Self, TaskError> {
        validate_delays(&delays)?;
        validate_priority(template.priority)?;

        Ok(Self {
            id: Uuid::new_v4(),
            start,
            end,
            delays,
            template,
            tracker: CompletionTracker::default(),
        })
    }

    /// Re-check invariants (used after loading from disk)
    pub fn validate(&self) -> Result<(), TaskError> {
        validate_delays(self.delays())?;
        validate_priority(self.template.priority)?;
        self.tracker.validate()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    fn cycle_nanos(&self) -> i128 {
        self.delays.iter().map(|d| nanos(*d)).sum()
    }

    /// Offset of occurrence `index` from the start, in nanoseconds.
    /// `None` if it does not fit in an `i128`.
    fn offset_nanos(&self, index: u64) -> Option<i128> {
        let len = self.delays.len() as u64;
        let (full, rem) = (index / len, (index % len) as usize);
        let partial: i128 = self.delays[..rem].iter().map(|d| nanos(*d)).sum();
        i128::from(full).checked_mul(self.cycle_nanos())?.checked_add(partial)
    }

    /// When occurrence `index` falls due. Depends only on the schedule and
    /// the index, never on the current time.
    ///
    /// Returns `None` when the date is past what chrono can represent.
    pub fn due_by(&self, index: u64) -> Result<Option<DateTime<Local>>, TaskError> {
        if index == 0 {
            return Err(TaskError::InvalidOccurrence(index));
        }
        let offset = self.offset_nanos(index).and_then(|ns| i64::try_from(ns).ok());
        Ok(offset.and_then(|ns| self.start.checked_add_signed(Duration::nanoseconds(ns))))
    }

    /// Highest occurrence index due at or before `t` (0 if none)
    pub fn final_index(&self, t: DateTime<Local>) -> u64 {
        if t < self.start {
            return 0;
        }

        let elapsed = nanos(t.signed_duration_since(self.start));
        let cycle = self.cycle_nanos();
        let len = self.delays.len() as i128;

        // Whole cycles in constant time, then walk the remainder
        let full = elapsed / cycle;
        let mut index = full * len;
        let mut reached = full * cycle;
        for delay in &self.delays {
            reached += nanos(*delay);
            if reached > elapsed {
                break;
            }
            index += 1;
        }

        u64::try_from(index).unwrap_or(u64::MAX)
    }

    /// Occurrence indices that should be shown as of `now`, in order:
    /// open exceptions first, then everything after `last_completed`.
    pub fn pending_indices(&self, now: DateTime<Local>) -> Vec<u64> {
        // A finished schedule stops at its end; an open one runs to now
        let (horizon, open) = match self.end {
            Some(end) if end < now => (end, false),
            _ => (now, true),
        };

        let mut last = self.final_index(horizon);

        // Surface the slot currently in progress before it falls due
        if open && self.start <= now {
            last = last.saturating_add(1);
        }

        let mut pending: Vec<u64> = self.tracker.exceptions.iter().copied().collect();
        pending.extend(self.tracker.last_completed.saturating_add(1)..=last);
        pending
    }

    /// Build the occurrence for a given index
    pub fn spawn(&self, index: u64) -> Result<Option<Occurrence>, TaskError> {
        let due = match self.due_by(index)? {
            Some(due) => due,
            None => return Ok(None),
        };

        Ok(Some(Occurrence {
            schedule: self.id,
            index,
            priority: self.template.priority,
            due,
            name: fill_template(&self.template.name, index),
            description: fill_template(&self.template.description, index),
        }))
    }

    /// All still-pending occurrences as of `now`
    pub fn expand(&self, now: DateTime<Local>) -> Vec<Occurrence> {
        self.pending_indices(now)
            .into_iter()
            .filter_map(|index| match self.spawn(index) {
                Ok(Some(occurrence)) => Some(occurrence),
                Ok(None) => {
                    tracing::warn!(index, name = %self.template.name, "occurrence date out of range");
                    None
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping invalid occurrence");
                    None
                }
            })
            .collect()
    }

    /// Mark occurrence `index` as done
    pub fn complete(&mut self, index: u64) -> Result<(), TaskError> {
        self.tracker.complete(index)
    }
}

fn validate_delays(delays: &[Duration]) -> Result<(), TaskError> {
    if delays.is_empty() {
        return Err(TaskError::EmptySchedule);
    }
    if let Some(bad) = delays.iter().find(|d| **d <= Duration::zero()) {
        return Err(TaskError::NonPositiveDelay(bad.num_seconds()));
    }
    if let Some(bad) = delays.iter().find(|d| Duration::try_seconds(d.num_seconds()) != Some(**d)) {
        return Err(TaskError::FractionalDelay(bad.num_milliseconds()));
    }
    Ok(())
}

/// Nanoseconds in a duration, widened so cycle arithmetic cannot overflow
fn nanos(d: Duration) -> i128 {
    d.num_nanoseconds()
        .map(i128::from)
        .unwrap_or_else(|| i128::from(d.num_milliseconds()) * 1_000_000)
}

/// Delays are stored on disk as whole seconds
mod delays_secs {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delays: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(delays.iter().map(|d| d.num_seconds()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Duration>, D::Error> {
        Vec::<i64>::deserialize(deserializer)?
            .into_iter()
            .map(|secs| {
                Duration::try_seconds(secs)
                    .ok_or_else(|| D::Error::custom(format!("delay out of range: {}s", secs)))
            })
            .collect()
    }
}
