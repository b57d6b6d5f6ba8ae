use super::priority::{nice_for_due, nice_for_eventual};
use crate::error::TaskError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reject priorities that would make the nice value undefined
pub fn validate_priority(priority: u32) -> Result<u32, TaskError> {
    if priority == 0 {
        return Err(TaskError::InvalidPriority(priority));
    }
    Ok(priority)
}

/// Case-insensitive prefix match on a task name
pub fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().starts_with(&term.to_lowercase())
}

/// A one-shot task with a due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefiniteTask {
    /// Internal ID for completion routing (regenerated on load)
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub priority: u32,
    pub due: DateTime<Local>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl DefiniteTask {
    pub fn new(name: impl Into<String>, priority: u32, due: DateTime<Local>) -> Result<Self, TaskError> {
        Ok(Self {
            id: Uuid::new_v4(),
            priority: validate_priority(priority)?,
            due,
            name: name.into(),
            description: String::new(),
        })
    }

    /// Builder method to attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A task without a due date that floats at a constant nice value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventualTask {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub priority: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl EventualTask {
    pub fn new(name: impl Into<String>, priority: u32) -> Result<Self, TaskError> {
        Ok(Self {
            id: Uuid::new_v4(),
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

/// One generated instance of a recurrence schedule.
///
/// Never persisted. It lives only for one listing and points back at its
/// schedule by ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// ID of the schedule that produced this occurrence
    pub schedule: Uuid,
    /// 1-based occurrence number
    pub index: u64,
    pub priority: u32,
    pub due: DateTime<Local>,
    pub name: String,
    pub description: String,
}

/// How completing a task flows back into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Drop the container with this ID
    Remove(Uuid),
    /// Mark an occurrence done on its schedule
    Occurrence { schedule: Uuid, index: u64 },
}

/// A displayable, completable unit of work
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Definite(DefiniteTask),
    Eventual(EventualTask),
    Occurrence(Occurrence),
}

impl Task {
    pub fn priority(&self) -> u32 {
        match self {
            Task::Definite(t) => t.priority,
            Task::Eventual(t) => t.priority,
            Task::Occurrence(t) => t.priority,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Task::Definite(t) => &t.name,
            Task::Eventual(t) => &t.name,
            Task::Occurrence(t) => &t.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Task::Definite(t) => &t.description,
            Task::Eventual(t) => &t.description,
            Task::Occurrence(t) => &t.description,
        }
    }

    /// Due date, if the task has one
    pub fn due(&self) -> Option<DateTime<Local>> {
        match self {
            Task::Definite(t) => Some(t.due),
            Task::Eventual(_) => None,
            Task::Occurrence(t) => Some(t.due),
        }
    }

    /// Derived urgency; lower values are shown first
    pub fn nice(&self, now: DateTime<Local>) -> f64 {
        match self.due() {
            Some(due) => nice_for_due(self.priority(), due, now),
            None => nice_for_eventual(self.priority()),
        }
    }

    /// Check whether a search term is a case-insensitive prefix of the name
    pub fn matches(&self, term: &str) -> bool {
        name_matches(self.name(), term)
    }

    /// Where completion of this task should be routed
    pub fn completion(&self) -> Completion {
        match self {
            Task::Definite(t) => Completion::Remove(t.id),
            Task::Eventual(t) => Completion::Remove(t.id),
            Task::Occurrence(t) => Completion::Occurrence {
                schedule: t.schedule,
                index: t.index,
            },
        }
    }
}
