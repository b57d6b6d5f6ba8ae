use thiserror::Error;

/// Errors raised by the task engine itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// A recurrence schedule was given no delays
    #[error("recurrence schedule needs at least one delay")]
    EmptySchedule,

    /// A recurrence delay was zero or negative
    #[error("recurrence delay must be positive, got {0}s")]
    NonPositiveDelay(i64),

    /// Delays are stored as whole seconds
    #[error("recurrence delay must be whole seconds, got {0}ms")]
    FractionalDelay(i64),

    /// A completion exception outside `1..last_completed`
    #[error("completion exception {index} is not below last completed occurrence {last_completed}")]
    InvalidException { index: u64, last_completed: u64 },

    /// Occurrence indices are 1-based
    #[error("invalid occurrence index: {0}")]
    InvalidOccurrence(u64),

    /// Priorities must be at least 1
    #[error("priority must be at least 1, got {0}")]
    InvalidPriority(u32),
}

/// Errors from parsing and running a user command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no arguments given")]
    NoArguments,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("no priority argument given")]
    MissingPriority,

    #[error("no task name given")]
    MissingName,

    #[error("no search term given")]
    NoSearchTerm,

    #[error("no tasks in list")]
    NoTasks,

    #[error("could not parse arguments: {0}")]
    BadArguments(String),
}
