pub mod enums;
pub mod priority;
pub mod recurrence;
pub mod registry;
pub mod task;
pub mod views;

pub use recurrence::{OccurrenceTemplate, RecurrenceSchedule};
pub use registry::{Container, TaskList};
pub use task::{DefiniteTask, EventualTask, Task};
pub use views::{render_long, render_short, RenderConfig};
