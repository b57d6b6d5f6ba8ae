use super::priority::sort_tasks;
use super::recurrence::RecurrenceSchedule;
use super::task::{validate_priority, Completion, DefiniteTask, EventualTask, Task};
use crate::error::TaskError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A top-level entry in the task list. Plain tasks expand to themselves,
/// recurrence schedules expand to their pending occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Container {
    Definite(DefiniteTask),
    Eventual(EventualTask),
    Recurring(RecurrenceSchedule),
}

impl Container {
    pub fn id(&self) -> Uuid {
        match self {
            Container::Definite(t) => t.id,
            Container::Eventual(t) => t.id,
            Container::Recurring(s) => s.id,
        }
    }

    /// Check invariants that deserialization cannot enforce
    pub fn validate(&self) -> Result<(), TaskError> {
        match self {
            Container::Definite(t) => validate_priority(t.priority).map(|_| ()),
            Container::Eventual(t) => validate_priority(t.priority).map(|_| ()),
            Container::Recurring(s) => s.validate(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Container::Definite(t) => &t.name,
            Container::Eventual(t) => &t.name,
            Container::Recurring(s) => &s.template.name,
        }
    }

    /// Expand this container into displayable tasks as of `now`
    pub fn tasks(&self, now: DateTime<Local>) -> Vec<Task> {
        match self {
            Container::Definite(t) => vec![Task::Definite(t.clone())],
            Container::Eventual(t) => vec![Task::Eventual(t.clone())],
            Container::Recurring(s) => s.expand(now).into_iter().map(Task::Occurrence).collect(),
        }
    }
}

impl From<DefiniteTask> for Container {
    fn from(task: DefiniteTask) -> Self {
        Container::Definite(task)
    }
}

impl From<EventualTask> for Container {
    fn from(task: EventualTask) -> Self {
        Container::Eventual(task)
    }
}

impl From<RecurrenceSchedule> for Container {
    fn from(schedule: RecurrenceSchedule) -> Self {
        Container::Recurring(schedule)
    }
}

/// In-memory collection of every task container, in storage order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    containers: Vec<Container>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_containers(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Append a container; ordering happens at list time
    pub fn add(&mut self, container: impl Into<Container>) -> Uuid {
        let container = container.into();
        let id = container.id();
        self.containers.push(container);
        id
    }

    /// Expand every container as of `now` and sort most urgent first.
    /// Nothing is cached, so each call reflects the current time.
    pub fn list(&self, now: DateTime<Local>) -> Vec<Task> {
        let mut tasks = self.expand(now);
        sort_tasks(&mut tasks, now);
        tasks
    }

    /// Expanded tasks in storage order, unsorted
    fn expand(&self, now: DateTime<Local>) -> Vec<Task> {
        self.containers.iter().flat_map(|c| c.tasks(now)).collect()
    }

    /// Complete the first task in storage order whose name starts with
    /// `term` (case-insensitive).
    ///
    /// Returns the completed task, or `None` when nothing matched. A miss
    /// leaves the list untouched.
    pub fn complete(&mut self, term: &str, now: DateTime<Local>) -> Result<Option<Task>, TaskError> {
        let found = self.expand(now).into_iter().find(|task| task.matches(term));

        match found {
            Some(task) => {
                self.complete_task(&task)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// Route a task's completion back to the container that produced it.
    /// Returns false if that container no longer exists.
    pub fn complete_task(&mut self, task: &Task) -> Result<bool, TaskError> {
        match task.completion() {
            Completion::Remove(id) => {
                let before = self.containers.len();
                self.containers.retain(|c| c.id() != id);
                Ok(self.containers.len() != before)
            }
            Completion::Occurrence { schedule, index } => match self.schedule_mut(schedule) {
                Some(s) => {
                    s.complete(index)?;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    fn schedule_mut(&mut self, id: Uuid) -> Option<&mut RecurrenceSchedule> {
        self.containers.iter_mut().find_map(|c| match c {
            Container::Recurring(s) if s.id == id => Some(s),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::priority::{nice_for_due, nice_for_eventual};
    use crate::domain::recurrence::OccurrenceTemplate;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn names(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.name()).collect()
    }

    fn daily(name: &str, priority: u32, start: DateTime<Local>) -> RecurrenceSchedule {
        let template = OccurrenceTemplate::new(name, priority).unwrap();
        RecurrenceSchedule::new(start, None, vec![Duration::days(1)], template).unwrap()
    }

    #[test]
    fn test_list_mixed_order_matches_scores() {
        let mut list = TaskList::new();
        list.add(EventualTask::new("Someday", 5).unwrap());
        list.add(DefiniteTask::new("Report", 5, now() + Duration::hours(1)).unwrap());

        let tasks = list.list(now());
        assert_eq!(names(&tasks), vec!["Report", "Someday"]);
        assert_eq!(tasks[0].nice(now()), nice_for_due(5, now() + Duration::hours(1), now()));
        assert_eq!(tasks[1].nice(now()), nice_for_eventual(5));
        assert!(tasks[0].nice(now()) < tasks[1].nice(now()));
    }

    #[test]
    fn test_list_includes_occurrences() {
        let mut list = TaskList::new();
        list.add(daily("Stretch", 2, now() - Duration::hours(36)));
        list.add(EventualTask::new("Paint", 9).unwrap());

        let tasks = list.list(now());
        // Occurrence 1 is overdue by 12h, occurrence 2 is the in-progress slot
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].name(), "Stretch");
        assert_eq!(tasks[0].due(), Some(now() - Duration::hours(12)));
    }

    #[test]
    fn test_list_reflects_time_advancing() {
        let mut list = TaskList::new();
        list.add(daily("Water", 2, now()));

        assert_eq!(list.list(now()).len(), 1);
        assert_eq!(list.list(now() + Duration::days(3)).len(), 4);
    }

    #[test]
    fn test_complete_removes_plain_task() {
        let mut list = TaskList::new();
        list.add(EventualTask::new("Call mom", 3).unwrap());
        list.add(EventualTask::new("Clean", 3).unwrap());

        let done = list.complete("call", now()).unwrap().unwrap();
        assert_eq!(done.name(), "Call mom");
        assert_eq!(list.len(), 1);
        assert_eq!(names(&list.list(now())), vec!["Clean"]);
    }

    #[test]
    fn test_complete_uses_storage_order_not_display_order() {
        let mut list = TaskList::new();
        list.add(EventualTask::new("Task later", 9).unwrap());
        list.add(DefiniteTask::new("Task urgent", 9, now() - Duration::hours(1)).unwrap());

        // Display order puts the overdue task first, but storage order wins
        assert_eq!(list.list(now())[0].name(), "Task urgent");
        let done = list.complete("task", now()).unwrap().unwrap();
        assert_eq!(done.name(), "Task later");
    }

    #[test]
    fn test_complete_no_match_is_noop() {
        let mut list = TaskList::new();
        list.add(EventualTask::new("Read", 3).unwrap());
        let before = list.clone();

        assert_eq!(list.complete("write", now()).unwrap(), None);
        assert_eq!(list, before);
    }

    #[test]
    fn test_complete_occurrence_updates_tracker() {
        let mut list = TaskList::new();
        let id = list.add(daily("Journal", 2, now() - Duration::hours(60)));

        // Occurrences 1, 2 overdue; 3 in progress
        assert_eq!(list.list(now()).len(), 3);

        let done = list.complete("journal", now()).unwrap().unwrap();
        match done {
            Task::Occurrence(o) => {
                assert_eq!(o.schedule, id);
                assert_eq!(o.index, 1);
            }
            other => panic!("expected an occurrence, got {:?}", other),
        }

        // Schedule is still stored; only its tracker moved
        assert_eq!(list.len(), 1);
        match &list.containers()[0] {
            Container::Recurring(s) => assert_eq!(s.tracker.last_completed, 1),
            other => panic!("expected a schedule, got {:?}", other),
        }
        assert_eq!(list.list(now()).len(), 2);
    }

    #[test]
    fn test_complete_task_directly_out_of_order() {
        let mut list = TaskList::new();
        list.add(daily("Run", 2, now() - Duration::hours(60)));

        let tasks = list.list(now());
        let third = tasks.iter().find(|t| matches!(t, Task::Occurrence(o) if o.index == 3)).unwrap();
        assert!(list.complete_task(third).unwrap());

        let remaining: Vec<u64> = list
            .list(now())
            .iter()
            .filter_map(|t| match t {
                Task::Occurrence(o) => Some(o.index),
                _ => None,
            })
            .collect();
        assert_eq!(remaining, vec![1, 2]);
    }

    #[test]
    fn test_complete_task_for_missing_container() {
        let mut list = TaskList::new();
        let task = Task::Eventual(EventualTask::new("Ghost", 2).unwrap());
        assert!(!list.complete_task(&task).unwrap());
    }

    #[test]
    fn test_container_json_discriminator() {
        let container = Container::from(EventualTask::new("Learn Rust", 4).unwrap());
        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(json["kind"], "eventual");
        assert_eq!(json["name"], "Learn Rust");

        let unknown = serde_json::json!({"kind": "monthly", "name": "x", "priority": 2});
        assert!(serde_json::from_value::<Container>(unknown).is_err());
    }

    #[test]
    fn test_container_validate() {
        let zero = serde_json::json!({"kind": "eventual", "name": "x", "priority": 0});
        let container: Container = serde_json::from_value(zero).unwrap();
        assert_eq!(container.validate(), Err(TaskError::InvalidPriority(0)));

        let container = Container::from(daily("Walk", 2, now()));
        assert_eq!(container.validate(), Ok(()));
        assert_eq!(container.name(), "Walk");
    }
}
