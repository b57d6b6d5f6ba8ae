use crate::config::Config;
use crate::domain::{Container, Task, TaskList};
use crate::persistence::{backup_file, load_list, save_list};
use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{error, info, warn};

/// State for one session: the task list plus where it lives
pub struct AppState {
    pub list: TaskList,
    pub config: Config,
    /// The list file did not exist when the session started
    pub is_new: bool,
    /// Set by any mutation; cleared after a save
    pub needs_save: bool,
}

impl AppState {
    pub fn new(list: TaskList, config: Config, is_new: bool) -> Self {
        Self {
            list,
            config,
            is_new,
            needs_save: false,
        }
    }

    /// Load the list named by the config.
    ///
    /// An unreadable list is copied aside and replaced with a blank one, so
    /// the next save cannot silently destroy it.
    pub fn open(config: Config) -> Result<Self> {
        match load_list(&config.list_path) {
            Ok((list, is_new)) => Ok(Self::new(list, config, is_new)),
            Err(e) => {
                error!(error = %format!("{:#}", e), "could not read task list");
                let backup = backup_file(&config.list_path)?;
                warn!(backup = %backup.display(), "unreadable list backed up, starting blank");
                Ok(Self::new(TaskList::new(), config, false))
            }
        }
    }

    /// Sorted tasks as of `now`, capped at `max` (or the configured default)
    pub fn visible_tasks(&self, now: DateTime<Local>, max: Option<usize>) -> Vec<Task> {
        let mut tasks = self.list.list(now);
        if let Some(n) = max.or(self.config.max_items) {
            tasks.truncate(n);
        }
        tasks
    }

    pub fn add(&mut self, container: impl Into<Container>) {
        let container = container.into();
        info!(name = %container.name(), "task added");
        self.list.add(container);
        self.needs_save = true;
    }

    /// Complete the first task whose name starts with `term`
    pub fn complete(&mut self, term: &str, now: DateTime<Local>) -> Result<Option<Task>> {
        let done = self.list.complete(term, now)?;
        match &done {
            Some(task) => {
                info!(name = %task.name(), "task completed");
                self.needs_save = true;
            }
            None => warn!(term, "no task matched"),
        }
        Ok(done)
    }

    /// Write the list back if anything changed
    pub fn save(&mut self) -> Result<()> {
        if !self.needs_save {
            return Ok(());
        }
        save_list(&self.config.list_path, &self.list)?;
        self.needs_save = false;
        info!(path = %self.config.list_path.display(), "list saved");
        Ok(())
    }
}
