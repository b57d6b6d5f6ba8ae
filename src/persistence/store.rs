use super::files::{atomic_write, read_file};
use crate::domain::{Container, TaskList};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current on-disk format version
pub const LIST_VERSION: u32 = 1;

fn default_version() -> u32 {
    LIST_VERSION
}

/// On-disk shape of the task list
#[derive(Debug, Serialize, Deserialize)]
struct ListFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    tasks: Vec<Container>,
}

/// Borrowed twin of `ListFile` so saving doesn't clone the list
#[derive(Serialize)]
struct ListFileRef<'a> {
    version: u32,
    tasks: &'a [Container],
}

/// Decode a JSON task list and check every container
pub fn parse_list(content: &str) -> Result<TaskList> {
    let file: ListFile = serde_json::from_str(content).context("Malformed task list")?;

    if file.version > LIST_VERSION {
        anyhow::bail!(
            "Task list version {} is newer than supported version {}",
            file.version,
            LIST_VERSION
        );
    }

    for (i, container) in file.tasks.iter().enumerate() {
        container
            .validate()
            .with_context(|| format!("Invalid task #{} ({:?})", i + 1, container.name()))?;
    }

    Ok(TaskList::from_containers(file.tasks))
}

/// Encode a task list as pretty-printed JSON
pub fn serialize_list(list: &TaskList) -> Result<String> {
    let file = ListFileRef {
        version: LIST_VERSION,
        tasks: list.containers(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Load the task list at `path`.
///
/// A missing file is not an error: it yields an empty list and `true` for
/// "new".
pub fn load_list<P: AsRef<Path>>(path: P) -> Result<(TaskList, bool)> {
    let path = path.as_ref();

    match read_file(path)? {
        None => {
            tracing::info!(path = %path.display(), "list file doesn't exist, using blank");
            Ok((TaskList::new(), true))
        }
        Some(content) if content.trim().is_empty() => Ok((TaskList::new(), false)),
        Some(content) => {
            let list = parse_list(&content)
                .with_context(|| format!("Could not read task list: {}", path.display()))?;
            tracing::debug!(path = %path.display(), containers = list.len(), "list loaded");
            Ok((list, false))
        }
    }
}

/// Save the task list to `path` atomically
pub fn save_list<P: AsRef<Path>>(path: P, list: &TaskList) -> Result<()> {
    let json = serialize_list(list)?;
    atomic_write(path, &json)?;
    Ok(())
}
