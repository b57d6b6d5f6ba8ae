use crate::domain::RenderConfig;
use crate::persistence::default_list_path;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Settings resolved from command-line flags and the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the task list is loaded from and saved to
    pub list_path: PathBuf,
    /// Colorize listed tasks
    pub colors: bool,
    /// Default cap for `list` (None = show everything)
    pub max_items: Option<usize>,
    /// Number of -v flags given
    pub verbosity: u8,
}

impl Config {
    /// Build a config, falling back to ~/.tasktogo when no path is given
    pub fn resolve(
        list_path: Option<PathBuf>,
        colors: bool,
        max_items: Option<usize>,
        verbosity: u8,
    ) -> Result<Self> {
        let list_path = match list_path {
            Some(path) => path,
            None => default_list_path()?,
        };

        Ok(Self {
            list_path,
            colors,
            max_items: max_items.filter(|n| *n > 0),
            verbosity,
        })
    }

    /// Default log filter for the verbosity level (RUST_LOG wins over this)
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Render settings for a listing taken at `now`
    pub fn render_config(&self, now: DateTime<Local>) -> RenderConfig {
        RenderConfig::new(self.colors, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(verbosity: u8) -> Config {
        Config::resolve(Some(PathBuf::from("/tmp/list.json")), true, None, verbosity).unwrap()
    }

    #[test]
    fn test_resolve_keeps_explicit_path() {
        assert_eq!(config(0).list_path, PathBuf::from("/tmp/list.json"));
    }

    #[test]
    fn test_zero_max_items_means_unlimited() {
        let config = Config::resolve(Some(PathBuf::from("x")), false, Some(0), 0).unwrap();
        assert_eq!(config.max_items, None);
        let config = Config::resolve(Some(PathBuf::from("x")), false, Some(5), 0).unwrap();
        assert_eq!(config.max_items, Some(5));
    }

    #[test]
    fn test_log_filter_by_verbosity() {
        assert_eq!(config(0).log_filter(), "warn");
        assert_eq!(config(1).log_filter(), "info");
        assert_eq!(config(2).log_filter(), "debug");
        assert_eq!(config(7).log_filter(), "trace");
    }

    #[test]
    fn test_render_config_carries_colors() {
        let now = Local::now();
        let render = config(0).render_config(now);
        assert!(render.colors);
        assert_eq!(render.now, now);
    }
}
