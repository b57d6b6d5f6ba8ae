use super::enums::Band;
use super::task::Task;
use chrono::{DateTime, Duration, Local};
use crossterm::style::{Color, Stylize};

/// Format for due dates further than a day away
pub const DUE_FORMAT: &str = "%A, %b %d, %H:%M";

/// Time span covered by each color band for dated tasks
pub const COLOR_THRESHOLD_HOURS: i64 = 24;

/// Priority span covered by each color band for eventual tasks
pub const EVENTUAL_THRESHOLD: u32 = 1;

/// Everything a render call needs besides the task itself
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Whether output should be colorized
    pub colors: bool,
    /// Reference time for relative dates and bands
    pub now: DateTime<Local>,
}

impl RenderConfig {
    pub fn new(colors: bool, now: DateTime<Local>) -> Self {
        Self { colors, now }
    }
}

/// Format a duration as "Xh Ym" (omits 0 values)
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 && minutes > 0 {
        format!("{}h {}m", hours, minutes)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", minutes)
    }
}

/// Relative text within a day of `now`, absolute date otherwise
pub fn format_due(due: DateTime<Local>, now: DateTime<Local>) -> String {
    let distance = due.signed_duration_since(now);
    let magnitude = distance.abs();

    if magnitude < Duration::minutes(1) {
        "now".to_string()
    } else if magnitude < Duration::hours(COLOR_THRESHOLD_HOURS) {
        if distance > Duration::zero() {
            format!("in {}", format_duration(magnitude))
        } else {
            format!("{} ago", format_duration(magnitude))
        }
    } else {
        due.format(DUE_FORMAT).to_string()
    }
}

/// Color band for a task as of `now`
pub fn band_for(task: &Task, now: DateTime<Local>) -> Band {
    match task.due() {
        Some(due) => Band::for_distance(
            due.signed_duration_since(now),
            Duration::hours(COLOR_THRESHOLD_HOURS),
        ),
        None => Band::for_priority(task.priority(), EVENTUAL_THRESHOLD),
    }
}

fn band_color(band: Band) -> Color {
    match band {
        Band::Red => Color::Red,
        Band::Yellow => Color::Yellow,
        Band::Green => Color::Green,
        Band::Cyan => Color::Cyan,
        Band::Blue => Color::Blue,
        Band::Purple => Color::Magenta,
    }
}

/// Colorize when the config allows it, pass through otherwise
fn paint(text: String, task: &Task, config: &RenderConfig) -> String {
    if config.colors {
        text.with(band_color(band_for(task, config.now))).to_string()
    } else {
        text
    }
}

fn headline(task: &Task, now: DateTime<Local>) -> String {
    match task.due() {
        Some(due) => format!("({}) {} - {}", task.priority(), format_due(due, now), task.name()),
        None => format!("({}) - {}", task.priority(), task.name()),
    }
}

/// One-line form used by `list`
pub fn render_short(task: &Task, config: &RenderConfig) -> String {
    paint(headline(task, config.now), task, config)
}

/// Headline plus the description on an indented second line
pub fn render_long(task: &Task, config: &RenderConfig) -> String {
    format!("{}\n\t{}", render_short(task, config), task.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{DefiniteTask, EventualTask};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn plain() -> RenderConfig {
        RenderConfig::new(false, now())
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(90)), "1h 30m");
        assert_eq!(format_duration(Duration::hours(2)), "2h");
        assert_eq!(format_duration(Duration::minutes(45)), "45m");
    }

    #[test]
    fn test_format_due_relative_and_absolute() {
        assert_eq!(format_due(now() + Duration::minutes(125), now()), "in 2h 5m");
        assert_eq!(format_due(now() - Duration::minutes(45), now()), "45m ago");
        assert_eq!(format_due(now() + Duration::seconds(20), now()), "now");
        assert_eq!(format_due(now() + Duration::days(3), now()), "Monday, Mar 04, 12:00");
    }

    #[test]
    fn test_render_short_dated() {
        let task = Task::Definite(DefiniteTask::new("Taxes", 4, now() + Duration::hours(3)).unwrap());
        assert_eq!(render_short(&task, &plain()), "(4) in 3h - Taxes");
    }

    #[test]
    fn test_render_short_eventual() {
        let task = Task::Eventual(EventualTask::new("Learn piano", 2).unwrap());
        assert_eq!(render_short(&task, &plain()), "(2) - Learn piano");
    }

    #[test]
    fn test_render_long_includes_description() {
        let task = Task::Eventual(
            EventualTask::new("Learn piano", 2)
                .unwrap()
                .with_description("scales first"),
        );
        assert_eq!(render_long(&task, &plain()), "(2) - Learn piano\n\tscales first");
    }

    #[test]
    fn test_colors_only_when_enabled() {
        let task = Task::Definite(DefiniteTask::new("Taxes", 4, now() - Duration::hours(1)).unwrap());
        let colored = render_short(&task, &RenderConfig::new(true, now()));
        assert!(colored.contains("Taxes"));
        // crossterm drops escape codes when NO_COLOR is set
        if std::env::var_os("NO_COLOR").is_none() {
            assert!(colored.contains("\u{1b}["));
        }
        assert!(!render_short(&task, &plain()).contains('\u{1b}'));
    }

    #[test]
    fn test_band_for_task() {
        let overdue = Task::Definite(DefiniteTask::new("a", 4, now() - Duration::hours(1)).unwrap());
        let eventual = Task::Eventual(EventualTask::new("b", 2).unwrap());
        assert_eq!(band_for(&overdue, now()), Band::Red);
        assert_eq!(band_for(&eventual, now()), Band::Green);
    }
}
