use super::task::Task;
use chrono::{DateTime, Duration, Local};
use std::cmp::Ordering;

/// Stand-in distance used for tasks without a due date (72 hours, in nanoseconds)
pub const EVENTUAL_FACTOR: f64 = 72.0 * 3600.0 * 1_000_000_000.0;

/// Nice value for a dated task: `ln(priority) * (due - now)` in nanoseconds.
///
/// Lower is more urgent. Overdue tasks get a negative distance, so with
/// priority > 1 they sort ahead of everything due in the future. Priority 1
/// always scores 0 because `ln(1) == 0`.
pub fn nice_for_due(priority: u32, due: DateTime<Local>, now: DateTime<Local>) -> f64 {
    let distance = due.signed_duration_since(now);
    log_priority(priority) * nanos_saturating(distance) as f64
}

/// Nice value for an undated task: `ln(priority) * EVENTUAL_FACTOR`
pub fn nice_for_eventual(priority: u32) -> f64 {
    log_priority(priority) * EVENTUAL_FACTOR
}

fn log_priority(priority: u32) -> f64 {
    f64::from(priority).ln()
}

/// Nanoseconds in a duration, pinned to the i64 range when it overflows
fn nanos_saturating(distance: Duration) -> i64 {
    distance.num_nanoseconds().unwrap_or(if distance < Duration::zero() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Display order for two tasks as of `now`.
///
/// Compares nice values first. Equal scores fall back to the earlier due date
/// when both tasks have one; otherwise they compare equal so a stable sort
/// keeps their insertion order.
pub fn compare(a: &Task, b: &Task, now: DateTime<Local>) -> Ordering {
    a.nice(now)
        .total_cmp(&b.nice(now))
        .then_with(|| match (a.due(), b.due()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
}

/// Sort tasks in place, most urgent first
pub fn sort_tasks(tasks: &mut [Task], now: DateTime<Local>) {
    tasks.sort_by(|a, b| compare(a, b, now));
}
