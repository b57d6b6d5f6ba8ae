use crate::error::CommandError;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, TimeZone};

/// Format of the date part of `add`, after the year is prepended
const DUE_INPUT_FORMAT: &str = "%Y %b %d %H:%M";

/// Format for recurrence start and end times
pub const FULL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Years searched ahead when resolving a month/day to its next occurrence
const YEARS_AHEAD: i32 = 4;

fn bad(message: impl Into<String>) -> CommandError {
    CommandError::BadArguments(message.into())
}

/// Parse a duration such as "1h30m", "45m", "2d" or "1.5h".
///
/// Units: ms, s, m, h, d, w. Every number needs a unit.
pub fn parse_duration(text: &str) -> Result<Duration, CommandError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(bad("empty duration"));
    }

    let mut rest = text;
    let mut total_ms = 0f64;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(bad(format!("invalid duration {:?}", text)));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| bad(format!("invalid duration {:?}", text)))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let unit_ms = match &rest[..unit_len] {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            "d" => 86_400_000.0,
            "w" => 604_800_000.0,
            "" => return Err(bad(format!("missing unit in duration {:?}", text))),
            unit => return Err(bad(format!("unknown unit {:?} in duration {:?}", unit, text))),
        };
        total_ms += value * unit_ms;
        rest = &rest[unit_len..];
    }

    let total_ms = total_ms.round();
    if !total_ms.is_finite() || total_ms >= i64::MAX as f64 {
        return Err(bad(format!("duration out of range: {:?}", text)));
    }
    Duration::try_milliseconds(total_ms as i64).ok_or_else(|| bad(format!("duration out of range: {:?}", text)))
}

/// Parse a comma-separated delay list such as "1h,30m".
///
/// Delays are kept to whole seconds since that is how they are stored.
pub fn parse_delays(text: &str) -> Result<Vec<Duration>, CommandError> {
    text.split(',')
        .map(|part| {
            let delay = parse_duration(part)?;
            let whole = Duration::seconds(delay.num_seconds());
            if whole < Duration::seconds(1) {
                return Err(bad(format!("delay {:?} is shorter than a second", part)));
            }
            Ok(whole)
        })
        .collect()
}

/// Resolve a naive wall-clock time in the local zone
fn localize(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}

/// Parse "YYYY-MM-DD" and "HH:MM" words into a local time
pub fn parse_full_time(date: &str, time: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), FULL_FORMAT).ok()?;
    localize(naive)
}

/// Parse "Jan 2 15:04" into its next occurrence at or after `now`: this
/// year if still ahead, otherwise the first later year where it exists.
pub fn parse_due(text: &str, now: DateTime<Local>) -> Result<DateTime<Local>, CommandError> {
    for year in now.year()..=now.year() + YEARS_AHEAD {
        let candidate = NaiveDateTime::parse_from_str(&format!("{} {}", year, text), DUE_INPUT_FORMAT)
            .ok()
            .and_then(localize);
        if let Some(due) = candidate {
            if due >= now {
                return Ok(due);
            }
        }
    }
    Err(bad(format!("expected a date like \"Jan 2 15:04\", got {:?}", text)))
}

/// Split off an optional trailing description introduced by "--"
pub fn split_description(args: &[String]) -> (&[String], String) {
    match args.iter().position(|a| a == "--") {
        Some(pos) => (&args[..pos], args[pos + 1..].join(" ")),
        None => (args, String::new()),
    }
}

/// Split "name words... priority rest..." at the first integer word.
///
/// Returns the joined name, the priority, and the words after it.
pub fn split_name_priority(args: &[String]) -> Result<(String, u32, &[String]), CommandError> {
    let pos = args
        .iter()
        .position(|a| a.parse::<u32>().is_ok())
        .ok_or(CommandError::MissingPriority)?;
    let priority = args[pos].parse::<u32>().map_err(|_| CommandError::MissingPriority)?;

    let name = args[..pos].join(" ");
    if name.trim().is_empty() {
        return Err(CommandError::MissingName);
    }

    Ok((name, priority, &args[pos + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("45m").unwrap(), Duration::minutes(45));
        assert_eq!(parse_duration("2d").unwrap(), Duration::days(2));
        assert_eq!(parse_duration("1w").unwrap(), Duration::weeks(1));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::milliseconds(250));
        assert_eq!(parse_duration(" 10s ").unwrap(), Duration::seconds(10));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("-1h").is_err());
        assert!(parse_duration("3y").is_err());
        assert!(parse_duration("1..5h").is_err());
    }

    #[test]
    fn test_parse_delays() {
        assert_eq!(
            parse_delays("1h,2h").unwrap(),
            vec![Duration::hours(1), Duration::hours(2)]
        );
        assert_eq!(parse_delays("1500ms").unwrap(), vec![Duration::seconds(1)]);
        assert!(parse_delays("500ms").is_err());
        assert!(parse_delays("1h,").is_err());
    }

    #[test]
    fn test_parse_full_time() {
        let parsed = parse_full_time("2024-03-01", "09:30").unwrap();
        assert_eq!(parsed, Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        assert!(parse_full_time("2024-13-01", "09:30").is_none());
        assert!(parse_full_time("Mar", "1").is_none());
    }

    #[test]
    fn test_parse_due_this_year() {
        let due = parse_due("Dec 24 18:00", now()).unwrap();
        assert_eq!(due, Local.with_ymd_and_hms(2024, 12, 24, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_due_rolls_to_next_year() {
        let due = parse_due("jan 2 09:00", now()).unwrap();
        assert_eq!(due, Local.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_due_leap_day() {
        // 2024's Feb 29 has passed, so the next one is 2028
        let due = parse_due("Feb 29 08:00", now()).unwrap();
        assert_eq!(due, Local.with_ymd_and_hms(2028, 2, 29, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_due_rejects_garbage() {
        assert!(parse_due("tomorrow", now()).is_err());
        assert!(parse_due("", now()).is_err());
    }

    #[test]
    fn test_split_name_priority() {
        let args = words("pay the rent 4 Jul 1 09:00");
        let (name, priority, rest) = split_name_priority(&args).unwrap();
        assert_eq!(name, "pay the rent");
        assert_eq!(priority, 4);
        assert_eq!(rest, &words("Jul 1 09:00")[..]);
    }

    #[test]
    fn test_split_name_priority_errors() {
        assert_eq!(split_name_priority(&words("no number")).unwrap_err(), CommandError::MissingPriority);
        assert_eq!(split_name_priority(&words("3 oops")).unwrap_err(), CommandError::MissingName);
    }

    #[test]
    fn test_split_description() {
        let args = words("read 2 -- the long one");
        let (head, description) = split_description(&args);
        assert_eq!(head, &words("read 2")[..]);
        assert_eq!(description, "the long one");

        let args = words("read 2");
        let (head, description) = split_description(&args);
        assert_eq!(head.len(), 2);
        assert_eq!(description, "");
    }
}
