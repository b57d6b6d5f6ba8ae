use super::parse::{
    parse_delays, parse_due, parse_full_time, split_description, split_name_priority,
};
use crate::app::AppState;
use crate::domain::{
    render_long, render_short, DefiniteTask, EventualTask, OccurrenceTemplate, RecurrenceSchedule,
};
use crate::error::CommandError;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::Write;
use tracing::debug;

/// What the caller should do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The primary word of a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Exit,
    List,
    Show,
    Add,
    Eventually,
    Recurring,
    Done,
}

impl CommandKind {
    /// Look up a command by name or alias (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "help" | "h" => Some(Self::Help),
            "exit" | "quit" | "q" => Some(Self::Exit),
            "list" | "l" => Some(Self::List),
            "show" | "s" => Some(Self::Show),
            "add" | "a" => Some(Self::Add),
            "eventually" | "e" => Some(Self::Eventually),
            "recurring" | "r" => Some(Self::Recurring),
            "done" | "d" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Exit => "exit",
            Self::List => "list",
            Self::Show => "show",
            Self::Add => "add",
            Self::Eventually => "eventually",
            Self::Recurring => "recurring",
            Self::Done => "done",
        }
    }
}

/// A parsed command: the primary word plus its remaining arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl Command {
    /// Build a command from a full argument list, command word included
    pub fn parse(args: &[String]) -> Result<Self, CommandError> {
        let (first, rest) = args.split_first().ok_or(CommandError::NoArguments)?;
        let kind = CommandKind::from_name(first)
            .ok_or_else(|| CommandError::UnknownCommand(first.clone()))?;
        Ok(Self {
            kind,
            args: rest.to_vec(),
        })
    }

    /// Execute against the session, writing user-facing output to `out`
    pub fn run(&self, app: &mut AppState, out: &mut dyn Write, now: DateTime<Local>) -> Result<Flow> {
        debug!(command = self.kind.name(), "user invoked command");

        match self.kind {
            CommandKind::Help => cmd_help(out),
            CommandKind::Exit => Ok(Flow::Exit),
            CommandKind::List => cmd_list(&self.args, app, out, now),
            CommandKind::Show => cmd_show(&self.args, app, out, now),
            CommandKind::Add => cmd_add(&self.args, app, now),
            CommandKind::Eventually => cmd_eventually(&self.args, app),
            CommandKind::Recurring => cmd_recurring(&self.args, app),
            CommandKind::Done => cmd_done(&self.args, app, out, now),
        }
    }
}

fn cmd_help(out: &mut dyn Write) -> Result<Flow> {
    writeln!(out, "tasktogo {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    writeln!(out, "    help                                          - print this menu")?;
    writeln!(out, "    exit                                          - save and exit")?;
    writeln!(out, "    list [max]                                    - list tasks by urgency")?;
    writeln!(out, "    show name                                     - show matching tasks in full")?;
    writeln!(out, "    add name priority month day hh:mm [-- desc]   - add a dated task")?;
    writeln!(out, "    eventually name priority [-- desc]            - add an undated task")?;
    writeln!(
        out,
        "    recurring name priority start [end] delay[,delay] [-- desc]\n\
         \x20                                                 - add a recurring task (YYYY-MM-DD HH:MM, 1h30m)"
    )?;
    writeln!(out, "    done name                                     - complete a task")?;
    Ok(Flow::Continue)
}

fn cmd_list(args: &[String], app: &AppState, out: &mut dyn Write, now: DateTime<Local>) -> Result<Flow> {
    if app.is_new && app.list.is_empty() {
        return Err(CommandError::NoTasks.into());
    }

    // A positive argument caps the listing; anything else uses the default
    let max = args
        .first()
        .and_then(|a| a.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as usize);

    let render = app.config.render_config(now);
    for task in app.visible_tasks(now, max) {
        writeln!(out, "{}", render_short(&task, &render))?;
    }
    Ok(Flow::Continue)
}

fn cmd_show(args: &[String], app: &AppState, out: &mut dyn Write, now: DateTime<Local>) -> Result<Flow> {
    let term = search_term(args)?;
    let render = app.config.render_config(now);

    let matching: Vec<_> = app.list.list(now).into_iter().filter(|t| t.matches(&term)).collect();
    if matching.is_empty() {
        writeln!(out, "No task matching {:?}", term)?;
    }
    for task in matching {
        writeln!(out, "{}", render_long(&task, &render))?;
    }
    Ok(Flow::Continue)
}

fn cmd_add(args: &[String], app: &mut AppState, now: DateTime<Local>) -> Result<Flow> {
    let (args, description) = split_description(args);
    let (name, priority, rest) = split_name_priority(args)?;
    let due = parse_due(&rest.join(" "), now)?;

    let task = DefiniteTask::new(name, priority, due)?.with_description(description);
    app.add(task);
    Ok(Flow::Continue)
}

fn cmd_eventually(args: &[String], app: &mut AppState) -> Result<Flow> {
    let (args, description) = split_description(args);
    let (name, priority, _) = split_name_priority(args)?;

    let task = EventualTask::new(name, priority)?.with_description(description);
    app.add(task);
    Ok(Flow::Continue)
}

/// Read a "YYYY-MM-DD HH:MM" pair off the end of `args`
fn take_time(args: &[String]) -> Option<(DateTime<Local>, &[String])> {
    match args {
        [rest @ .., date, time] => parse_full_time(date, time).map(|t| (t, rest)),
        _ => None,
    }
}

/// recurring name... priority start [end] delay[,delay]
///
/// Parsed from the back: delays, then one or two times, then the priority.
fn cmd_recurring(args: &[String], app: &mut AppState) -> Result<Flow> {
    let (args, description) = split_description(args);

    let (delays_arg, rest) = args.split_last().ok_or(CommandError::NoArguments)?;
    let delays = parse_delays(delays_arg)?;

    let (last_time, rest) = take_time(rest)
        .ok_or_else(|| CommandError::BadArguments("expected a start time like 2024-01-27 12:00".into()))?;
    let (start, end, rest) = match take_time(rest) {
        Some((first_time, rest)) => (first_time, Some(last_time), rest),
        None => (last_time, None, rest),
    };

    let (priority_arg, name_args) = rest.split_last().ok_or(CommandError::MissingPriority)?;
    let priority = priority_arg
        .parse::<u32>()
        .map_err(|_| CommandError::MissingPriority)?;
    let name = name_args.join(" ");
    if name.trim().is_empty() {
        return Err(CommandError::MissingName.into());
    }

    let template = OccurrenceTemplate::new(name, priority)?.with_description(description);
    let schedule = RecurrenceSchedule::new(start, end, delays, template)?;
    app.add(schedule);
    Ok(Flow::Continue)
}

fn cmd_done(args: &[String], app: &mut AppState, out: &mut dyn Write, now: DateTime<Local>) -> Result<Flow> {
    let term = search_term(args)?;

    if app.complete(&term, now)?.is_none() {
        writeln!(out, "No task matching {:?}", term)?;
    }
    Ok(Flow::Continue)
}

/// Re-join the arguments into one search prefix
fn search_term(args: &[String]) -> Result<String, CommandError> {
    let term = args.join(" ");
    if term.trim().is_empty() {
        return Err(CommandError::NoSearchTerm);
    }
    Ok(term)
}
