mod app;
mod config;
mod domain;
mod error;
mod input;
mod persistence;

use anyhow::Result;
use app::AppState;
use chrono::Local;
use clap::{ArgAction, Parser};
use config::Config;
use input::{split_args, Command, Flow};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Prompt shown before each line in interactive mode
const PROMPT: &str = ": ";

#[derive(Parser)]
#[command(name = "tasktogo", version)]
#[command(about = "Keep a prioritized task list with eventual and recurring tasks", long_about = None)]
struct Cli {
    /// Task list file (defaults to ~/.tasktogo)
    #[arg(short = 'l', long = "list", env = "TASKTOGO_LIST")]
    list: Option<PathBuf>,

    /// Disable list colorization
    #[arg(long)]
    no_color: bool,

    /// Default number of tasks shown by `list`
    #[arg(short = 'n', long)]
    max_items: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Run a single command instead of the interactive prompt
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let colors = !cli.no_color && io::stdout().is_terminal();
    let config = match Config::resolve(cli.list, colors, cli.max_items, cli.verbose) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    match run(config, &cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "fatal error");
            eprintln!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(config: Config, command: &[String]) -> Result<ExitCode> {
    let mut app = AppState::open(config)?;

    let code = if command.is_empty() {
        run_interactive_mode(&mut app)?;
        ExitCode::SUCCESS
    } else {
        run_command_mode(&mut app, command)
    };

    // Save on exit
    if let Err(e) = app.save() {
        error!(error = %format!("{:#}", e), "could not save list");
        eprintln!("Could not save list: {:#}", e);
        return Ok(ExitCode::FAILURE);
    }

    Ok(code)
}

/// Run one command from the process arguments
fn run_command_mode(app: &mut AppState, args: &[String]) -> ExitCode {
    let mut stdout = io::stdout();

    let result = Command::parse(args)
        .map_err(anyhow::Error::from)
        .and_then(|command| command.run(app, &mut stdout, Local::now()));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}

/// Read commands from stdin until `exit` or EOF
fn run_interactive_mode(app: &mut AppState) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            info!("encountered EOF, exiting");
            // Keep the shell prompt on its own line
            writeln!(stdout)?;
            return Ok(());
        }

        let args = split_args(&line);
        if args.is_empty() {
            continue;
        }

        let command = match Command::parse(&args) {
            Ok(command) => command,
            Err(e) => {
                report_error(&mut stdout, &e.into());
                continue;
            }
        };

        match command.run(app, &mut stdout, Local::now()) {
            Ok(Flow::Exit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(e) => report_error(&mut stdout, &e),
        }
    }
}

/// Show a command error to the user and log it
fn report_error(out: &mut dyn Write, err: &anyhow::Error) {
    warn!(error = %format!("{:#}", err), "error in command");
    if let Err(e) = writeln!(out, "Error: {:#}", err) {
        debug!(error = %e, "could not show error to user");
    }
}
