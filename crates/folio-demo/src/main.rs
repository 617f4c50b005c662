#![forbid(unsafe_code)]

//! Folio demo: render a lesson document in the terminal and drive its
//! steppers with scripted actions.
//!
//! ```text
//! folio-demo --step fibonacci_seed=+ --step hexagon_sides==20
//! FOLIO_LOG=debug folio-demo --lesson my-lesson.toml --color ansi256
//! ```

mod cli;
mod document;
mod error;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use folio_runtime::{VariableDefaults, VariableStore};
use folio_style::ColorDowngrader;
use folio_widgets::{StepOutcome, StepperAction};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, StepCommand, StepTarget};
use crate::document::{LessonDocument, MountedLesson};
use crate::error::DemoError;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "folio-demo failed");
            eprintln!("folio-demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), DemoError> {
    let document = match &cli.lesson {
        Some(path) => LessonDocument::load(path)?,
        None => LessonDocument::builtin()?,
    };

    let store = VariableStore::session();
    if let Some(path) = &cli.variables {
        let seeded = VariableDefaults::from_path(path)?.apply(&store);
        info!(path = %path.display(), seeded, "applied variable overrides");
    }
    let mut lesson = document.mount(&store);

    let mut out = io::stdout().lock();
    let mut downgrader = ColorDowngrader::new(cli.color);
    print_lesson(&mut out, &lesson, cli.plain, &mut downgrader)?;

    if cli.steps.is_empty() {
        return Ok(());
    }
    for command in &cli.steps {
        let outcome = apply(&mut lesson, command)?;
        writeln!(out, "{}", describe(command, outcome))?;
    }
    writeln!(out)?;
    print_lesson(&mut out, &lesson, cli.plain, &mut downgrader)?;
    Ok(())
}

fn apply(lesson: &mut MountedLesson, command: &StepCommand) -> Result<StepOutcome, DemoError> {
    let stepper = match &command.target {
        StepTarget::Index(i) => lesson.stepper_mut(*i),
        StepTarget::Key(key) => lesson.stepper_for_key(key),
    };
    let stepper = stepper.ok_or_else(|| DemoError::UnknownTarget(target_label(&command.target)))?;
    Ok(stepper.apply(command.action))
}

fn describe(command: &StepCommand, outcome: StepOutcome) -> String {
    let action = match command.action {
        StepperAction::Increment => "+".to_owned(),
        StepperAction::Decrement => "-".to_owned(),
        StepperAction::Set(n) => format!("={n}"),
        StepperAction::BeginAdjust | StepperAction::EndAdjust => "adjust".to_owned(),
    };
    let target = target_label(&command.target);
    match outcome {
        StepOutcome::Committed(v) => format!("{target} {action} -> {v}"),
        StepOutcome::Clamped {
            requested,
            committed,
        } => format!("{target} {action} -> {committed} (clamped from {requested})"),
        StepOutcome::Unchanged => format!("{target} {action} -> unchanged"),
    }
}

fn target_label(target: &StepTarget) -> String {
    match target {
        StepTarget::Index(i) => format!("#{i}"),
        StepTarget::Key(key) => key.clone(),
    }
}

fn print_lesson(
    out: &mut impl Write,
    lesson: &MountedLesson,
    plain: bool,
    downgrader: &mut ColorDowngrader,
) -> io::Result<()> {
    if let Some(title) = &lesson.title {
        writeln!(out, "{title}")?;
        writeln!(out)?;
    }
    for paragraph in &lesson.paragraphs {
        let line = paragraph.render_line(&lesson.scope);
        if plain {
            writeln!(out, "{}", line.plain_text())?;
        } else {
            writeln!(out, "{}", line.to_ansi(downgrader))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
