#![forbid(unsafe_code)]

//! Command-line interface.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use folio_style::ColorProfile;
use folio_widgets::StepperAction;

#[derive(Parser, Debug)]
#[command(name = "folio-demo", version)]
#[command(about = "Render a Folio lesson and drive its steppers from the command line")]
pub struct Cli {
    /// Lesson document (TOML). Defaults to the built-in nature lesson.
    #[arg(long, env = "FOLIO_DEMO_LESSON")]
    pub lesson: Option<PathBuf>,

    /// Variable overrides (TOML or JSON), seeded before the lesson defaults.
    #[arg(long, env = "FOLIO_DEMO_VARIABLES")]
    pub variables: Option<PathBuf>,

    /// Terminal color capability: truecolor, ansi256, ansi16, or mono.
    #[arg(long, env = "FOLIO_DEMO_COLOR", default_value = "truecolor")]
    pub color: ColorProfile,

    /// Stepper action as TARGET=ACTION, where TARGET is a store key or a
    /// stepper index and ACTION is `+`, `-`, or `=N`. Repeatable.
    #[arg(long = "step", value_name = "TARGET=ACTION")]
    pub steps: Vec<StepCommand>,

    /// Print unstyled text.
    #[arg(long, env = "FOLIO_DEMO_PLAIN")]
    pub plain: bool,
}

/// Which stepper a command addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepTarget {
    Index(usize),
    Key(String),
}

/// One `--step` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub target: StepTarget,
    pub action: StepperAction,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepParseError {
    #[error("expected TARGET=ACTION, got '{0}'")]
    MissingSeparator(String),
    #[error("empty target in '{0}'")]
    EmptyTarget(String),
    #[error("unknown action '{0}', expected '+', '-', or '=N'")]
    UnknownAction(String),
}

impl FromStr for StepCommand {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, action) = s
            .split_once('=')
            .ok_or_else(|| StepParseError::MissingSeparator(s.to_owned()))?;
        let target = target.trim();
        if target.is_empty() {
            return Err(StepParseError::EmptyTarget(s.to_owned()));
        }
        let action = match action.trim() {
            "+" => StepperAction::Increment,
            "-" => StepperAction::Decrement,
            other => other
                .strip_prefix('=')
                .and_then(|n| n.trim().parse().ok())
                .map(StepperAction::Set)
                .ok_or_else(|| StepParseError::UnknownAction(other.to_owned()))?,
        };
        let target = target
            .parse()
            .map_or_else(|_| StepTarget::Key(target.to_owned()), StepTarget::Index);
        Ok(Self { target, action })
    }
}
