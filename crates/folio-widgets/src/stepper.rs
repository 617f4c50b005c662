#![forbid(unsafe_code)]

//! Inline numeric stepper bound to a store key or to local state.
//!
//! # Design Invariants
//!
//! 1. **Bounds hold**: every request is clamped into `[min, max]` (inclusive)
//!    before it is committed. Out-of-range requests commit the nearest bound;
//!    they are never rejected.
//! 2. **Never display out of range**: a bound stepper shows the store value
//!    clamped into its own bounds, even when another writer stored something
//!    outside them. Reading never rewrites the store.
//! 3. **Single notification pass**: a bound commit goes through the binding's
//!    setter, so every observer of the key updates before `apply` returns.
//! 4. **Local isolation**: an unbound stepper's value lives and dies with the
//!    stepper.
//!
//! # Phases
//!
//! ```text
//!             BeginAdjust                  out-of-range request
//!   Idle ───────────────────▶ Adjusting ─────────────────────────▶ Clamped
//!    ▲                           │  ▲                                 │
//!    └──────── EndAdjust ────────┘  └──── in-range request ───────────┘
//! ```
//!
//! A request outside an adjustment also lands in `Clamped` when clamping
//! occurred, and in `Idle` otherwise.

use std::cell::Cell;
use std::fmt;

use folio_runtime::{Setter, VariableBinding, VariableStore};
use folio_style::{AnnotationScope, Rgb, Style};
use tracing::{debug, warn};

use crate::Widget;
use crate::line::{Line, Segment};

/// Literal configuration supplied by document content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepperConfig {
    pub min: i64,
    pub max: i64,
    pub initial: i64,
    #[cfg_attr(feature = "serde", serde(default = "default_step"))]
    pub step: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Option<Rgb>,
}

#[cfg(feature = "serde")]
fn default_step() -> i64 {
    1
}

impl StepperConfig {
    #[must_use]
    pub fn new(initial: i64, min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            initial,
            step: 1,
            key: None,
            color: None,
        }
    }

    /// Delegate the value to store `key`.
    #[must_use]
    pub fn bound(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// Externally visible state of a stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepperPhase {
    #[default]
    Idle,
    Adjusting,
    Clamped,
}

/// User or programmatic request against a stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperAction {
    Increment,
    Decrement,
    Set(i64),
    BeginAdjust,
    EndAdjust,
}

/// Result of applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The requested value was in range and committed as-is.
    Committed(i64),
    /// The request was out of range; the nearest bound was committed.
    Clamped { requested: i64, committed: i64 },
    /// Nothing was committed.
    Unchanged,
}

impl StepOutcome {
    /// The committed value, if any.
    #[must_use]
    pub const fn committed(self) -> Option<i64> {
        match self {
            Self::Committed(v) | Self::Clamped { committed: v, .. } => Some(v),
            Self::Unchanged => None,
        }
    }
}

enum Source {
    Local(Cell<i64>),
    Bound(VariableBinding<i64>),
}

/// Inline integer control with inclusive bounds.
///
/// ```
/// use folio_runtime::VariableStore;
/// use folio_widgets::{NumericStepper, StepOutcome, StepperAction, StepperConfig};
///
/// let store = VariableStore::new();
/// let mut sides = NumericStepper::mount(&StepperConfig::new(6, 3, 12), &store);
///
/// assert_eq!(sides.apply(StepperAction::Set(20)), StepOutcome::Clamped { requested: 20, committed: 12 });
/// assert_eq!(sides.value(), 12);
/// ```
pub struct NumericStepper {
    min: i64,
    max: i64,
    step: i64,
    color: Option<Rgb>,
    source: Source,
    phase: StepperPhase,
    adjusting: bool,
    redraw: Cell<bool>,
}

impl NumericStepper {
    /// Create a stepper from content configuration.
    ///
    /// Bound steppers subscribe to their key now and unsubscribe when dropped.
    /// Inverted bounds are swapped.
    pub fn mount(config: &StepperConfig, store: &VariableStore) -> Self {
        let (min, max) = if config.min > config.max {
            warn!(
                min = config.min,
                max = config.max,
                "stepper bounds are inverted, swapping"
            );
            (config.max, config.min)
        } else {
            (config.min, config.max)
        };
        let initial = config.initial.clamp(min, max);
        let source = match &config.key {
            Some(key) => Source::Bound(VariableBinding::new(store, key, initial)),
            None => Source::Local(Cell::new(initial)),
        };
        debug!(key = ?config.key, min, max, initial, "mounted stepper");
        Self {
            min,
            max,
            step: config.step.max(1),
            color: config.color,
            source,
            phase: StepperPhase::Idle,
            adjusting: false,
            redraw: Cell::new(false),
        }
    }

    /// The displayed value, always within bounds.
    #[must_use]
    pub fn value(&self) -> i64 {
        let raw = match &self.source {
            Source::Local(v) => v.get(),
            Source::Bound(binding) => binding.get(),
        };
        raw.clamp(self.min, self.max)
    }

    #[must_use]
    pub const fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    #[must_use]
    pub const fn phase(&self) -> StepperPhase {
        self.phase
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match &self.source {
            Source::Bound(binding) => Some(binding.key()),
            Source::Local(_) => None,
        }
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self.source, Source::Bound(_))
    }

    /// Write handle for the bound key, if bound.
    #[must_use]
    pub fn setter(&self) -> Option<Setter<i64>> {
        match &self.source {
            Source::Bound(binding) => Some(binding.setter()),
            Source::Local(_) => None,
        }
    }

    pub fn apply(&mut self, action: StepperAction) -> StepOutcome {
        match action {
            StepperAction::Increment => self.request(self.value().saturating_add(self.step)),
            StepperAction::Decrement => self.request(self.value().saturating_sub(self.step)),
            StepperAction::Set(v) => self.request(v),
            StepperAction::BeginAdjust => {
                self.adjusting = true;
                self.phase = StepperPhase::Adjusting;
                StepOutcome::Unchanged
            }
            StepperAction::EndAdjust => {
                self.adjusting = false;
                self.phase = StepperPhase::Idle;
                StepOutcome::Unchanged
            }
        }
    }

    /// Direct entry. Text that is not an integer is ignored.
    pub fn enter_text(&mut self, text: &str) -> StepOutcome {
        match text.trim().parse::<i64>() {
            Ok(v) => self.request(v),
            Err(_) => {
                debug!(text, "ignoring non-numeric stepper entry");
                StepOutcome::Unchanged
            }
        }
    }

    /// Whether the stepper needs re-rendering, clearing the flag.
    ///
    /// Bound steppers also report writes made by other observers of the key.
    pub fn take_redraw(&self) -> bool {
        let local = self.redraw.replace(false);
        let remote = match &self.source {
            Source::Bound(binding) => binding.take_changed(),
            Source::Local(_) => false,
        };
        local || remote
    }

    fn request(&mut self, requested: i64) -> StepOutcome {
        let committed = requested.clamp(self.min, self.max);
        match &self.source {
            Source::Local(v) => v.set(committed),
            Source::Bound(binding) => binding.set(committed),
        }
        self.redraw.set(true);

        if committed == requested {
            self.phase = if self.adjusting {
                StepperPhase::Adjusting
            } else {
                StepperPhase::Idle
            };
            StepOutcome::Committed(committed)
        } else {
            self.phase = StepperPhase::Clamped;
            StepOutcome::Clamped {
                requested,
                committed,
            }
        }
    }
}

impl Widget for NumericStepper {
    fn render(&self, _scope: &AnnotationScope, line: &mut Line) {
        let accent = self.color.map_or(Style::new(), |c| Style::new().fg(c));
        let dec = if self.value() > self.min { "‹" } else { " " };
        let inc = if self.value() < self.max { "›" } else { " " };
        line.push(Segment::styled(dec, accent));
        line.push(Segment::styled(self.value().to_string(), accent.bold()));
        line.push(Segment::styled(inc, accent));
    }
}

impl fmt::Debug for NumericStepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericStepper")
            .field("key", &self.key())
            .field("value", &self.value())
            .field("min", &self.min)
            .field("max", &self.max)
            .field("phase", &self.phase)
            .finish()
    }
}
