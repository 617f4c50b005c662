#![forbid(unsafe_code)]

//! Inline widgets for Folio documents.

pub mod annotated;
pub mod bound_text;
pub mod line;
pub mod paragraph;
pub mod stepper;

pub use annotated::AnnotatedSpan;
pub use bound_text::BoundText;
pub use line::{Line, Segment};
pub use paragraph::{Inline, Paragraph};
pub use stepper::{NumericStepper, StepOutcome, StepperAction, StepperConfig, StepperPhase};

use folio_style::AnnotationScope;

/// A `Widget` renders itself as inline segments of a paragraph line.
///
/// `scope` is the chain of annotation registries enclosing the widget.
pub trait Widget {
    fn render(&self, scope: &AnnotationScope, line: &mut Line);
}
