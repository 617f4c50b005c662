#![forbid(unsafe_code)]

//! Folio public facade.
//!
//! Re-exports the runtime, style, and widget crates under one roof. Most
//! documents only need the [`prelude`].
//!
//! ```
//! use folio::prelude::*;
//!
//! let store = VariableStore::new();
//! store.initialize([("hexagon_sides", 6_i64)]);
//!
//! let mut sides = NumericStepper::mount(&StepperConfig::new(6, 3, 12).bound("hexagon_sides"), &store);
//! let label = BoundText::new(&store, "hexagon_sides", 6_i64).suffix("sides");
//!
//! sides.apply(StepperAction::Increment);
//! assert_eq!(label.text(), "7 sides");
//! ```

pub use folio_runtime as runtime;
pub use folio_style as style;
pub use folio_widgets as widgets;

pub use folio_runtime::{
    BindingScope, Setter, StoreValue, Subscription, Value, VariableBinding, VariableStore,
};
#[cfg(feature = "document-config")]
pub use folio_runtime::{ConfigError, VariableDefaults};
pub use folio_style::{
    AnnotationRegistry, AnnotationScope, AnnotationStyle, ColorProfile, Rgb, Style,
    UnderlineStyle,
};
pub use folio_widgets::{
    AnnotatedSpan, BoundText, Inline, Line, NumericStepper, Paragraph, Segment, StepOutcome,
    StepperAction, StepperConfig, StepperPhase, Widget,
};

/// Everything a document author typically touches.
pub mod prelude {
    pub use crate::{
        AnnotatedSpan, AnnotationRegistry, AnnotationScope, AnnotationStyle, BoundText, Line,
        NumericStepper, Paragraph, Rgb, StepOutcome, StepperAction, StepperConfig,
        UnderlineStyle, Value, VariableBinding, VariableStore, Widget,
    };
}
