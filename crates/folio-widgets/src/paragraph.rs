#![forbid(unsafe_code)]

//! Paragraphs of mixed plain text and inline widgets.

use folio_style::AnnotationScope;
use tracing::debug_span;

use crate::Widget;
use crate::annotated::AnnotatedSpan;
use crate::bound_text::BoundText;
use crate::line::Line;
use crate::stepper::NumericStepper;

/// One inline item of a paragraph.
#[derive(Debug)]
pub enum Inline {
    Text(String),
    Span(AnnotatedSpan),
    Stepper(NumericStepper),
    Value(BoundText),
}

impl Widget for Inline {
    fn render(&self, scope: &AnnotationScope, line: &mut Line) {
        match self {
            Self::Text(text) => line.push_raw(text.as_str()),
            Self::Span(span) => span.render(scope, line),
            Self::Stepper(stepper) => stepper.render(scope, line),
            Self::Value(value) => value.render(scope, line),
        }
    }
}

impl From<&str> for Inline {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Inline {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<AnnotatedSpan> for Inline {
    fn from(span: AnnotatedSpan) -> Self {
        Self::Span(span)
    }
}

impl From<NumericStepper> for Inline {
    fn from(stepper: NumericStepper) -> Self {
        Self::Stepper(stepper)
    }
}

impl From<BoundText> for Inline {
    fn from(value: BoundText) -> Self {
        Self::Value(value)
    }
}

/// Ordered inline items rendered as one line of output.
#[derive(Debug, Default)]
pub struct Paragraph {
    inlines: Vec<Inline>,
}

impl Paragraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, inline: impl Into<Inline>) -> Self {
        self.inlines.push(inline.into());
        self
    }

    pub fn push(&mut self, inline: impl Into<Inline>) {
        self.inlines.push(inline.into());
    }

    #[must_use]
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Steppers in reading order.
    pub fn steppers_mut(&mut self) -> impl Iterator<Item = &mut NumericStepper> {
        self.inlines.iter_mut().filter_map(|inline| match inline {
            Inline::Stepper(stepper) => Some(stepper),
            _ => None,
        })
    }

    pub fn steppers(&self) -> impl Iterator<Item = &NumericStepper> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Stepper(stepper) => Some(stepper),
            _ => None,
        })
    }

    /// Whether any live item changed since the last call, clearing every
    /// item's flag.
    pub fn take_redraw(&self) -> bool {
        self.inlines.iter().fold(false, |dirty, inline| {
            let item = match inline {
                Inline::Stepper(stepper) => stepper.take_redraw(),
                Inline::Value(value) => value.take_redraw(),
                Inline::Text(_) | Inline::Span(_) => false,
            };
            dirty | item
        })
    }

    #[must_use]
    pub fn render_line(&self, scope: &AnnotationScope) -> Line {
        let _span = debug_span!("render_paragraph", inlines = self.inlines.len()).entered();
        let mut line = Line::new();
        self.render(scope, &mut line);
        line
    }
}

impl Widget for Paragraph {
    fn render(&self, scope: &AnnotationScope, line: &mut Line) {
        for inline in &self.inlines {
            inline.render(scope, line);
        }
    }
}
