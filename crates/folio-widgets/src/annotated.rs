#![forbid(unsafe_code)]

//! Text highlighted according to an annotation id.

use folio_style::{AnnotationScope, AnnotationStyle, Style};
use tracing::trace;

use crate::Widget;
use crate::line::{Line, Segment};

/// Inline text whose color and underline come from the nearest registry
/// defining `id`. Undefined ids render as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSpan {
    id: String,
    text: String,
}

impl AnnotatedSpan {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The style this span takes inside `scope`.
    #[must_use]
    pub fn resolve(&self, scope: &AnnotationScope) -> AnnotationStyle {
        let style = scope.resolve(&self.id);
        if style.is_plain() {
            trace!(id = %self.id, "annotation id resolved to plain style");
        }
        style
    }
}

impl Widget for AnnotatedSpan {
    fn render(&self, scope: &AnnotationScope, line: &mut Line) {
        line.push(Segment::styled(
            self.text.as_str(),
            Style::from(self.resolve(scope)),
        ));
    }
}
