#![forbid(unsafe_code)]

//! Inline display of a store key's current value.

use folio_runtime::{Value, VariableBinding, VariableStore};
use folio_style::{AnnotationScope, Style};

use crate::Widget;
use crate::line::{Line, Segment};

/// Shows the live value of one key, e.g. `the seed is now 5 petals`.
///
/// The value is rendered with its `Display` form; an unset key shows the
/// fallback. An optional annotation id styles the value through the enclosing
/// scope, falling back to the fixed style when the id resolves plain.
pub struct BoundText {
    binding: VariableBinding<Value>,
    suffix: Option<String>,
    annotation: Option<String>,
    style: Style,
}

impl BoundText {
    pub fn new(store: &VariableStore, key: &str, fallback: impl Into<Value>) -> Self {
        Self {
            binding: VariableBinding::new(store, key, fallback.into()),
            suffix: None,
            annotation: None,
            style: Style::new(),
        }
    }

    /// Text appended after the value, separated by a space.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Style the value like an annotated span with this id.
    #[must_use]
    pub fn annotated(mut self, id: impl Into<String>) -> Self {
        self.annotation = Some(id.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.binding.key()
    }

    #[must_use]
    pub fn value(&self) -> Value {
        self.binding.get()
    }

    /// The rendered text without styling.
    #[must_use]
    pub fn text(&self) -> String {
        let value = self.binding.with(ToString::to_string);
        match &self.suffix {
            Some(suffix) => format!("{value} {suffix}"),
            None => value,
        }
    }

    /// Whether the key changed since the last call, clearing the flag.
    pub fn take_redraw(&self) -> bool {
        self.binding.take_changed()
    }

    fn value_style(&self, scope: &AnnotationScope) -> Style {
        let annotated = self
            .annotation
            .as_deref()
            .map(|id| Style::from(scope.resolve(id)))
            .unwrap_or_default();
        self.style.patch(annotated)
    }
}

impl Widget for BoundText {
    fn render(&self, scope: &AnnotationScope, line: &mut Line) {
        let value = self.binding.with(ToString::to_string);
        line.push(Segment::styled(value, self.value_style(scope)));
        if let Some(suffix) = &self.suffix {
            line.push_raw(format!(" {suffix}"));
        }
    }
}

impl std::fmt::Debug for BoundText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundText")
            .field("key", &self.key())
            .field("text", &self.text())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::{AnnotationRegistry, AnnotationStyle, Rgb, UnderlineStyle};

    #[test]
    fn shows_fallback_until_set() {
        let store = VariableStore::new();
        let text = BoundText::new(&store, "fibonacci_seed", 1_i64).suffix("petals");
        assert_eq!(text.text(), "1 petals");
        assert!(!store.contains("fibonacci_seed"));

        store.set("fibonacci_seed", 5_i64);
        assert_eq!(text.text(), "5 petals");
        assert!(text.take_redraw());
    }

    #[test]
    fn renders_any_value_kind() {
        let store = VariableStore::new();
        store.initialize([(
            "sequence",
            Value::List(vec![Value::Int(1), Value::Int(1), Value::Int(2)]),
        )]);
        let text = BoundText::new(&store, "sequence", Value::List(Vec::new()));
        assert_eq!(text.text(), "[1, 1, 2]");

        store.set("sequence", "none yet".to_string());
        assert_eq!(text.text(), "none yet");
    }

    #[test]
    fn value_segment_takes_annotation_style() {
        let store = VariableStore::new();
        let violet = AnnotationStyle::new(Rgb::new(0x8b, 0x5c, 0xf6), UnderlineStyle::Dotted);
        let scope = AnnotationScope::root().nest(AnnotationRegistry::new([("pi", violet)]));
        let text = BoundText::new(&store, "pi_digits", 3_i64)
            .annotated("pi")
            .style(Style::new().bold())
            .suffix("digits");

        let mut line = Line::new();
        text.render(&scope, &mut line);

        assert_eq!(line.plain_text(), "3 digits");
        let value = &line.segments()[0];
        assert_eq!(value.style.fg, violet.color);
        assert_eq!(value.style.underline, Some(UnderlineStyle::Dotted));
        assert!(value.style.bold);
        assert!(line.segments()[1].style.is_empty());
    }

    #[test]
    fn unresolved_annotation_keeps_fixed_style() {
        let store = VariableStore::new();
        let text = BoundText::new(&store, "k", 0_i64)
            .annotated("missing")
            .style(Style::new().bold());
        let mut line = Line::new();
        text.render(&AnnotationScope::root(), &mut line);
        assert_eq!(line.segments()[0].style, Style::new().bold());
    }
}
