#![forbid(unsafe_code)]

//! The "mathematics in nature" reference lesson.
//!
//! Four paragraphs sharing one annotation registry. The two Fibonacci steppers
//! are both bound to [`FIBONACCI_SEED`], so they must always show the same
//! number.
//!
//! This is a trimmed, code-built copy of the demo's `lessons/nature.toml`:
//! the store keys, defaults, and annotation colors are the same (the demo
//! checks this against [`DEFAULTS`] and [`registry`]), but the prose is
//! shortened and the extra spans and values of the document are left out so
//! assertions stay readable.

use folio_runtime::VariableStore;
use folio_style::{AnnotationRegistry, AnnotationScope, AnnotationStyle, Rgb, UnderlineStyle};
use folio_widgets::{AnnotatedSpan, BoundText, NumericStepper, Paragraph, StepperConfig};

pub const HEXAGON_SIDES: &str = "hexagon_sides";
pub const FIBONACCI_SEED: &str = "fibonacci_seed";
pub const CIRCLE_DIAMETER: &str = "circle_diameter";

pub const AMBER: Rgb = Rgb::new(0xf5, 0x9e, 0x0b);
pub const EMERALD: Rgb = Rgb::new(0x10, 0xb9, 0x81);
pub const VIOLET: Rgb = Rgb::new(0x8b, 0x5c, 0xf6);
pub const PINK: Rgb = Rgb::new(0xec, 0x48, 0x99);
pub const BLUE: Rgb = Rgb::new(0x3b, 0x82, 0xf6);

/// Store defaults seeded when the lesson mounts.
pub const DEFAULTS: [(&str, i64); 3] = [
    (HEXAGON_SIDES, 6),
    (FIBONACCI_SEED, 1),
    (CIRCLE_DIAMETER, 10),
];

/// Annotation styles for the lesson section.
#[must_use]
pub fn registry() -> AnnotationRegistry {
    let dotted = |color| AnnotationStyle::new(color, UnderlineStyle::Dotted);
    AnnotationRegistry::new([
        ("hexagon", dotted(AMBER)),
        ("fibonacci", dotted(EMERALD)),
        ("pi", dotted(VIOLET)),
        ("spiral", dotted(PINK)),
        ("circle", dotted(BLUE)),
    ])
}

/// A mounted lesson: its store, scope, and paragraphs.
#[derive(Debug)]
pub struct Lesson {
    pub store: VariableStore,
    pub scope: AnnotationScope,
    pub paragraphs: Vec<Paragraph>,
}

impl Lesson {
    /// Seed `store` and build the paragraphs against it.
    #[must_use]
    pub fn mount(store: &VariableStore) -> Self {
        store.initialize(DEFAULTS);
        let scope = AnnotationScope::root().nest(registry());

        let intro = Paragraph::new()
            .with("Mathematics is the language of the universe. From the ")
            .with(AnnotatedSpan::new("spiral", "spirals of galaxies"))
            .with(" to the patterns in a sunflower, numbers and shapes reveal the hidden order in nature.");

        let hexagon = Paragraph::new()
            .with("Have you ever wondered why honeybees build ")
            .with(AnnotatedSpan::new("hexagon", "hexagonal cells"))
            .with("? A hexagon has ")
            .with(NumericStepper::mount(
                &StepperConfig::new(6, 3, 12).bound(HEXAGON_SIDES).color(AMBER),
                store,
            ))
            .with(" sides.");

        let seed = StepperConfig::new(1, 1, 10).bound(FIBONACCI_SEED).color(EMERALD);
        let fibonacci = Paragraph::new()
            .with("The ")
            .with(AnnotatedSpan::new("fibonacci", "Fibonacci sequence"))
            .with(" appears everywhere in nature. If you start with ")
            .with(NumericStepper::mount(&seed, store))
            .with(" and ")
            .with(NumericStepper::mount(&seed, store))
            .with(", each number is the sum of the two before it.");

        let circle = Paragraph::new()
            .with(AnnotatedSpan::new("pi", "Pi (π)"))
            .with(" connects a ")
            .with(AnnotatedSpan::new("circle", "circle's circumference"))
            .with(" to its diameter. If a circle has a diameter of ")
            .with(NumericStepper::mount(
                &StepperConfig::new(10, 1, 100).bound(CIRCLE_DIAMETER).color(VIOLET),
                store,
            ))
            .with(" units, its circumference is about ")
            .with(NumericStepper::mount(
                &StepperConfig::new(31, 3, 314).color(BLUE),
                store,
            ))
            .with(" units. The diameter is ")
            .with(BoundText::new(store, CIRCLE_DIAMETER, 10_i64).suffix("units"))
            .with(".");

        Self {
            store: store.clone(),
            scope,
            paragraphs: vec![intro, hexagon, fibonacci, circle],
        }
    }

    /// Paragraph `index`, panicking when out of range.
    ///
    /// # Panics
    ///
    /// Panics if the lesson has no paragraph `index`.
    #[must_use]
    pub fn paragraph(&self, index: usize) -> &Paragraph {
        &self.paragraphs[index]
    }

    /// Mutable paragraph `index`.
    ///
    /// # Panics
    ///
    /// Panics if the lesson has no paragraph `index`.
    pub fn paragraph_mut(&mut self, index: usize) -> &mut Paragraph {
        &mut self.paragraphs[index]
    }

    /// Every paragraph rendered to unstyled text.
    #[must_use]
    pub fn render_plain(&self) -> Vec<String> {
        crate::render_plain(&self.paragraphs, &self.scope)
    }
}
