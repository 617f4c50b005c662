#![forbid(unsafe_code)]

//! Integration tests: controls and text in the reference lesson stay in sync
//! through the shared store.

use folio_harness::lesson::{CIRCLE_DIAMETER, FIBONACCI_SEED, HEXAGON_SIDES, Lesson};
use folio_harness::{CallProbe, assert_plain};
use folio_runtime::{VariableBinding, VariableStore};
use folio_widgets::{NumericStepper, StepOutcome, StepperAction};

fn seed_values(lesson: &Lesson) -> Vec<i64> {
    lesson
        .paragraph(2)
        .steppers()
        .map(NumericStepper::value)
        .collect()
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn fibonacci_steppers_converge() {
    let store = VariableStore::new();
    let mut lesson = Lesson::mount(&store);
    assert_eq!(seed_values(&lesson), vec![1, 1]);

    let first = lesson.paragraph_mut(2).steppers_mut().next();
    assert_eq!(
        first.map(|s| s.apply(StepperAction::Increment)),
        Some(StepOutcome::Committed(2))
    );
    assert_eq!(seed_values(&lesson), vec![2, 2]);

    if let Some(second) = lesson.paragraph_mut(2).steppers_mut().nth(1) {
        second.apply(StepperAction::Set(7));
    }
    assert_eq!(seed_values(&lesson), vec![7, 7]);
    assert_eq!(store.get(FIBONACCI_SEED, 0_i64), 7);
}

#[test]
fn external_write_reaches_every_control() {
    let store = VariableStore::new();
    let lesson = Lesson::mount(&store);

    store.set(FIBONACCI_SEED, 5_i64);
    assert_eq!(seed_values(&lesson), vec![5, 5]);
    assert!(lesson.paragraph(2).take_redraw());
    assert!(!lesson.paragraph(1).take_redraw());
}

#[test]
fn observers_see_one_notification_per_commit() {
    let store = VariableStore::new();
    let mut lesson = Lesson::mount(&store);
    let probe = CallProbe::new();
    let _sub = probe.attach(&store, FIBONACCI_SEED);

    for stepper in lesson.paragraph_mut(2).steppers_mut() {
        stepper.apply(StepperAction::Increment);
    }

    assert_eq!(probe.ints(), vec![2, 3]);
    assert_eq!(seed_values(&lesson), vec![3, 3]);
}

#[test]
fn late_observer_reads_current_value() {
    let store = VariableStore::new();
    let mut lesson = Lesson::mount(&store);
    if let Some(s) = lesson.paragraph_mut(1).steppers_mut().next() {
        s.apply(StepperAction::Set(8));
    }

    let late = VariableBinding::new(&store, HEXAGON_SIDES, 0_i64);
    assert_eq!(late.get(), 8);
}

// ============================================================================
// Clamping through the lesson
// ============================================================================

#[test]
fn hexagon_clamps_at_both_bounds() {
    let store = VariableStore::new();
    let mut lesson = Lesson::mount(&store);
    let Some(hexagon) = lesson.paragraph_mut(1).steppers_mut().next() else {
        panic!("hexagon paragraph has a stepper");
    };

    assert_eq!(
        hexagon.apply(StepperAction::Set(20)),
        StepOutcome::Clamped {
            requested: 20,
            committed: 12
        }
    );
    assert_eq!(store.get(HEXAGON_SIDES, 0_i64), 12);

    assert_eq!(
        hexagon.apply(StepperAction::Set(-1)),
        StepOutcome::Clamped {
            requested: -1,
            committed: 3
        }
    );
    assert_eq!(store.get(HEXAGON_SIDES, 0_i64), 3);
}

#[test]
fn out_of_range_store_value_is_displayed_clamped() {
    let store = VariableStore::new();
    let lesson = Lesson::mount(&store);

    store.set(CIRCLE_DIAMETER, 1_000_i64);
    let diameter = lesson.paragraph(3).steppers().next().map(NumericStepper::value);
    assert_eq!(diameter, Some(100));
    assert_eq!(store.get(CIRCLE_DIAMETER, 0_i64), 1_000);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn renders_initial_lesson() {
    let store = VariableStore::new();
    let lesson = Lesson::mount(&store);

    assert_plain!(
        lesson.paragraph(1),
        lesson.scope,
        "Have you ever wondered why honeybees build hexagonal cells? A hexagon has ‹6› sides."
    );
    assert_plain!(
        lesson.paragraph(2),
        lesson.scope,
        "The Fibonacci sequence appears everywhere in nature. If you start with  1› and  1›, \
         each number is the sum of the two before it."
    );
}

#[test]
fn bound_text_follows_the_diameter_stepper() {
    let store = VariableStore::new();
    let mut lesson = Lesson::mount(&store);
    if let Some(diameter) = lesson.paragraph_mut(3).steppers_mut().next() {
        diameter.apply(StepperAction::Set(42));
    }

    let rendered = lesson.render_plain();
    assert!(
        rendered[3].ends_with("The diameter is 42 units."),
        "got {:?}",
        rendered[3]
    );
}

#[test]
fn local_stepper_does_not_touch_the_store() {
    let store = VariableStore::new();
    let mut lesson = Lesson::mount(&store);
    let keys_before = store.keys();

    if let Some(circumference) = lesson.paragraph_mut(3).steppers_mut().nth(1) {
        assert!(!circumference.is_bound());
        circumference.apply(StepperAction::Set(300));
    }

    assert_eq!(store.keys(), keys_before);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn dropping_the_lesson_releases_every_subscription() {
    let store = VariableStore::new();
    let lesson = Lesson::mount(&store);
    assert_eq!(store.subscriber_count(FIBONACCI_SEED), 2);
    assert_eq!(store.subscriber_count(CIRCLE_DIAMETER), 2);

    drop(lesson);
    for key in [HEXAGON_SIDES, FIBONACCI_SEED, CIRCLE_DIAMETER] {
        assert_eq!(store.subscriber_count(key), 0, "{key} still has subscribers");
    }
    assert_eq!(store.get(FIBONACCI_SEED, 0_i64), 1);
}
