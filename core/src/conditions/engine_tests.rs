//! Tests for the condition engine.
//!
//! Covers the probe/consume split, combo short-circuiting, and the
//! structural fault paths (missing children, cycles, bad regions).

use std::time::{Duration, Instant};

use keyrota_types::{ComboType, Region, Rgb};

use crate::testutil::ScriptedSampler;

use super::definitions::{ConditionDefinition, ConditionKind};
use super::engine::{ConditionEngine, EvalError};

fn region(n: i32) -> Region {
    Region::new(n, 0, n + 10, 10)
}

fn color_match(id: &str, region: Region, target: Rgb, tolerance: f32) -> ConditionDefinition {
    ConditionDefinition {
        id: id.to_string(),
        enabled: true,
        kind: ConditionKind::ColorMatch { region, target_color: target, tolerance },
    }
}

fn interval(id: &str, interval_secs: f32, initial_delay_secs: f32) -> ConditionDefinition {
    ConditionDefinition {
        id: id.to_string(),
        enabled: true,
        kind: ConditionKind::TimeInterval { interval_secs, initial_delay_secs },
    }
}

fn combo(id: &str, combo_type: ComboType, children: &[&str]) -> ConditionDefinition {
    ConditionDefinition {
        id: id.to_string(),
        enabled: true,
        kind: ConditionKind::Combo {
            combo_type,
            children: children.iter().map(|c| c.to_string()).collect(),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ColorMatch
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn color_match_within_tolerance() {
    let sampler = ScriptedSampler::new();
    sampler.set_color(region(0), Rgb(110, 95, 105));

    let engine = ConditionEngine::new(
        vec![color_match("c", region(0), Rgb(100, 100, 100), 20.0)],
        Instant::now(),
    );
    assert_eq!(engine.probe("c", Instant::now(), &sampler).unwrap(), true);
}

#[test]
fn color_match_outside_tolerance() {
    let sampler = ScriptedSampler::new();
    sampler.set_color(region(0), Rgb(150, 150, 150));

    let engine = ConditionEngine::new(
        vec![color_match("c", region(0), Rgb(100, 100, 100), 20.0)],
        Instant::now(),
    );
    assert_eq!(engine.probe("c", Instant::now(), &sampler).unwrap(), false);
}

#[test]
fn degenerate_region_is_a_structural_fault() {
    let sampler = ScriptedSampler::new();
    let engine = ConditionEngine::new(
        vec![color_match("c", Region::new(5, 5, 5, 20), Rgb(0, 0, 0), 20.0)],
        Instant::now(),
    );
    assert!(matches!(
        engine.probe("c", Instant::now(), &sampler),
        Err(EvalError::DegenerateRegion { .. })
    ));
    // The sampler is never touched for a degenerate region.
    assert_eq!(sampler.sample_count(), 0);
}

#[test]
fn capture_failure_surfaces_as_fault() {
    let sampler = ScriptedSampler::new();
    sampler.fail_all(true);
    let engine = ConditionEngine::new(
        vec![color_match("c", region(0), Rgb(0, 0, 0), 20.0)],
        Instant::now(),
    );
    assert!(matches!(
        engine.probe("c", Instant::now(), &sampler),
        Err(EvalError::Capture { .. })
    ));
}

#[test]
fn disabled_condition_is_false() {
    let sampler = ScriptedSampler::new();
    let mut def = color_match("c", region(0), Rgb(0, 0, 0), 255.0);
    def.enabled = false;
    let engine = ConditionEngine::new(vec![def], Instant::now());
    assert_eq!(engine.probe("c", Instant::now(), &sampler).unwrap(), false);
}

#[test]
fn unknown_condition_is_a_fault() {
    let engine = ConditionEngine::new(vec![], Instant::now());
    assert!(matches!(
        engine.probe("nope", Instant::now(), &ScriptedSampler::new()),
        Err(EvalError::UnknownCondition(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// TimeInterval: pure probe / explicit consume
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn interval_waits_for_initial_delay() {
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let engine = ConditionEngine::new(vec![interval("i", 10.0, 5.0)], t0);

    assert!(!engine.probe("i", t0, &sampler).unwrap());
    assert!(!engine.probe("i", t0 + Duration::from_secs_f32(4.9), &sampler).unwrap());
    // Boundary inclusive.
    assert!(engine.probe("i", t0 + Duration::from_secs(5), &sampler).unwrap());
}

#[test]
fn probing_does_not_consume() {
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let engine = ConditionEngine::new(vec![interval("i", 10.0, 0.0)], t0);

    let later = t0 + Duration::from_secs(1);
    for _ in 0..5 {
        assert!(engine.probe("i", later, &sampler).unwrap());
    }
}

#[test]
fn consume_advances_the_interval() {
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let mut engine = ConditionEngine::new(vec![interval("i", 10.0, 0.0)], t0);

    let t1 = t0 + Duration::from_secs(1);
    assert!(engine.probe("i", t1, &sampler).unwrap());
    engine.consume("i", t1);

    assert!(!engine.probe("i", t1, &sampler).unwrap());
    assert!(!engine.probe("i", t1 + Duration::from_secs_f32(9.9), &sampler).unwrap());
    assert!(engine.probe("i", t1 + Duration::from_secs(10), &sampler).unwrap());
}

#[test]
fn swap_preserves_interval_state() {
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let mut engine = ConditionEngine::new(vec![interval("i", 10.0, 0.0)], t0);

    let t1 = t0 + Duration::from_secs(1);
    engine.consume("i", t1);

    // Re-load the same id plus an unrelated new condition.
    engine.swap_definitions(
        vec![interval("i", 10.0, 0.0), interval("j", 5.0, 0.0)],
        t1 + Duration::from_secs(2),
    );

    // "i" keeps its last_fire from before the swap.
    assert!(!engine.probe("i", t1 + Duration::from_secs(5), &sampler).unwrap());
    assert!(engine.probe("i", t1 + Duration::from_secs(10), &sampler).unwrap());
}

// ─────────────────────────────────────────────────────────────────────────────
// Combos
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_combos_never_fire() {
    let sampler = ScriptedSampler::new();
    let engine = ConditionEngine::new(
        vec![combo("and", ComboType::And, &[]), combo("or", ComboType::Or, &[])],
        Instant::now(),
    );
    assert!(!engine.probe("and", Instant::now(), &sampler).unwrap());
    assert!(!engine.probe("or", Instant::now(), &sampler).unwrap());
}

#[test]
fn and_requires_all_children() {
    let sampler = ScriptedSampler::new();
    sampler.set_color(region(0), Rgb(10, 10, 10));
    sampler.set_color(region(100), Rgb(10, 10, 10));

    let engine = ConditionEngine::new(
        vec![
            color_match("a", region(0), Rgb(10, 10, 10), 5.0),
            color_match("b", region(100), Rgb(10, 10, 10), 5.0),
            combo("both", ComboType::And, &["a", "b"]),
        ],
        Instant::now(),
    );
    assert!(engine.probe("both", Instant::now(), &sampler).unwrap());

    sampler.set_color(region(100), Rgb(200, 200, 200));
    assert!(!engine.probe("both", Instant::now(), &sampler).unwrap());
}

#[test]
fn and_short_circuits_on_first_false() {
    let sampler = ScriptedSampler::new();
    // First child false, second would be true.
    sampler.set_color(region(0), Rgb(200, 200, 200));
    sampler.set_color(region(100), Rgb(10, 10, 10));

    let engine = ConditionEngine::new(
        vec![
            color_match("a", region(0), Rgb(10, 10, 10), 5.0),
            color_match("b", region(100), Rgb(10, 10, 10), 5.0),
            combo("both", ComboType::And, &["a", "b"]),
        ],
        Instant::now(),
    );
    assert!(!engine.probe("both", Instant::now(), &sampler).unwrap());
    // Only the first child was ever sampled.
    assert_eq!(sampler.sample_count(), 1);
}

#[test]
fn or_short_circuits_on_first_true() {
    let sampler = ScriptedSampler::new();
    sampler.set_color(region(0), Rgb(10, 10, 10));

    let engine = ConditionEngine::new(
        vec![
            color_match("a", region(0), Rgb(10, 10, 10), 5.0),
            color_match("b", region(100), Rgb(10, 10, 10), 5.0),
            combo("either", ComboType::Or, &["a", "b"]),
        ],
        Instant::now(),
    );
    assert!(engine.probe("either", Instant::now(), &sampler).unwrap());
    assert_eq!(sampler.sample_count(), 1);
}

#[test]
fn missing_child_is_a_fault() {
    let engine = ConditionEngine::new(
        vec![combo("c", ComboType::And, &["ghost"])],
        Instant::now(),
    );
    assert!(matches!(
        engine.probe("c", Instant::now(), &ScriptedSampler::new()),
        Err(EvalError::UnresolvedChild { .. })
    ));
}

#[test]
fn nested_combos_evaluate() {
    let sampler = ScriptedSampler::new();
    sampler.set_color(region(0), Rgb(10, 10, 10));

    let engine = ConditionEngine::new(
        vec![
            color_match("leaf", region(0), Rgb(10, 10, 10), 5.0),
            combo("inner", ComboType::Or, &["leaf"]),
            combo("outer", ComboType::And, &["inner"]),
        ],
        Instant::now(),
    );
    assert!(engine.probe("outer", Instant::now(), &sampler).unwrap());
}

#[test]
fn self_reference_is_rejected() {
    let engine = ConditionEngine::new(
        vec![combo("me", ComboType::And, &["me"])],
        Instant::now(),
    );
    assert!(matches!(
        engine.probe("me", Instant::now(), &ScriptedSampler::new()),
        Err(EvalError::RecursionLimit(_))
    ));
}

#[test]
fn indirect_cycle_is_rejected() {
    let engine = ConditionEngine::new(
        vec![
            combo("a", ComboType::And, &["b"]),
            combo("b", ComboType::Or, &["a"]),
        ],
        Instant::now(),
    );
    assert!(matches!(
        engine.probe("a", Instant::now(), &ScriptedSampler::new()),
        Err(EvalError::RecursionLimit(_))
    ));
}

#[test]
fn shared_child_is_not_a_cycle() {
    // Diamond: top -> (left, right) -> leaf. The leaf appears twice but
    // never on the same evaluation path.
    let sampler = ScriptedSampler::new();
    sampler.set_color(region(0), Rgb(10, 10, 10));

    let engine = ConditionEngine::new(
        vec![
            color_match("leaf", region(0), Rgb(10, 10, 10), 5.0),
            combo("left", ComboType::And, &["leaf"]),
            combo("right", ComboType::And, &["leaf"]),
            combo("top", ComboType::And, &["left", "right"]),
        ],
        Instant::now(),
    );
    assert!(engine.probe("top", Instant::now(), &sampler).unwrap());
}

#[test]
fn consume_skips_intervals_that_were_not_due() {
    // OR combo: "fast" is due, "slow" is still in its initial delay.
    // Firing on the combo must advance only the interval that actually
    // made it true; "slow" keeps its original schedule.
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let mut engine = ConditionEngine::new(
        vec![
            interval("fast", 1.0, 0.0),
            interval("slow", 10.0, 5.0),
            combo("either", ComboType::Or, &["fast", "slow"]),
        ],
        t0,
    );

    let t1 = t0 + Duration::from_secs(1);
    assert!(engine.probe("either", t1, &sampler).unwrap());
    engine.consume("either", t1);

    assert!(!engine.probe("fast", t1, &sampler).unwrap());
    // "slow" still opens at t0 + 5s, not t1 + 10s.
    assert!(engine.probe("slow", t0 + Duration::from_secs(5), &sampler).unwrap());
}

#[test]
fn absurd_interval_clamps_instead_of_panicking() {
    // A finite value too large for Duration must behave as "never due
    // again" after the first consume, not panic the evaluating thread.
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let mut engine = ConditionEngine::new(vec![interval("huge", 1e20, 0.0)], t0);

    assert!(engine.probe("huge", t0, &sampler).unwrap());
    engine.consume("huge", t0);
    assert!(!engine.probe("huge", t0 + Duration::from_secs(3600), &sampler).unwrap());
}

#[test]
fn consume_reaches_intervals_inside_combos() {
    let sampler = ScriptedSampler::new();
    let t0 = Instant::now();
    let mut engine = ConditionEngine::new(
        vec![interval("i", 10.0, 0.0), combo("wrap", ComboType::And, &["i"])],
        t0,
    );

    let t1 = t0 + Duration::from_secs(1);
    assert!(engine.probe("wrap", t1, &sampler).unwrap());
    engine.consume("wrap", t1);
    assert!(!engine.probe("wrap", t1, &sampler).unwrap());
}
