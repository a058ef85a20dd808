//! Property-based invariant tests for easing curves and tweens.
//!
//! 1. Presets map `[0, 1]` into `[0, 1]` and are monotone non-decreasing.
//! 2. Any input, including out-of-range ones, yields a finite value.
//! 3. A tween sample always lies between its endpoints, for every preset
//!    and for custom curves that overshoot.
//! 4. A tween sample at or past its duration is exactly the target.

use std::time::Duration;

use proptest::prelude::*;
use swipebox_core::{Easing, Tween};

// ── Strategies ────────────────────────────────────────────────────────────

fn preset() -> impl Strategy<Value = Easing> {
    prop_oneof![
        Just(Easing::Linear),
        Just(Easing::EaseIn),
        Just(Easing::EaseOut),
        Just(Easing::EaseInOut),
        Just(Easing::EaseOutQuad),
    ]
}

fn overshoot(t: f32) -> f32 {
    t * 1.6 - 0.3
}

fn any_easing() -> impl Strategy<Value = Easing> {
    prop_oneof![4 => preset(), 1 => Just(Easing::Custom(overshoot))]
}

fn endpoint() -> impl Strategy<Value = f32> {
    -2000.0f32..2000.0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn presets_stay_in_unit_range(easing in preset(), t in 0.0f32..=1.0) {
        let v = easing.apply(t);
        prop_assert!((0.0..=1.0).contains(&v), "{:?}({}) = {}", easing, t, v);
    }

    #[test]
    fn presets_are_monotone(easing in preset(), a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(easing.apply(lo) <= easing.apply(hi) + 1e-6);
    }

    #[test]
    fn any_input_is_finite(easing in preset(), t in any::<f32>()) {
        prop_assert!(easing.apply(t).is_finite());
    }

    #[test]
    fn tween_sample_between_endpoints(
        easing in any_easing(),
        from in endpoint(),
        to in endpoint(),
        duration_ms in 1u64..1000,
        elapsed_ms in 0u64..1200,
    ) {
        let tween = Tween::new(from, to, Duration::from_millis(duration_ms)).easing(easing);
        let v = tween.sample(Duration::from_millis(elapsed_ms));
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        prop_assert!(v >= lo && v <= hi, "sample {} outside [{}, {}]", v, lo, hi);
    }

    #[test]
    fn tween_lands_exactly_on_target(
        easing in any_easing(),
        from in endpoint(),
        to in endpoint(),
        duration_ms in 0u64..1000,
        extra_ms in 0u64..500,
    ) {
        let tween = Tween::new(from, to, Duration::from_millis(duration_ms)).easing(easing);
        prop_assert_eq!(tween.sample(Duration::from_millis(duration_ms + extra_ms)), to);
    }
}
