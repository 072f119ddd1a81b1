//! Property tests for series invariants.
//!
//! Uses proptest to verify:
//! 1. Watermark arithmetic: binary = max, rolling = wm + w - 1, shift/diff = wm + k
//! 2. Sentinel containment: undefined before the watermark, defined after it
//! 3. Seed values on constant input, and early or delayed seeds on lagged input
//! 4. Schema merge idempotence

use proptest::prelude::*;
use talines_core::schema::{merge_field, FieldDecl, FieldSchema};
use talines_core::{Decay, Seed, Series};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0..1000.0_f64, 1..80)
}

fn arb_series() -> impl Strategy<Value = Series> {
    (arb_values(), 1..6_usize).prop_map(|(values, wm)| Series::new("x", values).with_watermark(wm))
}

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,6}", 1..6).prop_map(|s| s.into_iter().collect())
}

fn contained(s: &Series) -> bool {
    let cut = s.min_index().min(s.len());
    s.values()[..cut].iter().all(|v| v.is_nan()) && s.values()[cut..].iter().all(|v| !v.is_nan())
}

// ── 1. Watermark arithmetic ──────────────────────────────────────────

proptest! {
    #[test]
    fn binary_takes_the_larger_watermark(a in arb_series(), k in 0..5_usize) {
        let b = Series::new("y", vec![1.0; a.len()]).shift(k);
        let c = &a + &b;
        prop_assert_eq!(c.watermark(), a.watermark().max(b.watermark()));
    }

    #[test]
    fn rolling_adds_window_minus_one(a in arb_series(), w in 1..10_usize) {
        prop_assert_eq!(a.rolling(w).mean().watermark(), a.watermark() + w - 1);
        prop_assert_eq!(a.rolling(w).max().watermark(), a.watermark() + w - 1);
    }

    #[test]
    fn lookback_ops_add_k(a in arb_series(), k in 0..10_usize) {
        prop_assert_eq!(a.shift(k).watermark(), a.watermark() + k);
        prop_assert_eq!(a.diff(k).watermark(), a.watermark() + k);
    }
}

// ── 2. Sentinel containment ──────────────────────────────────────────

proptest! {
    #[test]
    fn operations_keep_sentinel_before_watermark(a in arb_series(), w in 1..8_usize, k in 0..8_usize) {
        prop_assert!(contained(&a));
        prop_assert!(contained(&a.rolling(w).sum()));
        prop_assert!(contained(&a.shift(k)));
        prop_assert!(contained(&a.diff(k)));
        prop_assert!(contained(&a.abs().cumsum()));
        prop_assert!(contained(&a.ewm(Decay::Span(w)).mean()));
    }

    #[test]
    fn zero_fill_has_no_sentinel(a in arb_series(), w in 1..8_usize) {
        let y = a.ewm(Decay::Span(w)).seed(Seed::ZeroFill).mean();
        prop_assert_eq!(y.watermark(), 1);
        prop_assert!(y.values().iter().all(|v| !v.is_nan()));
    }
}

// ── 3. Seeds on constant input ───────────────────────────────────────

proptest! {
    #[test]
    fn seeds_on_constant_input(c in -100.0..100.0_f64, len in 10..40_usize, w in 1..8_usize) {
        let x = Series::new("x", vec![c; len]);
        let anchor = w - 1;
        let avg = x.ewm(Decay::Span(w)).seed(Seed::Average).mean();
        let last = x.ewm(Decay::Span(w)).seed(Seed::Last).mean();
        let sum = x.ewm(Decay::Span(w)).seed(Seed::Sum).mean();
        let zero = x.ewm(Decay::Span(w)).seed(Seed::Zero).mean();
        prop_assert!((avg[anchor] - c).abs() < 1e-9);
        prop_assert!((last[anchor] - c).abs() < 1e-9);
        prop_assert!((sum[anchor] - c * w as f64).abs() < 1e-9);
        prop_assert_eq!(zero[anchor], 0.0);
        prop_assert_eq!(avg.watermark(), w);
    }

    #[test]
    fn early_and_delayed_seeds_stay_defined(
        a in arb_series(),
        k in 1..5_usize,
        w in 2..8_usize,
        extra in 0..4_usize,
    ) {
        let moves = a.diff(k);
        for seed in [Seed::Average, Seed::Sum, Seed::Last] {
            let early = moves.ewm(Decay::Span(w)).seed(seed).pearly(true).mean();
            prop_assert!(contained(&early), "pearly {:?}", seed);
            prop_assert_eq!(early.watermark(), moves.watermark() + w - 2);

            let delayed = moves.ewm(Decay::Span(w)).seed(seed).poffset(w + extra).lfilter(1.0, 0.5);
            prop_assert!(contained(&delayed), "poffset {:?}", seed);
            prop_assert_eq!(delayed.watermark(), moves.watermark() + w + extra - 1);
        }
    }
}

// ── 4. Schema merge ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn extending_with_parent_names_is_idempotent(names in arb_names()) {
        let parent = FieldSchema::new(names.clone());
        let merged = merge_field("x", "outputs", &parent, &FieldDecl::Extend(names)).unwrap();
        prop_assert_eq!(merged, parent);
    }

    #[test]
    fn override_aliases_every_dropped_name(names in arb_names()) {
        let parent = FieldSchema::new(names.clone());
        let renamed: Vec<String> = names.iter().map(|n| format!("{n}_new")).collect();
        let decl = FieldDecl::Override(renamed.iter().map(|n| n.as_str().into()).collect());
        let merged = merge_field("x", "outputs", &parent, &decl).unwrap();
        for (old, new) in names.iter().zip(&renamed) {
            prop_assert_eq!(merged.resolve(old), Some(new.as_str()));
        }
    }
}
