//! Property tests for the indicator family.
//!
//! Uses proptest to verify:
//! 1. Bounded oscillators stay within 0..=100
//! 2. Averages of a constant series reproduce the constant
//! 3. Output watermarks follow the declared lookbacks
//! 4. OBV steps by exactly one volume

use proptest::prelude::*;
use talines_core::{kwargs, Series};
use talines_indicators::indicator;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 40..120)
}

/// Highs and lows bracketing each price by a positive margin.
fn arb_bars() -> impl Strategy<Value = [Series; 3]> {
    arb_prices().prop_flat_map(|close| {
        let n = close.len();
        (
            Just(close),
            prop::collection::vec(0.01..5.0_f64, n),
            prop::collection::vec(0.01..5.0_f64, n),
        )
            .prop_map(|(close, up, down)| {
                let high = close.iter().zip(&up).map(|(c, u)| c + u).collect();
                let low = close.iter().zip(&down).map(|(c, d)| c - d).collect();
                [
                    Series::new("high", high),
                    Series::new("low", low),
                    Series::new("close", close),
                ]
            })
    })
}

fn within(series: &Series, lo: f64, hi: f64) -> bool {
    series.valid().iter().all(|v| v.is_nan() || (*v >= lo - 1e-9 && *v <= hi + 1e-9))
}

// ── 1. Bounded oscillators ───────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_bounded(prices in arb_prices(), period in 2..20_usize) {
        let x = Series::new("close", prices);
        let out = indicator("rsi").unwrap().call([&x], kwargs! { "period" => period }).unwrap();
        prop_assert!(within(&out["rsi"], 0.0, 100.0));
    }

    #[test]
    fn stochastic_is_bounded(bars in arb_bars(), period in 2..15_usize) {
        let out = indicator("stochastic").unwrap().call(&bars, kwargs! { "period" => period }).unwrap();
        prop_assert!(within(&out["k"], 0.0, 100.0));
        prop_assert!(within(&out["d"], 0.0, 100.0));
    }

    #[test]
    fn directional_indicators_are_bounded(bars in arb_bars(), period in 2..15_usize) {
        let out = indicator("adx").unwrap().call(&bars, kwargs! { "period" => period }).unwrap();
        prop_assert!(within(&out["adx"], 0.0, 100.0));
    }
}

// ── 2. Constant input ────────────────────────────────────────────────

proptest! {
    #[test]
    fn averages_reproduce_a_constant(c in 1.0..1000.0_f64, period in 1..12_usize) {
        let x = Series::new("close", vec![c; 60]);
        for name in ["sma", "wma", "ema", "smma", "dema", "tema"] {
            let out = indicator(name).unwrap().call([&x], kwargs! { "period" => period }).unwrap();
            let primary = out.primary().unwrap();
            for v in primary.valid() {
                prop_assert!((v - c).abs() < 1e-6 * c.max(1.0), "{name}: {v} != {c}");
            }
        }
    }
}

// ── 3. Watermarks ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn watermarks_follow_lookbacks(prices in arb_prices(), period in 2..10_usize) {
        let x = Series::new("close", prices);
        let wm = |name: &str| {
            indicator(name)
                .unwrap()
                .call([&x], kwargs! { "period" => period })
                .unwrap()
                .watermark()
        };
        prop_assert_eq!(wm("sma"), period);
        prop_assert_eq!(wm("ema"), period);
        prop_assert_eq!(wm("dema"), 2 * period - 1);
        prop_assert_eq!(wm("tema"), 3 * period - 2);
        prop_assert_eq!(wm("rsi"), period + 1);
        prop_assert_eq!(wm("kama"), period + 1);
    }
}

// ── 4. OBV steps ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn obv_moves_by_one_volume(prices in arb_prices(), vol in 1.0..1e6_f64) {
        let x = Series::new("close", prices);
        let volume = Series::new("volume", vec![vol; x.len()]);
        let out = indicator("obv").unwrap().call([&x, &volume], kwargs! {}).unwrap();
        let obv = out["obv"].valid();
        for pair in obv.windows(2) {
            let step = (pair[1] - pair[0]).abs();
            prop_assert!(step < 1e-6 || (step - vol).abs() < 1e-6 * vol);
        }
    }
}
