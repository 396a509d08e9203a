//! Black–Scholes delta estimate.
//!
//! d1 = [ln(S/K) + (r + σ²/2)T] / (σ√T)
//! Φ(x) = 0.5 · (1 + erf(x/√2))
//! Call delta = Φ(d1), Put delta = Φ(d1) − 1
//!
//! Degenerate inputs (T ≤ 0, σ ≤ 0, non-positive prices, non-finite values)
//! yield a neutral delta of 0.0 rather than NaN.

use crate::domain::option::OptionType;
use statrs::function::erf::erf;
use std::f64::consts::SQRT_2;

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Standard normal CDF via the error function.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

pub fn d1(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

pub fn delta(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
) -> f64 {
    let inputs = [spot, strike, time, rate, vol];
    if inputs.iter().any(|v| !v.is_finite()) || time <= 0.0 || vol <= 0.0 {
        return 0.0;
    }
    if spot <= 0.0 || strike <= 0.0 {
        return 0.0;
    }

    let cdf = norm_cdf(d1(spot, strike, time, rate, vol));
    match option_type {
        OptionType::Call => cdf,
        OptionType::Put => cdf - 1.0,
    }
}

/// Year fraction for a whole number of calendar days.
pub fn year_fraction(days: i64) -> f64 {
    days as f64 / DAYS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn atm_call_delta_above_half() {
        let call = delta(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call);
        assert!(call > 0.5 && call < 0.7, "call delta {}", call);
    }

    #[test]
    fn atm_put_is_call_minus_one() {
        let call = delta(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call);
        let put = delta(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Put);
        assert_abs_diff_eq!(put, call - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn known_d1_value() {
        // ln(1) + (0.05 + 0.02) * 1 / 0.2 = 0.35
        assert_abs_diff_eq!(d1(100.0, 100.0, 1.0, 0.05, 0.2), 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(
            delta(100.0, 100.0, 1.0, 0.05, 0.2, OptionType::Call),
            0.636_830_651,
            epsilon = 1e-6
        );
    }

    #[test]
    fn negative_time_is_zero() {
        assert_eq!(delta(100.0, 100.0, -1.0, 0.05, 0.2, OptionType::Call), 0.0);
        assert_eq!(delta(100.0, 100.0, 0.0, 0.05, 0.2, OptionType::Put), 0.0);
    }

    #[test]
    fn non_positive_vol_is_zero() {
        assert_eq!(delta(100.0, 100.0, 1.0, 0.05, 0.0, OptionType::Call), 0.0);
        assert_eq!(delta(100.0, 100.0, 1.0, 0.05, -0.3, OptionType::Put), 0.0);
    }

    #[test]
    fn nan_inputs_are_zero() {
        assert_eq!(delta(f64::NAN, 100.0, 1.0, 0.05, 0.2, OptionType::Call), 0.0);
        assert_eq!(delta(100.0, 0.0, 1.0, 0.05, 0.2, OptionType::Call), 0.0);
    }

    #[test]
    fn deep_otm_call_near_zero() {
        let call = delta(100.0, 300.0, 30.0 / 365.0, 0.045, 0.3, OptionType::Call);
        assert!(call < 1e-6);
    }

    #[test]
    fn norm_cdf_symmetry() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.0) + norm_cdf(-1.0), 1.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn call_put_parity(
            spot in 1.0f64..1000.0,
            strike in 1.0f64..1000.0,
            time in 0.001f64..3.0,
            rate in -0.02f64..0.15,
            vol in 0.01f64..2.0,
        ) {
            let call = delta(spot, strike, time, rate, vol, OptionType::Call);
            let put = delta(spot, strike, time, rate, vol, OptionType::Put);
            prop_assert!((call - put - 1.0).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&call));
            prop_assert!((-1.0..=0.0).contains(&put));
        }

        #[test]
        fn degenerate_time_always_zero(
            spot in 1.0f64..1000.0,
            strike in 1.0f64..1000.0,
            time in -5.0f64..=0.0,
            vol in 0.01f64..2.0,
        ) {
            prop_assert_eq!(delta(spot, strike, time, 0.045, vol, OptionType::Call), 0.0);
            prop_assert_eq!(delta(spot, strike, time, 0.045, vol, OptionType::Put), 0.0);
        }
    }
}
