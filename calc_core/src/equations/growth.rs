//! # Compound Growth Formulas
//!
//! Closed-form time-value-of-money equations shared by the financial
//! calculators.
//!
//! ## Notation
//!
//! - `p` = Principal (present value)
//! - `r` = Nominal annual rate as a fraction (`0.07` for 7 %)
//! - `n` = Compounding periods per year
//! - `t` = Horizon in years
//! - `pmt` = Payment per compounding period
//!
//! Rates are fractions everywhere in this module; percent conversion happens
//! in the calculators.

use serde::{Deserialize, Serialize};

/// When a periodic contribution lands within its period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTiming {
    /// Ordinary annuity: deposit at period end
    #[default]
    End,
    /// Annuity due: deposit at period start
    Start,
}

impl PaymentTiming {
    /// Parse the radio value used by the calculator forms
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "start" | "beginning" | "due" => PaymentTiming::Start,
            _ => PaymentTiming::End,
        }
    }
}

/// Rate per compounding period `r/n`
#[inline]
pub fn periodic_rate(r: f64, n: f64) -> f64 {
    r / n
}

/// Growth factor `(1 + r/n)^(n·t)`
#[inline]
pub fn growth_factor(r: f64, n: f64, t: f64) -> f64 {
    (1.0 + r / n).powf(n * t)
}

/// Future value of a lump sum
///
/// # Formula
/// - FV = P(1 + r/n)^(n·t)
#[inline]
pub fn fv_lump_sum(p: f64, r: f64, n: f64, t: f64) -> f64 {
    p * growth_factor(r, n, t)
}

/// Future value of a stream of equal per-period payments
///
/// # Formulas
/// - Ordinary: FV = PMT · [((1 + r/n)^(n·t) − 1) / (r/n)]
/// - Due: ordinary × (1 + r/n)
/// - r = 0: FV = PMT · n·t (linear limit, no geometric series)
pub fn fv_annuity(pmt: f64, r: f64, n: f64, t: f64, timing: PaymentTiming) -> f64 {
    if r == 0.0 {
        return pmt * (n * t);
    }
    let i = periodic_rate(r, n);
    let ordinary = pmt * ((growth_factor(r, n, t) - 1.0) / i);
    match timing {
        PaymentTiming::End => ordinary,
        PaymentTiming::Start => ordinary * (1.0 + i),
    }
}

/// Convert a monthly contribution to the equivalent per-period payment
#[inline]
pub fn per_period_payment(monthly: f64, n: f64) -> f64 {
    monthly * 12.0 / n
}

/// Simple interest `P·r·t`
#[inline]
pub fn simple_interest(p: f64, r: f64, t: f64) -> f64 {
    p * r * t
}

/// Simple interest earned by a series of monthly deposits, each over its
/// own remaining holding period.
///
/// # Formula
/// - Σ PMT · r · (N − m) / 12, one term per deposit month `m`
/// - End timing (m = 1..=N): PMT · r/12 · N(N − 1)/2
/// - Start timing (m = 0..N): PMT · r/12 · N(N + 1)/2
///
/// A start-of-month deposit earns one extra month.
pub fn simple_interest_on_deposits(monthly: f64, r: f64, total_months: u32, timing: PaymentTiming) -> f64 {
    let n = f64::from(total_months);
    let deposit_months = match timing {
        PaymentTiming::End => n * (n - 1.0) / 2.0,
        PaymentTiming::Start => n * (n + 1.0) / 2.0,
    };
    monthly * r / 12.0 * deposit_months
}

/// Effective annual rate `(1 + r/n)^n − 1`
#[inline]
pub fn effective_annual_rate(r: f64, n: f64) -> f64 {
    (1.0 + r / n).powf(n) - 1.0
}

/// Rule-of-72 doubling time in years; `None` when the rate is not positive
#[inline]
pub fn rule_of_72(rate_pct: f64) -> Option<f64> {
    (rate_pct > 0.0).then(|| 72.0 / rate_pct)
}

/// Interest earned per day on a balance, `P·r/365`
#[inline]
pub fn daily_earnings(balance: f64, r: f64) -> f64 {
    balance * r / 365.0
}

/// Purchasing power of `fv` after `t` years of inflation `inflation`
///
/// # Formula
/// - FV_real = FV / (1 + i)^t
#[inline]
pub fn inflation_adjusted(fv: f64, inflation: f64, t: f64) -> f64 {
    fv / (1.0 + inflation).powf(t)
}

/// Value after paying `tax_rate` on the interest portion
#[inline]
pub fn after_tax(fv: f64, interest: f64, tax_rate: f64) -> f64 {
    fv - interest.max(0.0) * tax_rate
}

/// Level payment that amortizes `pv` over `periods` at rate `i` per period
///
/// # Formulas
/// - PMT = PV · i / (1 − (1 + i)^−N)
/// - i = 0: PMT = PV / N
pub fn annuity_payment(pv: f64, i: f64, periods: f64) -> f64 {
    if periods <= 0.0 {
        return 0.0;
    }
    if i == 0.0 {
        return pv / periods;
    }
    pv * i / (1.0 - (1.0 + i).powf(-periods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_lump_sum_monthly() {
        // $10,000 at 7% for 20 years, monthly
        let fv = fv_lump_sum(10_000.0, 0.07, 12.0, 20.0);
        assert!(approx_eq(fv, 40_387.39, 0.01), "fv = {}", fv);
    }

    #[test]
    fn test_zero_rate_annuity_is_exact() {
        assert_eq!(fv_annuity(200.0, 0.0, 12.0, 10.0, PaymentTiming::End), 200.0 * 120.0);
        assert_eq!(fv_annuity(200.0, 0.0, 12.0, 10.0, PaymentTiming::Start), 24_000.0);
    }

    #[test]
    fn test_annuity_due_factor() {
        let ordinary = fv_annuity(100.0, 0.06, 12.0, 5.0, PaymentTiming::End);
        let due = fv_annuity(100.0, 0.06, 12.0, 5.0, PaymentTiming::Start);
        assert!(approx_eq(due, ordinary * 1.005, 1e-9));
    }

    #[test]
    fn test_annuity_known_value() {
        // $200/month, 4.5%, 10 years
        let fv = fv_annuity(200.0, 0.045, 12.0, 10.0, PaymentTiming::End);
        assert!(approx_eq(fv, 30_239.4, 1.0), "fv = {}", fv);
    }

    #[test]
    fn test_per_period_payment() {
        assert_eq!(per_period_payment(100.0, 12.0), 100.0);
        assert_eq!(per_period_payment(100.0, 4.0), 300.0);
        assert_eq!(per_period_payment(100.0, 1.0), 1200.0);
    }

    #[test]
    fn test_simple_interest_on_deposits() {
        // 12 end-of-month deposits of 100 at 12%: Σ_{m=1..12} 100·0.12·(12−m)/12 = 66
        let si = simple_interest_on_deposits(100.0, 0.12, 12, PaymentTiming::End);
        assert!(approx_eq(si, 66.0, 1e-9));
        // start timing: Σ_{m=0..11} → 78
        let si = simple_interest_on_deposits(100.0, 0.12, 12, PaymentTiming::Start);
        assert!(approx_eq(si, 78.0, 1e-9));
        assert_eq!(simple_interest_on_deposits(100.0, 0.12, 0, PaymentTiming::End), 0.0);
        // constant time even at the largest horizon
        assert!(simple_interest_on_deposits(10.0, 0.05, u32::MAX, PaymentTiming::Start).is_finite());
    }

    #[test]
    fn test_effective_rate() {
        let ear = effective_annual_rate(0.07, 12.0);
        assert!(approx_eq(ear, 0.072_290, 1e-6));
        assert!(approx_eq(effective_annual_rate(0.05, 1.0), 0.05, 1e-12));
    }

    #[test]
    fn test_rule_of_72() {
        assert_eq!(rule_of_72(8.0), Some(9.0));
        assert_eq!(rule_of_72(0.0), None);
        assert_eq!(rule_of_72(-2.0), None);
    }

    #[test]
    fn test_inflation_and_tax() {
        assert!(approx_eq(inflation_adjusted(1_100.0, 0.10, 1.0), 1_000.0, 1e-9));
        assert_eq!(after_tax(1_500.0, 500.0, 0.2), 1_400.0);
        assert_eq!(after_tax(900.0, -100.0, 0.2), 900.0);
    }

    #[test]
    fn test_annuity_payment() {
        // $100,000 over 12 months at 0% → 8,333.33
        assert!(approx_eq(annuity_payment(100_000.0, 0.0, 12.0), 8_333.333, 0.001));
        // $200,000 over 360 months at 0.5% → ~1,199.10
        assert!(approx_eq(annuity_payment(200_000.0, 0.005, 360.0), 1_199.10, 0.01));
        assert_eq!(annuity_payment(1_000.0, 0.01, 0.0), 0.0);
    }

    #[test]
    fn test_payment_timing_codes() {
        assert_eq!(PaymentTiming::from_code("start"), PaymentTiming::Start);
        assert_eq!(PaymentTiming::from_code("END"), PaymentTiming::End);
        assert_eq!(PaymentTiming::from_code("whatever"), PaymentTiming::End);
    }

    fn total_fv(p: f64, pmt: f64, r: f64, t: f64) -> f64 {
        fv_lump_sum(p, r, 12.0, t) + fv_annuity(pmt, r, 12.0, t, PaymentTiming::End)
    }

    proptest! {
        #[test]
        fn fv_never_decreases_with_rate(
            p in 0.0f64..1.0e6, pmt in 0.0f64..5_000.0,
            r in 0.0f64..0.2, dr in 0.0f64..0.05, t in 0.0f64..50.0,
        ) {
            prop_assert!(total_fv(p, pmt, r + dr, t) >= total_fv(p, pmt, r, t) * (1.0 - 1e-12));
        }

        #[test]
        fn fv_never_decreases_with_horizon(
            p in 0.0f64..1.0e6, pmt in 0.0f64..5_000.0,
            r in 0.0f64..0.2, t in 0.0f64..50.0, dt in 0.0f64..10.0,
        ) {
            prop_assert!(total_fv(p, pmt, r, t + dt) >= total_fv(p, pmt, r, t) * (1.0 - 1e-12));
        }

        #[test]
        fn deposit_interest_matches_month_by_month_sum(
            pmt in 0.0f64..5_000.0, r in 0.0f64..0.2, months in 0u32..600, start in any::<bool>(),
        ) {
            let timing = if start { PaymentTiming::Start } else { PaymentTiming::End };
            let first = if start { 0 } else { 1 };
            let summed: f64 = (first..first + months)
                .map(|m| pmt * r * f64::from(months - m) / 12.0)
                .sum();
            let closed = simple_interest_on_deposits(pmt, r, months, timing);
            prop_assert!((closed - summed).abs() <= 1e-6 * summed.max(1.0));
        }

        #[test]
        fn fv_never_decreases_with_contribution(
            p in 0.0f64..1.0e6, pmt in 0.0f64..5_000.0, dp in 0.0f64..1_000.0,
            r in 0.0f64..0.2, t in 0.0f64..50.0,
        ) {
            prop_assert!(total_fv(p, pmt + dp, r, t) >= total_fv(p, pmt, r, t) * (1.0 - 1e-12));
        }
    }
}
