//! # Financial Equations
//!
//! Pure formula functions used by the calculators. Keeping them in one place
//! lets each be checked against textbook values in isolation.
//!
//! ## Modules
//!
//! - [`growth`] - Closed-form compound growth (lump sum, annuities, derived rates)
//! - [`simulation`] - Month-by-month goal seeking with a hard cap
//!
//! ## Conventions
//!
//! - **Rates**: fractions (`0.07`), never percent
//! - **Horizons**: years as `f64`; simulations count whole months
//! - **Zero rate**: every formula has an explicit `r == 0` branch

pub mod growth;
pub mod simulation;

pub use growth::{
    after_tax,
    annuity_payment,
    daily_earnings,
    effective_annual_rate,
    fv_annuity,
    fv_lump_sum,
    growth_factor,
    inflation_adjusted,
    per_period_payment,
    periodic_rate,
    rule_of_72,
    simple_interest,
    simple_interest_on_deposits,
    PaymentTiming,
};

pub use simulation::{simulate, Goal, SimulationOutcome};
