//! # Month-by-Month Balance Simulation
//!
//! Goal seeking for questions the closed forms cannot answer directly: "how
//! many months until the balance reaches X" and "how long until withdrawals
//! empty the account".
//!
//! Each step applies one month of interest, then the net flow:
//!
//! ```text
//! B(m+1) = B(m)·(1 + i) + flow
//! ```
//!
//! Every loop is bounded by a caller-supplied month cap. The cap comes from
//! the calculator's declared horizon bound, so a goal that cannot be met
//! within the form's own limits stops there and reports `reached == false`.

use serde::{Deserialize, Serialize};

/// Balances within this distance of the target count as reaching it.
const GOAL_EPSILON: f64 = 1e-9;

/// What the simulation is looking for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Goal {
    /// Stop when the balance reaches the target
    ReachAtLeast(f64),
    /// Stop when the balance drops to zero
    Exhaust,
}

/// Result of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Months simulated before stopping
    pub months: u32,

    /// Whether the goal was met within the cap
    pub reached: bool,

    /// Balance when the loop stopped (never negative for `Exhaust`)
    pub final_balance: f64,

    /// Sum of the flows applied
    pub total_flow: f64,

    /// Sum of the interest credited
    pub total_interest: f64,

    /// Balance at the end of each simulated year; a trailing partial year is
    /// included as its own entry
    pub yearly_balances: Vec<f64>,
}

impl SimulationOutcome {
    /// Simulated duration in fractional years
    pub fn years(&self) -> f64 {
        f64::from(self.months) / 12.0
    }
}

fn goal_met(goal: Goal, balance: f64) -> bool {
    match goal {
        Goal::ReachAtLeast(target) => balance + GOAL_EPSILON * target.abs().max(1.0) >= target,
        Goal::Exhaust => balance <= 0.0,
    }
}

/// Run the balance forward one month at a time.
///
/// # Arguments
///
/// * `start` - Opening balance
/// * `monthly_rate` - Interest per month as a fraction
/// * `flow` - Deposit (positive) or withdrawal (negative) applied after interest
/// * `goal` - Stop condition
/// * `cap_months` - Hard upper bound on the loop
pub fn simulate(start: f64, monthly_rate: f64, flow: f64, goal: Goal, cap_months: u32) -> SimulationOutcome {
    let mut outcome = SimulationOutcome {
        months: 0,
        reached: goal_met(goal, start),
        final_balance: start,
        total_flow: 0.0,
        total_interest: 0.0,
        yearly_balances: Vec::new(),
    };
    if outcome.reached {
        return outcome;
    }

    let mut balance = start;
    while outcome.months < cap_months {
        let interest = balance * monthly_rate;
        balance += interest + flow;
        outcome.total_interest += interest;
        outcome.total_flow += flow;
        outcome.months += 1;

        if goal == Goal::Exhaust && balance <= 0.0 {
            // final withdrawal only takes what is left
            outcome.total_flow -= balance;
            balance = 0.0;
        }

        if outcome.months % 12 == 0 {
            outcome.yearly_balances.push(balance);
        }

        if goal_met(goal, balance) {
            outcome.reached = true;
            break;
        }
    }

    if outcome.months % 12 != 0 {
        outcome.yearly_balances.push(balance);
    }
    if !outcome.reached {
        tracing::warn!(cap_months, balance, "simulation stopped at month cap");
    }
    outcome.final_balance = balance;
    outcome
}
