//! Simulation output types.
//!
//! Per-period magnitudes are normalized to monthly equivalents regardless of
//! the configured step size, so series produced with different step sizes
//! plot on the same axes. All output values are immutable; the consumer only
//! reads them.

use serde::{Deserialize, Serialize};

/// One simulated period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Time since simulation start, in years.
    pub time: f64,
    /// Remaining balance at the start of the period.
    pub balance: f64,
    /// Monthly-equivalent payment.
    pub payment: f64,
    /// Monthly-equivalent amortization.
    pub amortization: f64,
    /// Monthly-equivalent interest.
    pub interest: f64,
    /// Monthly-equivalent fees.
    pub fees: f64,
}

impl DataPoint {
    pub const ZERO: DataPoint = DataPoint {
        time: 0.0,
        balance: 0.0,
        payment: 0.0,
        amortization: 0.0,
        interest: 0.0,
        fees: 0.0,
    };
}

/// Time to payoff for one swept payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub time: f64,
    pub payment: f64,
}

/// Summary of one swept interest rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestPoint {
    pub interest: f64,
    /// Largest monthly-equivalent payment observed over the run.
    pub max_payment: f64,
    /// Total interest paid as a fraction of the original balance.
    pub interest_proportion: f64,
}

/// Summary of one swept starting balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub balance: f64,
    /// Largest monthly-equivalent payment observed over the run.
    pub max_payment: f64,
}

/// Interest sweep results for one rate-change delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedInterestSeries {
    /// Years before the swept rate replaces the configured one.
    pub delay: f64,
    pub points: Vec<InterestPoint>,
}

/// Why a stepping run stopped. Diagnostic only; it does not change the
/// emitted point stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The configured end time was reached.
    EndTime,
    /// The balance dropped below zero while ending at zero was requested.
    PaidOff,
    /// The payment could not cover interest, fees and minimum amortization,
    /// and clamping was not allowed.
    InsufficientPayment,
}

/// One run's point sequence plus every standard sweep, ready for a plotting
/// consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub points: Vec<DataPoint>,
    pub year_points: Vec<YearPoint>,
    /// One interest curve per rate-change delay.
    pub interest_curves: Vec<DelayedInterestSeries>,
    pub interest_proportion_points: Vec<InterestPoint>,
    pub balance_points: Vec<BalancePoint>,
}

impl SimulationReport {
    pub fn empty() -> Self {
        SimulationReport::default()
    }
}
