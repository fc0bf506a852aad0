//! Loan amortization simulation under bracketed, time-varying policies.
//!
//! The crate has two halves:
//!
//! - a small threshold-rule language ([`rules`]): ordered rule sets parsed
//!   from text like `"<=100000=0.3;>=100000=0.21"`, evaluated either
//!   first-match-wins or as a progressive-bracket blend;
//! - an iterative amortization simulator ([`simulator`] and [`sweep`]) that
//!   consults those rule sets every period, and sweep operations that vary
//!   payment, interest rate, rate-change delay or starting balance to
//!   produce comparison datasets for a plotting consumer.
//!
//! # Example
//!
//! ```
//! use loansim_core::{SimulationConfig, Simulator, StepOptions};
//!
//! let sim = Simulator::new(SimulationConfig::default());
//! let points: Vec<_> = sim.steps(StepOptions::default()).flatten().collect();
//! assert!(!points.is_empty());
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod model;
pub mod rules;
pub mod simulator;
pub mod sweep;

#[cfg(test)]
mod tests;

pub use config::{RuleText, SimulationConfig, TimeStep};
pub use error::ParseError;
pub use model::{
    BalancePoint, DataPoint, DelayedInterestSeries, InterestPoint, SimulationReport, Termination,
    YearPoint,
};
pub use rules::{Operator, Rule, RuleSet};
pub use simulator::{RateSchedule, Simulator, StepOptions, Steps};
pub use sweep::{BalanceSweep, InterestSweep, YearSweep};
