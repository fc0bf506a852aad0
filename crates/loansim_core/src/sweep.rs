//! Parameter sweeps built on the stepping engine.
//!
//! Each sweep clones the base [`SimulationConfig`](crate::SimulationConfig),
//! varies exactly one axis
//! across a linear range, drives a full stepping run per value, and reduces
//! each run to a single summary point. Values whose run never yields a point
//! are silently omitted from the output.
//!
//! With the `parallel` feature (on by default) the runs fan out over rayon.
//! Each iteration owns its config clone, and the ordered collect keeps the
//! output monotonic in the swept parameter either way.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::model::{
    BalancePoint, DelayedInterestSeries, InterestPoint, SimulationReport, YearPoint,
};
use crate::simulator::{RateSchedule, Simulator, StepOptions};

/// Bounds for the payment sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearSweep {
    /// Lowest swept payment. Defaults to the config's minimum viable
    /// payment, see [`SimulationConfig::min_payment`](crate::SimulationConfig::min_payment).
    pub min_payment: Option<f64>,
    /// Highest swept payment. Defaults to the corrected balance spread over
    /// sixty months.
    pub max_payment: Option<f64>,
    pub payment_step: f64,
    pub end_time: f64,
}

impl Default for YearSweep {
    fn default() -> Self {
        YearSweep {
            min_payment: None,
            max_payment: None,
            payment_step: 100.0,
            end_time: 100.0,
        }
    }
}

/// Bounds for the interest-rate sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterestSweep {
    pub min_interest: f64,
    pub max_interest: f64,
    pub interest_step: f64,
    pub end_time: f64,
    pub override_payment: Option<f64>,
    pub override_inflation: Option<f64>,
    /// Years the configured rate stays in effect before the swept rate
    /// replaces it. `None` applies the swept rate from the start.
    pub time_delay: Option<f64>,
}

impl Default for InterestSweep {
    fn default() -> Self {
        InterestSweep {
            min_interest: 0.0,
            max_interest: 0.2,
            interest_step: 0.01,
            end_time: 100.0,
            override_payment: None,
            override_inflation: None,
            time_delay: None,
        }
    }
}

/// Bounds for the starting-balance sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceSweep {
    /// Lower bound as a factor of the configured balance.
    pub min_factor: f64,
    /// Upper bound as a factor of the configured balance.
    pub max_factor: f64,
    /// Step as a fraction of the swept range, not an absolute increment.
    pub step: f64,
    pub end_time: f64,
    pub override_payment: Option<f64>,
    pub override_inflation: Option<f64>,
}

impl Default for BalanceSweep {
    fn default() -> Self {
        BalanceSweep {
            min_factor: 0.0,
            max_factor: 2.0,
            step: 0.01,
            end_time: 100.0,
            override_payment: None,
            override_inflation: None,
        }
    }
}

/// Linearly spaced values in `[min, max)`.
fn linear_range(min: f64, max: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    if step > 0.0 {
        let mut value = min;
        while value < max {
            values.push(value);
            value += step;
        }
    }
    values
}

/// Run one sweep iteration per value, dropping values whose run produced
/// nothing. Collection preserves the input order in both variants.
#[cfg(feature = "parallel")]
fn collect_sweep<T, F>(values: Vec<f64>, run: F) -> Vec<T>
where
    T: Send,
    F: Fn(f64) -> Option<T> + Sync + Send,
{
    values.into_par_iter().filter_map(run).collect()
}

#[cfg(not(feature = "parallel"))]
fn collect_sweep<T, F>(values: Vec<f64>, run: F) -> Vec<T>
where
    F: Fn(f64) -> Option<T>,
{
    values.into_iter().filter_map(run).collect()
}

impl Simulator {
    /// Sweep the payment axis and report the payoff time for every payment
    /// that reaches payoff within `end_time`.
    ///
    /// Runs in strict mode: a payment that ever falls short of required
    /// interest, fees and minimum amortization produces no result.
    pub fn simulate_years(&self, sweep: YearSweep) -> Vec<YearPoint> {
        let min = sweep
            .min_payment
            .unwrap_or_else(|| self.config().min_payment());
        let max = sweep
            .max_payment
            .unwrap_or_else(|| self.config().corrected_balance() / 60.0);
        let payments = linear_range(min, max, sweep.payment_step);

        collect_sweep(payments, |payment| {
            let options = StepOptions {
                end_time: sweep.end_time,
                accumulated_only: true,
                override_payment: Some(payment),
                ..StepOptions::default()
            };

            let Some(point) = self.steps(options).flatten().last() else {
                debug!(payment, "payment does not reach payoff, skipping");
                return None;
            };

            Some(YearPoint {
                time: point.time,
                payment,
            })
        })
    }

    /// Sweep the interest-rate axis. For each rate, report the largest
    /// monthly payment observed and the total interest paid as a fraction
    /// of the original balance.
    ///
    /// With `time_delay` set, each run keeps the configured rate for that
    /// many years before switching to the swept rate.
    pub fn simulate_interest(&self, sweep: InterestSweep) -> Vec<InterestPoint> {
        let mut config = self.config().clone();
        config.inflation = sweep.override_inflation.unwrap_or(config.inflation);
        config.payment = sweep.override_payment.unwrap_or(config.payment);

        let base_rate = self.config().interest;
        let original_balance = self.config().balance;
        let rates = linear_range(sweep.min_interest, sweep.max_interest, sweep.interest_step);

        collect_sweep(rates, move |interest| {
            let mut cfg = config.clone();
            let schedule = match sweep.time_delay {
                Some(delay) => RateSchedule::Stepped {
                    before: base_rate,
                    after: interest,
                    at: delay,
                },
                None => {
                    cfg.interest = interest;
                    RateSchedule::Constant(interest)
                }
            };

            let options = StepOptions {
                end_time: sweep.end_time,
                allow_insufficient_payment: true,
                ..StepOptions::default()
            };

            let mut max_payment: Option<f64> = None;
            let mut total_interest = 0.0;
            for point in Simulator::new(cfg).steps_with_rate(options, schedule).flatten() {
                if max_payment.is_none_or(|max| point.payment > max) {
                    max_payment = Some(point.payment);
                }
                total_interest += point.interest;
            }

            let max_payment = max_payment?;
            Some(InterestPoint {
                interest,
                max_payment,
                interest_proportion: total_interest / original_balance,
            })
        })
    }

    /// Repeat [`Simulator::simulate_interest`] once per rate-change delay.
    pub fn simulate_interest_delayed(
        &self,
        delays: &[f64],
        sweep: InterestSweep,
    ) -> Vec<DelayedInterestSeries> {
        delays
            .iter()
            .map(|&delay| {
                debug!(delay, "sweeping interest with delayed rate change");
                let points = self.simulate_interest(InterestSweep {
                    time_delay: Some(delay),
                    ..sweep
                });
                DelayedInterestSeries { delay, points }
            })
            .collect()
    }

    /// Sweep the starting balance between `balance * min_factor` and
    /// `balance * max_factor`, reporting the largest monthly payment each
    /// balance required.
    pub fn simulate_balance(&self, sweep: BalanceSweep) -> Vec<BalancePoint> {
        let mut config = self.config().clone();
        config.inflation = sweep.override_inflation.unwrap_or(config.inflation);
        config.payment = sweep.override_payment.unwrap_or(config.payment);

        let min = config.balance * sweep.min_factor;
        let max = config.balance * sweep.max_factor;
        let step = (max - min) * sweep.step;
        let balances = linear_range(min, max, step);

        collect_sweep(balances, move |balance| {
            let mut cfg = config.clone();
            cfg.balance = balance;

            let options = StepOptions {
                end_time: sweep.end_time,
                allow_insufficient_payment: true,
                ..StepOptions::default()
            };

            let max_payment = Simulator::new(cfg)
                .steps(options)
                .flatten()
                .map(|point| point.payment)
                .reduce(f64::max)?;

            Some(BalancePoint {
                balance,
                max_payment,
            })
        })
    }

    /// Run the standard suite sequentially and bundle every output series.
    pub fn report(&self, delays: &[f64]) -> SimulationReport {
        debug!(?delays, "building full simulation report");
        SimulationReport {
            points: self.steps(StepOptions::default()).flatten().collect(),
            year_points: self.simulate_years(YearSweep::default()),
            interest_curves: self.simulate_interest_delayed(delays, InterestSweep::default()),
            interest_proportion_points: self.simulate_interest(InterestSweep::default()),
            balance_points: self.simulate_balance(BalanceSweep::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_range_is_half_open() {
        let values = linear_range(0.0, 5.0, 1.0);
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn linear_range_guards_against_degenerate_steps() {
        assert!(linear_range(0.0, 1.0, 0.0).is_empty());
        assert!(linear_range(0.0, 1.0, -1.0).is_empty());
        assert!(linear_range(1.0, 1.0, 0.1).is_empty());
    }
}
