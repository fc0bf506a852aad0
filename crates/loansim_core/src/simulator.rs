//! The iterative amortization engine.
//!
//! [`Simulator::steps`] produces a lazy, finite sequence of per-period
//! [`DataPoint`]s from a [`SimulationConfig`]. Every period the engine
//! consults the interest-deduction schedule (bracket aggregate over the
//! yearly interest amount) and the minimum-amortization schedule (first
//! match over the paydown proportion), then updates balance, payment and
//! fees for the next period. Sweep drivers live in [`crate::sweep`].

use crate::config::SimulationConfig;
use crate::model::{DataPoint, Termination};
use crate::rules::RuleSet;

/// Yearly interest rate as a function of simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateSchedule {
    /// The same nominal rate for the whole run.
    Constant(f64),
    /// `before` until `at` years have elapsed, then `after`. Models a rate
    /// change that lands only after a delay.
    Stepped { before: f64, after: f64, at: f64 },
}

impl RateSchedule {
    pub fn rate_at(&self, time: f64) -> f64 {
        match *self {
            RateSchedule::Constant(rate) => rate,
            RateSchedule::Stepped { before, after, at } => {
                if time < at {
                    before
                } else {
                    after
                }
            }
        }
    }
}

/// Knobs for one stepping run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOptions {
    /// Stop after this many years.
    pub end_time: f64,
    /// Stop once the balance drops below zero.
    pub end_at_zero: bool,
    /// Suppress per-period output and surface only the final point when the
    /// run ends at zero balance.
    pub accumulated_only: bool,
    /// Payment to use instead of the configured one.
    pub override_payment: Option<f64>,
    /// Clamp the payment up to the required minimum instead of ending the
    /// run when the configured payment falls short.
    pub allow_insufficient_payment: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        StepOptions {
            end_time: 100.0,
            end_at_zero: true,
            accumulated_only: false,
            override_payment: None,
            allow_insufficient_payment: false,
        }
    }
}

/// Drives stepping runs and parameter sweeps over a [`SimulationConfig`].
///
/// The simulator never mutates its config. Sweep operations perturb private
/// clones, one per swept value.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Simulator { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Lazily step through the simulation with the configured interest rate.
    ///
    /// Items are `Option<DataPoint>`: a run in accumulated-only mode yields
    /// its final point as `Some` on payoff, or `None` when no period ran.
    /// The sequence is finite and not restartable; call again for a fresh
    /// run.
    pub fn steps(&self, options: StepOptions) -> Steps {
        self.steps_with_rate(options, RateSchedule::Constant(self.config.interest))
    }

    /// Like [`Simulator::steps`], but with an explicit rate schedule. The
    /// delayed-rate sweep uses this to switch the rate mid-run.
    pub fn steps_with_rate(&self, options: StepOptions, rate: RateSchedule) -> Steps {
        let payment = options.override_payment.unwrap_or(self.config.payment);

        Steps {
            deduction: self.config.interest_deduction.rules().clone(),
            amortization: self.config.min_amortization.rules().clone(),
            rate,
            original_balance: self.config.balance,
            inflation: self.config.inflation,
            depreciation: self.config.depreciation,
            time_step: self.config.time_step.factor(),
            end_time: options.end_time,
            end_at_zero: options.end_at_zero,
            accumulated_only: options.accumulated_only,
            allow_insufficient: options.allow_insufficient_payment,
            time: 0.0,
            balance: self.config.corrected_balance(),
            yearly_payment: payment * 12.0,
            yearly_fees: self.config.fees * 12.0,
            last: None,
            termination: None,
        }
    }
}

/// Lazy per-period iterator over a single simulation run.
///
/// Created by [`Simulator::steps`]. Owns everything it needs (the parsed
/// rule sets are shared by reference), so it is independent of the
/// simulator that created it.
#[derive(Debug, Clone)]
pub struct Steps {
    deduction: RuleSet,
    amortization: RuleSet,
    rate: RateSchedule,

    original_balance: f64,
    inflation: f64,
    depreciation: f64,
    time_step: f64,

    end_time: f64,
    end_at_zero: bool,
    accumulated_only: bool,
    allow_insufficient: bool,

    time: f64,
    balance: f64,
    yearly_payment: f64,
    yearly_fees: f64,
    last: Option<DataPoint>,
    termination: Option<Termination>,
}

impl Steps {
    /// Why the run stopped. `None` while the iterator is still live.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    fn finish(&mut self, reason: Termination) {
        self.termination = Some(reason);
    }
}

impl Iterator for Steps {
    type Item = Option<DataPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.termination.is_some() {
                return None;
            }

            if self.time >= self.end_time {
                self.finish(Termination::EndTime);
                return None;
            }

            if self.balance < 0.0 && self.end_at_zero {
                self.finish(Termination::PaidOff);
                if self.accumulated_only {
                    return Some(self.last.take());
                }
                return None;
            }

            let time = self.time;
            let yearly_rate = self.rate.rate_at(time);

            // Deduction applies to the absolute yearly interest amount, not
            // the rate. A blended deduction of 0.3 leaves a 0.7 multiplier.
            let deduction = self
                .deduction
                .evaluate_aggregate(self.balance * yearly_rate, 0.0);
            let yearly_interest = self.balance * yearly_rate * (1.0 - deduction);

            let proportion = self.balance / self.original_balance;
            let required_amortization =
                self.balance * self.amortization.evaluate_first(proportion, 0.0);

            let required_payment = yearly_interest + self.yearly_fees + required_amortization;
            let used_payment = if self.yearly_payment < required_payment {
                if !self.allow_insufficient {
                    self.finish(Termination::InsufficientPayment);
                    return None;
                }
                required_payment
            } else {
                self.yearly_payment
            };

            let amortization = used_payment - yearly_interest - self.yearly_fees;

            let point = DataPoint {
                time,
                balance: self.balance,
                payment: used_payment / 12.0,
                amortization: amortization / 12.0,
                interest: yearly_interest / 12.0,
                fees: self.yearly_fees / 12.0,
            };

            self.balance -= amortization * self.time_step;
            if self.depreciation > 0.0 {
                self.balance -= self.balance * self.depreciation * self.time_step;
            }
            self.yearly_payment += self.yearly_payment * self.inflation * self.time_step;
            self.yearly_fees += self.yearly_fees * self.inflation * self.time_step;
            self.time += self.time_step;

            if self.accumulated_only {
                self.last = Some(point);
                continue;
            }

            return Some(Some(point));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_schedule_ignores_time() {
        let rate = RateSchedule::Constant(0.04);
        assert_eq!(rate.rate_at(0.0), 0.04);
        assert_eq!(rate.rate_at(50.0), 0.04);
    }

    #[test]
    fn stepped_schedule_switches_at_delay() {
        let rate = RateSchedule::Stepped {
            before: 0.04,
            after: 0.10,
            at: 2.0,
        };
        assert_eq!(rate.rate_at(0.0), 0.04);
        assert_eq!(rate.rate_at(1.99), 0.04);
        assert_eq!(rate.rate_at(2.0), 0.10);
        assert_eq!(rate.rate_at(10.0), 0.10);
    }

    #[test]
    fn default_options_are_strict() {
        let options = StepOptions::default();
        assert_eq!(options.end_time, 100.0);
        assert!(options.end_at_zero);
        assert!(!options.accumulated_only);
        assert!(!options.allow_insufficient_payment);
        assert!(options.override_payment.is_none());
    }
}
