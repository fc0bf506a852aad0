//! Simulation configuration.
//!
//! [`SimulationConfig`] is the externally owned parameter bundle the
//! simulator reads. Scalars are plain fields; the two rule schedules and the
//! time step are small value objects that keep the text they were built from
//! next to the parsed form, so parsing happens exactly once per assignment
//! and serialization round-trips the original text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::rules::RuleSet;

/// A rule-set text field together with its parsed form.
///
/// Construction performs the parse; reassigning the text means constructing
/// a new value. Serializes as the raw text and re-parses on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleText {
    text: String,
    rules: RuleSet,
}

impl RuleText {
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        let rules = RuleSet::parse(&text)?;
        Ok(RuleText { text, rules })
    }

    /// The canonical zero schedule, `"0"`.
    pub fn zero() -> Self {
        RuleText {
            text: "0".to_string(),
            rules: RuleSet::zero(),
        }
    }

    /// The text this schedule was parsed from, for display and round-trips.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl fmt::Display for RuleText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for RuleText {
    type Error = ParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        RuleText::parse(text)
    }
}

impl From<RuleText> for String {
    fn from(value: RuleText) -> Self {
        value.text
    }
}

/// Period lengths understood by [`TimeStep`], as periods per year.
fn periods_per_year(unit: &str) -> Option<f64> {
    match unit {
        "y" => Some(1.0),
        "m" => Some(12.0),
        "w" => Some(52.0),
        "d" => Some(365.0),
        "h" => Some(365.0 * 24.0),
        _ => None,
    }
}

/// A simulation period length parsed from text like `"1m"` or `"2w"`.
///
/// The letters form the unit (case-insensitive), the remainder is a numeric
/// multiplier. The derived factor is the fraction of a year one period
/// represents, so `"1m"` gives 1/12 and `"2w"` gives 2/52.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeStep {
    text: String,
    factor: f64,
}

impl TimeStep {
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();

        let unit: String = text
            .chars()
            .filter(|ch| ch.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        let rest: String = text.chars().filter(|ch| !ch.is_alphabetic()).collect();

        let per_year = periods_per_year(&unit)
            .ok_or_else(|| ParseError::UnknownTimeStepUnit(unit.clone()))?;
        let value: f64 = rest
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidTimeStepValue(rest.trim().to_string()))?;

        Ok(TimeStep {
            text,
            factor: value / per_year,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fraction of a year one simulation period represents.
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep {
            text: "1m".to_string(),
            factor: 1.0 / 12.0,
        }
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for TimeStep {
    type Error = ParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        TimeStep::parse(text)
    }
}

impl From<TimeStep> for String {
    fn from(value: TimeStep) -> Self {
        value.text
    }
}

/// The mutable parameter bundle a [`Simulator`](crate::Simulator) reads.
///
/// Owned and supplied by the caller. Cloning copies every scalar and shares
/// the immutable parsed rule sets, so sweep drivers can perturb a private
/// clone without touching the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Nominal yearly interest rate, as a fraction.
    pub interest: f64,
    /// Payment per month.
    pub payment: f64,
    /// Initial loan balance.
    pub balance: f64,
    /// Up-front deposit, as a fraction of the balance.
    pub deposit: f64,
    /// Yearly depreciation of the remaining balance, as a fraction.
    pub depreciation: f64,
    /// Yearly growth applied to payment and fees, as a fraction.
    pub inflation: f64,
    /// Fees per month.
    pub fees: f64,
    /// Length of one simulation period.
    pub time_step: TimeStep,
    /// Minimum-amortization schedule, keyed by paydown proportion and
    /// evaluated first-match.
    pub min_amortization: RuleText,
    /// Interest-deduction schedule, keyed by the yearly interest amount and
    /// evaluated as a bracket aggregate.
    pub interest_deduction: RuleText,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            interest: 0.04,
            payment: 14_000.0,
            balance: 2_500_000.0,
            deposit: 0.15,
            depreciation: 0.0,
            inflation: 0.0,
            fees: 3_500.0,
            time_step: TimeStep::default(),
            min_amortization: RuleText::parse(">=0.7=0.03;<0.7=0.02")
                .expect("default amortization schedule parses"),
            interest_deduction: RuleText::parse("<=100000=0.3;>=100000=0.21")
                .expect("default deduction schedule parses"),
        }
    }
}

impl SimulationConfig {
    /// Balance net of the up-front deposit.
    pub fn corrected_balance(&self) -> f64 {
        self.balance - self.balance * self.deposit
    }

    /// The monthly payment that exactly meets the minimum amortization plus
    /// nominal interest on the full balance. Used as the default lower bound
    /// of the payment sweep.
    pub fn min_payment(&self) -> f64 {
        self.balance * (self.min_amortization.rules().evaluate_first(1.0, 0.0) + self.interest)
            / 12.0
    }
}
