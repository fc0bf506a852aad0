//! Threshold rules and rule sets.
//!
//! A rule is a single condition of the form "if the input satisfies a
//! comparator against a threshold, yield a value", parsed from text like
//! `">=0.7=0.03"`. A bare number is a constant rule that always yields its
//! value. Rule sets chain rules with `;` or `&` and evaluate them in two
//! modes:
//!
//! - **first match**: return the value of the first rule whose condition
//!   holds, in declared order;
//! - **aggregate**: blend rule values across the portion of the input axis
//!   each rule owns, weighted by the width of that portion. This works like
//!   progressive tax brackets. `"<=100000=0.3;>=100000=0.21"` evaluated at
//!   200 000 yields `(100000 * 0.3 + 100000 * 0.21) / 200000`.

use std::str::FromStr;
use std::sync::Arc;

use crate::error::ParseError;

/// Tolerance for `=` and `!=` comparisons, so that accumulated floating
/// point drift in simulation state still counts as equal.
const EQUALITY_TOLERANCE: f64 = 1e-4;

#[inline]
fn roughly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EQUALITY_TOLERANCE
}

#[inline]
fn is_numeral(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.' || ch == ','
}

/// Parse a number in the invariant format the rule grammar allows. `,` acts
/// as a thousands separator and is stripped before the final parse.
fn parse_number(text: &str, err: impl FnOnce(String) -> ParseError) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    let cleaned: String = trimmed.chars().filter(|ch| *ch != ',').collect();
    f64::from_str(&cleaned).map_err(|_| err(trimmed.to_string()))
}

/// The comparator a rule applies between its input and its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
    /// A bare number; always matches and yields its value.
    Constant,
}

impl Operator {
    fn from_token(token: &str) -> Result<Self, ParseError> {
        match token {
            "<" => Ok(Operator::LessThan),
            "<=" | "≤" => Ok(Operator::LessOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" | "≥" => Ok(Operator::GreaterOrEqual),
            "=" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            other => Err(ParseError::UnknownOperator(other.to_string())),
        }
    }
}

/// One parsed threshold rule. Immutable once parsed; it has no identity
/// beyond its fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    operator: Operator,
    threshold: f64,
    value: f64,
}

impl Rule {
    /// Parse a single rule.
    ///
    /// The text is either a bare number (a constant rule) or
    /// `<operator><threshold>=<value>`. The text is split on `=`; everything
    /// before the final segment forms the operator-and-threshold part, where
    /// non-numeral characters are the operator token and numeral characters
    /// are the threshold. `"!=100=5"` therefore parses as operator `!=`,
    /// threshold `100`, value `5`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let segments: Vec<&str> = text.split('=').map(str::trim).collect();

        if segments.len() < 2 {
            let constant = parse_number(text, ParseError::InvalidConstant)?;
            return Ok(Rule {
                operator: Operator::Constant,
                threshold: constant,
                value: constant,
            });
        }

        let value_part = segments[segments.len() - 1];
        let op_part = segments[..segments.len() - 1].join("=");

        let token: String = op_part.chars().filter(|ch| !is_numeral(*ch)).collect();
        let threshold_part: String = op_part.chars().filter(|ch| is_numeral(*ch)).collect();

        let threshold = parse_number(&threshold_part, ParseError::InvalidThreshold)?;
        let value = parse_number(value_part, ParseError::InvalidValue)?;
        let operator = Operator::from_token(token.trim())?;

        Ok(Rule {
            operator,
            threshold,
            value,
        })
    }

    /// Evaluate the rule, yielding its value when the condition holds.
    ///
    /// `=` and `!=` compare with a small tolerance rather than exactly.
    pub fn evaluate(&self, input: f64) -> Option<f64> {
        let matched = match self.operator {
            Operator::Constant => true,
            Operator::LessThan => input < self.threshold,
            Operator::LessOrEqual => input <= self.threshold,
            Operator::GreaterThan => input > self.threshold,
            Operator::GreaterOrEqual => input >= self.threshold,
            Operator::Equal => roughly_equal(input, self.threshold),
            Operator::NotEqual => !roughly_equal(input, self.threshold),
        };
        matched.then_some(self.value)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether the rule consumes the input axis from below in aggregate
    /// evaluation. Equality, inequality and constant rules belong to
    /// neither family and take no part in bracket blending.
    fn is_less_than(&self) -> bool {
        matches!(self.operator, Operator::LessThan | Operator::LessOrEqual)
    }

    fn is_greater_than(&self) -> bool {
        matches!(
            self.operator,
            Operator::GreaterThan | Operator::GreaterOrEqual
        )
    }
}

/// One consumed slice of the input axis during aggregate evaluation.
#[derive(Debug, Clone, Copy)]
struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
}

impl Segment {
    fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// An ordered, non-empty sequence of rules.
///
/// Order is semantically significant: first-match evaluation walks the rules
/// in declared order, and aggregate evaluation consumes the input axis in
/// declared order. The parsed rules are immutable and shared by reference
/// when a rule set is cloned.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    /// Parse a multi-rule string, split on `;` or `&` with each segment
    /// trimmed. Order is preserved.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let rules = text
            .split([';', '&'])
            .map(str::trim)
            .map(Rule::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet {
            rules: rules.into(),
        })
    }

    /// The canonical empty schedule, a single constant `0` rule.
    pub fn zero() -> Self {
        RuleSet {
            rules: Arc::new([Rule {
                operator: Operator::Constant,
                threshold: 0.0,
                value: 0.0,
            }]),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Return the value of the first rule that matches `input`, or
    /// `default` when none does.
    pub fn evaluate_first(&self, input: f64, default: f64) -> f64 {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(input))
            .unwrap_or(default)
    }

    /// Blend rule values across brackets of the input axis.
    ///
    /// A cursor starts at zero and walks toward `input`. Each less-than rule
    /// owns the slice from the cursor up to its threshold (or up to `input`,
    /// whichever is smaller); a greater-than rule whose threshold the cursor
    /// has reached owns the remainder up to `input`. Slices are kept
    /// half-open by nudging a threshold-bounded upper edge down by one
    /// machine epsilon. The result is the slice-width-weighted average of
    /// the matching rules' values, or `default` when no slice was consumed.
    pub fn evaluate_aggregate(&self, input: f64, default: f64) -> f64 {
        let mut processed = 0.0_f64;
        let mut segments: Vec<Segment> = Vec::new();

        for rule in self.rules.iter() {
            if processed >= input - f64::EPSILON {
                break;
            }

            if rule.is_less_than() {
                let step = if input > rule.threshold {
                    rule.threshold - processed - f64::EPSILON
                } else {
                    input - processed
                };

                if let Some(value) = rule.evaluate(processed + step) {
                    segments.push(Segment {
                        lower: processed,
                        upper: processed + step,
                        value,
                    });
                    processed += step;
                }
            } else if rule.is_greater_than() && processed >= rule.threshold {
                if let Some(value) = rule.evaluate(input) {
                    segments.push(Segment {
                        lower: processed,
                        upper: input,
                        value,
                    });
                    processed = input;
                }
            }
        }

        if segments.is_empty() {
            return default;
        }

        let weighted: f64 = segments.iter().map(|s| s.value * s.width()).sum();
        let width: f64 = segments.iter().map(Segment::width).sum();
        weighted / width
    }
}
