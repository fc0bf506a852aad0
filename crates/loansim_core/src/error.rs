use std::fmt;

/// Errors raised while parsing rule text or time-step tokens.
///
/// Every variant carries the offending substring so the caller that supplied
/// the text can point at it. Parsing never recovers internally; the error is
/// surfaced synchronously at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A bare rule segment that is neither a comparison nor a valid number.
    InvalidConstant(String),
    /// The numeral part of a comparison did not parse as a number.
    InvalidThreshold(String),
    /// The value part after the final `=` did not parse as a number.
    InvalidValue(String),
    /// The operator token is not one of the recognized comparison symbols.
    UnknownOperator(String),
    /// The letter part of a time-step token is not a known unit.
    UnknownTimeStepUnit(String),
    /// The numeric part of a time-step token did not parse as a number.
    InvalidTimeStepValue(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidConstant(text) => write!(f, "invalid constant: {text:?}"),
            ParseError::InvalidThreshold(text) => write!(f, "invalid threshold: {text:?}"),
            ParseError::InvalidValue(text) => write!(f, "invalid value: {text:?}"),
            ParseError::UnknownOperator(text) => write!(f, "unknown operator: {text:?}"),
            ParseError::UnknownTimeStepUnit(text) => {
                write!(f, "unknown time step unit: {text:?}")
            }
            ParseError::InvalidTimeStepValue(text) => {
                write!(f, "invalid time step value: {text:?}")
            }
        }
    }
}

impl std::error::Error for ParseError {}
