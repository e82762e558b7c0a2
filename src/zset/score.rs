use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{Result, ZsetError};
use crate::protocol::{ToArg, parse_i64};

/// Numeric score of a sorted-set member.
///
/// The store answers scores as text; a reply without a decimal point or
/// exponent comes back as `Integer`, everything else as `Float`.
#[derive(Debug, Clone, Copy)]
pub enum Score {
    Integer(i64),
    Float(f64),
}

impl Score {
    /// Parse score text the way replies are decoded: integer first, float
    /// as fallback. Returns `None` for text that is neither.
    pub fn from_text(text: &[u8]) -> Option<Score> {
        if let Some(i) = parse_i64(text) {
            return Some(Score::Integer(i));
        }
        std::str::from_utf8(text)
            .ok()?
            .parse::<f64>()
            .ok()
            .map(Score::Float)
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Score::Integer(i) => i as f64,
            Score::Float(f) => f,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Score::Float(f) if f.is_infinite())
    }

    /// Reject values that cannot be sent as a score
    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        match self {
            Score::Float(f) if f.is_nan() => Err(ZsetError::InvalidArgument(format!(
                "{} must be int or float, got NaN",
                name
            ))),
            _ => Ok(()),
        }
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Score::Integer(a), Score::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Integer(i) => write!(f, "{}", i),
            Score::Float(v) => write!(f, "{}", v),
        }
    }
}

impl FromStr for Score {
    type Err = ZsetError;

    fn from_str(s: &str) -> Result<Self> {
        match Score::from_text(s.as_bytes()) {
            Some(score) if !score.as_f64().is_nan() => Ok(score),
            _ => Err(ZsetError::InvalidArgument(format!(
                "'{}' is not a valid score",
                s
            ))),
        }
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Score::Integer(value)
    }
}

impl From<i32> for Score {
    fn from(value: i32) -> Self {
        Score::Integer(value.into())
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::Float(value)
    }
}

impl ToArg for Score {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}
