//! Range bounds for score and lexicographic queries
//!
//! Score bounds encode as `N` (inclusive), `(N` (exclusive) or the
//! `-inf`/`+inf` sentinels. Lex bounds encode as `[v`, `(v`, or the `-`/`+`
//! sentinels. The inclusive flag is ignored for both kinds of sentinel.

use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ZsetError;
use crate::zset::score::Score;

const NEG_INF: &[u8] = b"-inf";
const POS_INF: &[u8] = b"+inf";
const LEX_MIN: &[u8] = b"-";
const LEX_MAX: &[u8] = b"+";

/// One end of a score range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBound {
    score: Score,
    inclusive: bool,
}

impl ScoreBound {
    pub fn new(score: impl Into<Score>, inclusive: bool) -> Self {
        Self {
            score: score.into(),
            inclusive,
        }
    }

    pub fn inclusive(score: impl Into<Score>) -> Self {
        Self::new(score, true)
    }

    pub fn exclusive(score: impl Into<Score>) -> Self {
        Self::new(score, false)
    }

    /// Unbounded minimum, `-inf`
    pub fn neg_inf() -> Self {
        Self::inclusive(f64::NEG_INFINITY)
    }

    /// Unbounded maximum, `+inf`
    pub fn pos_inf() -> Self {
        Self::inclusive(f64::INFINITY)
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Whether the bound includes its score. Infinite bounds always do.
    pub fn is_inclusive(&self) -> bool {
        self.inclusive || self.score.is_infinite()
    }

    /// Wire form of the bound
    pub fn encode(&self) -> Bytes {
        if self.score.is_infinite() {
            return if self.score.as_f64() > 0.0 {
                Bytes::from_static(POS_INF)
            } else {
                Bytes::from_static(NEG_INF)
            };
        }
        if self.inclusive {
            Bytes::from(self.score.to_string())
        } else {
            Bytes::from(format!("({}", self.score))
        }
    }
}

impl crate::protocol::ToArg for ScoreBound {
    fn to_arg(&self) -> Bytes {
        self.encode()
    }
}

impl FromStr for ScoreBound {
    type Err = ZsetError;

    /// Accepts the store's own syntax: `N`, `(N`, `-inf`, `+inf`, `inf`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (text, inclusive) = match s.strip_prefix('(') {
            Some(rest) => (rest, false),
            None => (s, true),
        };
        match Score::from_text(text.as_bytes()) {
            Some(score) if !score.as_f64().is_nan() => Ok(Self::new(score, inclusive)),
            _ => Err(ZsetError::InvalidArgument(format!(
                "'{}' is not a valid score bound",
                s
            ))),
        }
    }
}

/// One end of a lexicographic range
#[derive(Debug, Clone, PartialEq)]
pub struct LexBound {
    value: Bytes,
    inclusive: bool,
}

impl LexBound {
    pub fn new(value: impl AsRef<[u8]>, inclusive: bool) -> Self {
        Self {
            value: Bytes::copy_from_slice(value.as_ref()),
            inclusive,
        }
    }

    pub fn inclusive(value: impl AsRef<[u8]>) -> Self {
        Self::new(value, true)
    }

    pub fn exclusive(value: impl AsRef<[u8]>) -> Self {
        Self::new(value, false)
    }

    /// Unbounded minimum, `-`
    pub fn min() -> Self {
        Self {
            value: Bytes::from_static(LEX_MIN),
            inclusive: true,
        }
    }

    /// Unbounded maximum, `+`
    pub fn max() -> Self {
        Self {
            value: Bytes::from_static(LEX_MAX),
            inclusive: true,
        }
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Wire form when used as the lower end of a range.
    ///
    /// Only `-` is a sentinel here; `+` is prefixed like any other value.
    pub fn encode_min(&self) -> Bytes {
        if self.value.as_ref() == LEX_MIN {
            return self.value.clone();
        }
        self.prefixed()
    }

    /// Wire form when used as the upper end of a range.
    ///
    /// Only `+` is a sentinel here; `-` is prefixed like any other value.
    pub fn encode_max(&self) -> Bytes {
        if self.value.as_ref() == LEX_MAX {
            return self.value.clone();
        }
        self.prefixed()
    }

    fn prefixed(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.value.len() + 1);
        buf.put_u8(if self.inclusive { b'[' } else { b'(' });
        buf.put_slice(&self.value);
        buf.freeze()
    }
}

impl FromStr for LexBound {
    type Err = ZsetError;

    /// Accepts `-`, `+`, `[value` and `(value`; a bare value is inclusive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ZsetError::InvalidArgument(
                "lex bound must not be empty".to_string(),
            ));
        }
        Ok(match s {
            "-" => Self::min(),
            "+" => Self::max(),
            _ => match (s.strip_prefix('['), s.strip_prefix('(')) {
                (Some(rest), _) => Self::inclusive(rest),
                (_, Some(rest)) => Self::exclusive(rest),
                _ => Self::inclusive(s),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_score_bounds() {
        assert_eq!(ScoreBound::inclusive(5).encode(), Bytes::from_static(b"5"));
        assert_eq!(ScoreBound::exclusive(5).encode(), Bytes::from_static(b"(5"));
        assert_eq!(ScoreBound::inclusive(1.5).encode(), Bytes::from_static(b"1.5"));
        assert_eq!(ScoreBound::exclusive(-2.25).encode(), Bytes::from_static(b"(-2.25"));
    }

    #[test]
    fn test_infinite_bounds_ignore_flag() {
        assert_eq!(ScoreBound::neg_inf().encode(), Bytes::from_static(b"-inf"));
        assert_eq!(ScoreBound::pos_inf().encode(), Bytes::from_static(b"+inf"));
        assert_eq!(
            ScoreBound::exclusive(f64::NEG_INFINITY).encode(),
            Bytes::from_static(b"-inf")
        );
        assert_eq!(
            ScoreBound::exclusive(f64::INFINITY).encode(),
            Bytes::from_static(b"+inf")
        );
        assert!(ScoreBound::exclusive(f64::INFINITY).is_inclusive());
        assert!(!ScoreBound::exclusive(3).is_inclusive());
    }

    #[test]
    fn test_parse_score_bound() {
        assert_eq!("7".parse::<ScoreBound>().unwrap(), ScoreBound::inclusive(7));
        assert_eq!("(7".parse::<ScoreBound>().unwrap(), ScoreBound::exclusive(7));
        assert_eq!("(0.5".parse::<ScoreBound>().unwrap(), ScoreBound::exclusive(0.5));
        assert_eq!("-inf".parse::<ScoreBound>().unwrap(), ScoreBound::neg_inf());
        assert_eq!("+inf".parse::<ScoreBound>().unwrap(), ScoreBound::pos_inf());
        assert_eq!("inf".parse::<ScoreBound>().unwrap(), ScoreBound::pos_inf());
        assert!(matches!(
            "abc".parse::<ScoreBound>(),
            Err(ZsetError::InvalidArgument(_))
        ));
        assert!("nan".parse::<ScoreBound>().is_err());
    }

    #[test]
    fn test_lex_sentinels_pass_through() {
        assert_eq!(LexBound::min().encode_min(), Bytes::from_static(b"-"));
        assert_eq!(LexBound::max().encode_max(), Bytes::from_static(b"+"));
        // Sentinels only count on their own side of the range
        assert_eq!(LexBound::max().encode_min(), Bytes::from_static(b"[+"));
        assert_eq!(LexBound::min().encode_max(), Bytes::from_static(b"[-"));
    }

    #[test]
    fn test_lex_prefixes() {
        assert_eq!(LexBound::inclusive("a").encode_min(), Bytes::from_static(b"[a"));
        assert_eq!(LexBound::exclusive("z").encode_max(), Bytes::from_static(b"(z"));
        assert_eq!(
            LexBound::exclusive([0u8, 1]).encode_min(),
            Bytes::from_static(&[b'(', 0, 1])
        );
    }

    #[test]
    fn test_parse_lex_bound() {
        assert_eq!("-".parse::<LexBound>().unwrap(), LexBound::min());
        assert_eq!("+".parse::<LexBound>().unwrap(), LexBound::max());
        assert_eq!("[abc".parse::<LexBound>().unwrap(), LexBound::inclusive("abc"));
        assert_eq!("(abc".parse::<LexBound>().unwrap(), LexBound::exclusive("abc"));
        assert_eq!("abc".parse::<LexBound>().unwrap(), LexBound::inclusive("abc"));
        assert!("".parse::<LexBound>().is_err());
    }
}
