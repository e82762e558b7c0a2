//! Sorted set commands
//!
//! Every operation validates its arguments locally, builds a `Command`,
//! hands it to an `Executor` and decodes the raw reply.

pub mod bound;
pub mod commands;
pub mod reply;
pub mod score;

use bytes::Bytes;

use crate::error::{Result, ZsetError};

pub use bound::{LexBound, ScoreBound};
pub use commands::SortedSetCommands;
pub use score::Score;

/// Modifiers for score-range queries
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeOptions {
    pub withscores: bool,
    pub offset: Option<i64>,
    pub count: Option<i64>,
}

impl RangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `WITHSCORES`
    pub fn withscores(mut self) -> Self {
        self.withscores = true;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Set both halves of `LIMIT offset count`
    pub fn limit(self, offset: i64, count: i64) -> Self {
        self.offset(offset).count(count)
    }
}

/// Offset and count travel together as `LIMIT offset count`
pub(crate) fn check_limit(offset: Option<i64>, count: Option<i64>) -> Result<Option<(i64, i64)>> {
    match (offset, count) {
        (Some(offset), Some(count)) => Ok(Some((offset, count))),
        (None, None) => Ok(None),
        _ => Err(ZsetError::InvalidArgument(
            "offset and count must both be specified".to_string(),
        )),
    }
}

/// Result of a range query, with or without `WITHSCORES`
#[derive(Debug, Clone, PartialEq)]
pub enum RangeReply {
    Members(Vec<Bytes>),
    Scored(Vec<(Bytes, Score)>),
}

impl RangeReply {
    pub fn len(&self) -> usize {
        match self {
            RangeReply::Members(members) => members.len(),
            RangeReply::Scored(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Members in reply order, dropping any scores
    pub fn into_members(self) -> Vec<Bytes> {
        match self {
            RangeReply::Members(members) => members,
            RangeReply::Scored(pairs) => pairs.into_iter().map(|(member, _)| member).collect(),
        }
    }

    /// Member/score pairs, or `None` if the query was made without scores
    pub fn into_scored(self) -> Option<Vec<(Bytes, Score)>> {
        match self {
            RangeReply::Scored(pairs) => Some(pairs),
            RangeReply::Members(_) => None,
        }
    }
}
