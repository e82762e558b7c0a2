use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, ZsetError};
use crate::executor::Executor;
use crate::protocol::{Command, Value};
use crate::zset::bound::{LexBound, ScoreBound};
use crate::zset::reply;
use crate::zset::score::Score;
use crate::zset::{RangeOptions, RangeReply, check_limit};

const WITHSCORES: &str = "WITHSCORES";
const LIMIT: &str = "LIMIT";

async fn dispatch<E: Executor + ?Sized>(executor: &E, command: Command) -> Result<Value> {
    debug!(command = %command, "dispatching sorted set command");
    let reply = executor.execute(command).await?;
    debug!(reply = ?reply, "received reply");
    Ok(reply)
}

fn validate_bounds(min: &ScoreBound, max: &ScoreBound) -> Result<()> {
    min.score().validate("min")?;
    max.score().validate("max")
}

fn decode_range(value: Value, withscores: bool) -> Result<RangeReply> {
    if withscores {
        reply::pairs_int_or_float(value).map(RangeReply::Scored)
    } else {
        reply::members(value).map(RangeReply::Members)
    }
}

/// Builds `[WITHSCORES] [LIMIT offset count]`, validating the limit pair
fn with_range_options(mut command: Command, opts: &RangeOptions) -> Result<Command> {
    let limit = check_limit(opts.offset, opts.count)?;
    if opts.withscores {
        command = command.arg(WITHSCORES);
    }
    if let Some((offset, count)) = limit {
        command = command.arg(LIMIT).arg(offset).arg(count);
    }
    Ok(command)
}

/// Sorted set commands, available on every [`Executor`].
///
/// Argument errors (`InvalidArgument`, `InvalidRange`) are returned before
/// the executor is called.
#[async_trait]
pub trait SortedSetCommands: Executor {
    /// Add one or more members to a sorted set or update their scores.
    async fn zadd(
        &self,
        key: &[u8],
        score: Score,
        member: &[u8],
        pairs: &[(Score, &[u8])],
    ) -> Result<i64> {
        score.validate("score")?;
        for (score, _) in pairs {
            score.validate("all scores")?;
        }

        let mut command = Command::new("ZADD").arg(key).arg(score).arg(member);
        for (score, member) in pairs {
            command = command.arg(*score).arg(*member);
        }
        reply::integer(dispatch(self, command).await?)
    }

    /// Get the number of members in a sorted set.
    async fn zcard(&self, key: &[u8]) -> Result<i64> {
        reply::integer(dispatch(self, Command::new("ZCARD").arg(key)).await?)
    }

    /// Count the members with scores between `min` and `max`.
    ///
    /// Fails with `InvalidRange` when `min` is greater than `max`.
    async fn zcount(&self, key: &[u8], min: ScoreBound, max: ScoreBound) -> Result<i64> {
        validate_bounds(&min, &max)?;
        if min.score() > max.score() {
            return Err(ZsetError::InvalidRange(
                "min could not be greater than max".to_string(),
            ));
        }
        let command = Command::new("ZCOUNT").arg(key).arg(min).arg(max);
        reply::integer(dispatch(self, command).await?)
    }

    /// Increment the score of a member, returning the new score.
    async fn zincrby(&self, key: &[u8], increment: Score, member: &[u8]) -> Result<Score> {
        increment.validate("increment")?;
        let command = Command::new("ZINCRBY").arg(key).arg(increment).arg(member);
        reply::score(dispatch(self, command).await?)
    }

    /// Not supported: weights and aggregation are not modelled.
    async fn zinterstore(
        &self,
        destkey: &[u8],
        numkeys: i64,
        key: &[u8],
        keys: &[&[u8]],
    ) -> Result<i64> {
        let _ = (destkey, numkeys, key, keys);
        Err(ZsetError::NotImplemented("ZINTERSTORE"))
    }

    /// Count members between two lexicographical bounds.
    async fn zlexcount(&self, key: &[u8], min: LexBound, max: LexBound) -> Result<i64> {
        let command = Command::new("ZLEXCOUNT")
            .arg(key)
            .arg(min.encode_min())
            .arg(max.encode_max());
        reply::integer(dispatch(self, command).await?)
    }

    /// Return members by index, lowest score first.
    async fn zrange(
        &self,
        key: &[u8],
        start: i64,
        stop: i64,
        withscores: bool,
    ) -> Result<RangeReply> {
        let mut command = Command::new("ZRANGE").arg(key).arg(start).arg(stop);
        if withscores {
            command = command.arg(WITHSCORES);
        }
        decode_range(dispatch(self, command).await?, withscores)
    }

    /// Return members between two lexicographical bounds.
    async fn zrangebylex(
        &self,
        key: &[u8],
        min: LexBound,
        max: LexBound,
        offset: Option<i64>,
        count: Option<i64>,
    ) -> Result<Vec<Bytes>> {
        let limit = check_limit(offset, count)?;
        let mut command = Command::new("ZRANGEBYLEX")
            .arg(key)
            .arg(min.encode_min())
            .arg(max.encode_max());
        if let Some((offset, count)) = limit {
            command = command.arg(LIMIT).arg(offset).arg(count);
        }
        reply::members(dispatch(self, command).await?)
    }

    /// Return members with scores between `min` and `max`.
    async fn zrangebyscore(
        &self,
        key: &[u8],
        min: ScoreBound,
        max: ScoreBound,
        opts: RangeOptions,
    ) -> Result<RangeReply> {
        validate_bounds(&min, &max)?;
        let command =
            with_range_options(Command::new("ZRANGEBYSCORE").arg(key).arg(min).arg(max), &opts)?;
        decode_range(dispatch(self, command).await?, opts.withscores)
    }

    /// Index of a member, lowest score first; `None` if absent.
    async fn zrank(&self, key: &[u8], member: &[u8]) -> Result<Option<i64>> {
        let command = Command::new("ZRANK").arg(key).arg(member);
        reply::optional_integer(dispatch(self, command).await?)
    }

    /// Remove one or more members.
    async fn zrem(&self, key: &[u8], member: &[u8], members: &[&[u8]]) -> Result<i64> {
        let mut command = Command::new("ZREM").arg(key).arg(member);
        for member in members {
            command = command.arg(*member);
        }
        reply::integer(dispatch(self, command).await?)
    }

    /// Remove members between two lexicographical bounds.
    async fn zremrangebylex(&self, key: &[u8], min: LexBound, max: LexBound) -> Result<i64> {
        let command = Command::new("ZREMRANGEBYLEX")
            .arg(key)
            .arg(min.encode_min())
            .arg(max.encode_max());
        reply::integer(dispatch(self, command).await?)
    }

    /// Remove members within the given indexes.
    async fn zremrangebyrank(&self, key: &[u8], start: i64, stop: i64) -> Result<i64> {
        let command = Command::new("ZREMRANGEBYRANK").arg(key).arg(start).arg(stop);
        reply::integer(dispatch(self, command).await?)
    }

    /// Remove members with scores between `min` and `max`.
    async fn zremrangebyscore(&self, key: &[u8], min: ScoreBound, max: ScoreBound) -> Result<i64> {
        validate_bounds(&min, &max)?;
        let command = Command::new("ZREMRANGEBYSCORE").arg(key).arg(min).arg(max);
        reply::integer(dispatch(self, command).await?)
    }

    /// Return members by index, highest score first.
    async fn zrevrange(
        &self,
        key: &[u8],
        start: i64,
        stop: i64,
        withscores: bool,
    ) -> Result<RangeReply> {
        let mut command = Command::new("ZREVRANGE").arg(key).arg(start).arg(stop);
        if withscores {
            command = command.arg(WITHSCORES);
        }
        decode_range(dispatch(self, command).await?, withscores)
    }

    /// Return members with scores between `max` and `min`, highest first.
    ///
    /// Note the argument order: the upper bound comes first, as on the wire.
    async fn zrevrangebyscore(
        &self,
        key: &[u8],
        max: ScoreBound,
        min: ScoreBound,
        opts: RangeOptions,
    ) -> Result<RangeReply> {
        validate_bounds(&min, &max)?;
        let command = with_range_options(
            Command::new("ZREVRANGEBYSCORE").arg(key).arg(max).arg(min),
            &opts,
        )?;
        decode_range(dispatch(self, command).await?, opts.withscores)
    }

    /// Index of a member, highest score first; `None` if absent.
    async fn zrevrank(&self, key: &[u8], member: &[u8]) -> Result<Option<i64>> {
        let command = Command::new("ZREVRANK").arg(key).arg(member);
        reply::optional_integer(dispatch(self, command).await?)
    }

    /// Score of a member; `None` if the member or key is absent.
    async fn zscore(&self, key: &[u8], member: &[u8]) -> Result<Option<Score>> {
        let command = Command::new("ZSCORE").arg(key).arg(member);
        reply::optional_score(dispatch(self, command).await?)
    }

    /// Not supported: weights and aggregation are not modelled.
    async fn zunionstore(
        &self,
        destkey: &[u8],
        numkeys: i64,
        key: &[u8],
        keys: &[&[u8]],
    ) -> Result<i64> {
        let _ = (destkey, numkeys, key, keys);
        Err(ZsetError::NotImplemented("ZUNIONSTORE"))
    }

    /// One step of an incremental scan. Start with cursor `0`; the scan is
    /// complete when the returned cursor is `0` again.
    async fn zscan(
        &self,
        key: &[u8],
        cursor: u64,
        pattern: Option<&[u8]>,
        count: Option<i64>,
    ) -> Result<(u64, Vec<(Bytes, Score)>)> {
        let command = Command::new("ZSCAN")
            .arg(key)
            .arg(cursor)
            .opt_keyword_arg("MATCH", pattern)
            .opt_keyword_arg("COUNT", count);
        reply::scan_page(dispatch(self, command).await?)
    }
}

impl<E: Executor + ?Sized> SortedSetCommands for E {}
