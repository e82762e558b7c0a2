use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing::info;

use coredb_zset::config::{Config, LogConfig};
use coredb_zset::{
    Connection, LexBound, RangeOptions, RangeReply, Score, ScoreBound, SortedSetCommands, ZsetError,
};

/// Sorted set commands against a Redis-compatible server
#[derive(Debug, Parser)]
#[command(name = "zsetcli", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Server address, overrides the configuration file
    #[arg(short, long)]
    addr: Option<String>,

    #[command(subcommand)]
    command: ZCommand,
}

#[derive(Debug, Subcommand)]
enum ZCommand {
    /// Add members: SCORE MEMBER [SCORE MEMBER ...]
    Zadd {
        key: String,
        #[arg(allow_hyphen_values = true)]
        score: Score,
        member: String,
        #[arg(allow_hyphen_values = true, num_args = 0..)]
        pairs: Vec<String>,
    },
    Zcard {
        key: String,
    },
    Zcount {
        key: String,
        #[arg(allow_hyphen_values = true, default_value = "-inf")]
        min: ScoreBound,
        #[arg(allow_hyphen_values = true, default_value = "+inf")]
        max: ScoreBound,
    },
    Zincrby {
        key: String,
        #[arg(allow_hyphen_values = true)]
        increment: Score,
        member: String,
    },
    Zlexcount {
        key: String,
        #[arg(allow_hyphen_values = true, default_value = "-")]
        min: LexBound,
        #[arg(allow_hyphen_values = true, default_value = "+")]
        max: LexBound,
    },
    Zrange {
        key: String,
        #[arg(allow_hyphen_values = true, default_value_t = 0)]
        start: i64,
        #[arg(allow_hyphen_values = true, default_value_t = -1)]
        stop: i64,
        #[arg(long)]
        withscores: bool,
    },
    Zrangebylex {
        key: String,
        #[arg(allow_hyphen_values = true, default_value = "-")]
        min: LexBound,
        #[arg(allow_hyphen_values = true, default_value = "+")]
        max: LexBound,
        #[arg(long)]
        offset: Option<i64>,
        #[arg(long)]
        count: Option<i64>,
    },
    Zrangebyscore {
        key: String,
        #[arg(allow_hyphen_values = true, default_value = "-inf")]
        min: ScoreBound,
        #[arg(allow_hyphen_values = true, default_value = "+inf")]
        max: ScoreBound,
        #[arg(long)]
        withscores: bool,
        #[arg(long)]
        offset: Option<i64>,
        #[arg(long)]
        count: Option<i64>,
    },
    Zrank {
        key: String,
        member: String,
    },
    Zrem {
        key: String,
        member: String,
        members: Vec<String>,
    },
    Zremrangebylex {
        key: String,
        #[arg(allow_hyphen_values = true)]
        min: LexBound,
        #[arg(allow_hyphen_values = true)]
        max: LexBound,
    },
    Zremrangebyrank {
        key: String,
        #[arg(allow_hyphen_values = true)]
        start: i64,
        #[arg(allow_hyphen_values = true)]
        stop: i64,
    },
    Zremrangebyscore {
        key: String,
        #[arg(allow_hyphen_values = true, default_value = "-inf")]
        min: ScoreBound,
        #[arg(allow_hyphen_values = true, default_value = "+inf")]
        max: ScoreBound,
    },
    Zrevrange {
        key: String,
        #[arg(allow_hyphen_values = true)]
        start: i64,
        #[arg(allow_hyphen_values = true)]
        stop: i64,
        #[arg(long)]
        withscores: bool,
    },
    Zrevrangebyscore {
        key: String,
        #[arg(allow_hyphen_values = true, default_value = "+inf")]
        max: ScoreBound,
        #[arg(allow_hyphen_values = true, default_value = "-inf")]
        min: ScoreBound,
        #[arg(long)]
        withscores: bool,
        #[arg(long)]
        offset: Option<i64>,
        #[arg(long)]
        count: Option<i64>,
    },
    Zrevrank {
        key: String,
        member: String,
    },
    Zscore {
        key: String,
        member: String,
    },
    Zscan {
        key: String,
        #[arg(default_value_t = 0)]
        cursor: u64,
        #[arg(long = "match")]
        pattern: Option<String>,
        #[arg(long)]
        count: Option<i64>,
    },
}

/// Decoded reply, printed the way redis-cli prints it
#[derive(Debug, PartialEq)]
enum Output {
    Integer(i64),
    Score(Score),
    Nil,
    Range(RangeReply),
    Members(Vec<Bytes>),
    Scan(u64, Vec<(Bytes, Score)>),
}

fn quoted(member: &[u8]) -> String {
    format!("\"{}\"", String::from_utf8_lossy(member))
}

fn write_scored(f: &mut fmt::Formatter<'_>, pairs: &[(Bytes, Score)], indent: &str) -> fmt::Result {
    for (i, (member, score)) in pairs.iter().enumerate() {
        writeln!(f, "{}{}) {} {}", indent, i + 1, quoted(member), score)?;
    }
    Ok(())
}

fn write_members(f: &mut fmt::Formatter<'_>, members: &[Bytes]) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        writeln!(f, "{}) {}", i + 1, quoted(member))?;
    }
    Ok(())
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Integer(n) => writeln!(f, "(integer) {}", n),
            Output::Score(score) => writeln!(f, "{}", score),
            Output::Nil => writeln!(f, "(nil)"),
            Output::Range(reply) if reply.is_empty() => writeln!(f, "(empty array)"),
            Output::Members(members) if members.is_empty() => writeln!(f, "(empty array)"),
            Output::Range(RangeReply::Members(members)) | Output::Members(members) => {
                write_members(f, members)
            }
            Output::Range(RangeReply::Scored(pairs)) => write_scored(f, pairs, ""),
            Output::Scan(cursor, page) => {
                writeln!(f, "cursor: {}", cursor)?;
                write_scored(f, page, "  ")
            }
        }
    }
}

/// `SCORE MEMBER` pairs following the first member
fn parse_pairs(pairs: &[String]) -> Result<Vec<(Score, &[u8])>, ZsetError> {
    if pairs.len() % 2 != 0 {
        return Err(ZsetError::InvalidArgument(
            "length of pairs must be even number".to_string(),
        ));
    }
    pairs
        .chunks_exact(2)
        .map(|pair| {
            pair[0]
                .parse::<Score>()
                .map(|score| (score, pair[1].as_bytes()))
        })
        .collect()
}

fn range_options(withscores: bool, offset: Option<i64>, count: Option<i64>) -> RangeOptions {
    RangeOptions {
        withscores,
        offset,
        count,
    }
}

async fn run<C: SortedSetCommands>(conn: &C, command: ZCommand) -> Result<Output, ZsetError> {
    let output = match command {
        ZCommand::Zadd {
            key,
            score,
            member,
            pairs,
        } => {
            let pairs = parse_pairs(&pairs)?;
            Output::Integer(
                conn.zadd(key.as_bytes(), score, member.as_bytes(), &pairs)
                    .await?,
            )
        }
        ZCommand::Zcard { key } => Output::Integer(conn.zcard(key.as_bytes()).await?),
        ZCommand::Zcount { key, min, max } => {
            Output::Integer(conn.zcount(key.as_bytes(), min, max).await?)
        }
        ZCommand::Zincrby {
            key,
            increment,
            member,
        } => Output::Score(
            conn.zincrby(key.as_bytes(), increment, member.as_bytes())
                .await?,
        ),
        ZCommand::Zlexcount { key, min, max } => {
            Output::Integer(conn.zlexcount(key.as_bytes(), min, max).await?)
        }
        ZCommand::Zrange {
            key,
            start,
            stop,
            withscores,
        } => Output::Range(conn.zrange(key.as_bytes(), start, stop, withscores).await?),
        ZCommand::Zrangebylex {
            key,
            min,
            max,
            offset,
            count,
        } => Output::Members(
            conn.zrangebylex(key.as_bytes(), min, max, offset, count)
                .await?,
        ),
        ZCommand::Zrangebyscore {
            key,
            min,
            max,
            withscores,
            offset,
            count,
        } => Output::Range(
            conn.zrangebyscore(
                key.as_bytes(),
                min,
                max,
                range_options(withscores, offset, count),
            )
            .await?,
        ),
        ZCommand::Zrank { key, member } => conn
            .zrank(key.as_bytes(), member.as_bytes())
            .await?
            .map_or(Output::Nil, Output::Integer),
        ZCommand::Zrem {
            key,
            member,
            members,
        } => {
            let members: Vec<&[u8]> = members.iter().map(|m| m.as_bytes()).collect();
            Output::Integer(
                conn.zrem(key.as_bytes(), member.as_bytes(), &members)
                    .await?,
            )
        }
        ZCommand::Zremrangebylex { key, min, max } => {
            Output::Integer(conn.zremrangebylex(key.as_bytes(), min, max).await?)
        }
        ZCommand::Zremrangebyrank { key, start, stop } => {
            Output::Integer(conn.zremrangebyrank(key.as_bytes(), start, stop).await?)
        }
        ZCommand::Zremrangebyscore { key, min, max } => {
            Output::Integer(conn.zremrangebyscore(key.as_bytes(), min, max).await?)
        }
        ZCommand::Zrevrange {
            key,
            start,
            stop,
            withscores,
        } => Output::Range(
            conn.zrevrange(key.as_bytes(), start, stop, withscores)
                .await?,
        ),
        ZCommand::Zrevrangebyscore {
            key,
            max,
            min,
            withscores,
            offset,
            count,
        } => Output::Range(
            conn.zrevrangebyscore(
                key.as_bytes(),
                max,
                min,
                range_options(withscores, offset, count),
            )
            .await?,
        ),
        ZCommand::Zrevrank { key, member } => conn
            .zrevrank(key.as_bytes(), member.as_bytes())
            .await?
            .map_or(Output::Nil, Output::Integer),
        ZCommand::Zscore { key, member } => conn
            .zscore(key.as_bytes(), member.as_bytes())
            .await?
            .map_or(Output::Nil, Output::Score),
        ZCommand::Zscan {
            key,
            cursor,
            pattern,
            count,
        } => {
            let (cursor, page) = conn
                .zscan(
                    key.as_bytes(),
                    cursor,
                    pattern.as_deref().map(str::as_bytes),
                    count,
                )
                .await?;
            Output::Scan(cursor, page)
        }
    };
    Ok(output)
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(addr) = cli.addr {
        config.server_addr = addr;
    }

    init_logging(&config.log)?;
    info!("Connecting to {}", config.server_addr);

    let conn = Connection::connect(config.server_addr.as_str())
        .await
        .with_context(|| format!("Failed to connect to {}", config.server_addr))?;

    let output = run(&conn, cli.command).await?;
    print!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zsetcli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_zadd_pairs() {
        let cli = parse(&["zadd", "board", "1", "a", "-2.5", "b"]);
        match cli.command {
            ZCommand::Zadd {
                key, score, pairs, ..
            } => {
                assert_eq!(key, "board");
                assert_eq!(score, Score::Integer(1));
                let pairs = parse_pairs(&pairs).unwrap();
                assert_eq!(pairs, vec![(Score::Float(-2.5), &b"b"[..])]);
            }
            other => panic!("Expected ZADD, got {:?}", other),
        }
    }

    #[test]
    fn test_odd_pairs_rejected() {
        let pairs = vec!["1".to_string()];
        assert!(matches!(
            parse_pairs(&pairs),
            Err(ZsetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_bounds_with_defaults() {
        let cli = parse(&["zcount", "board"]);
        match cli.command {
            ZCommand::Zcount { min, max, .. } => {
                assert_eq!(min, ScoreBound::neg_inf());
                assert_eq!(max, ScoreBound::pos_inf());
            }
            other => panic!("Expected ZCOUNT, got {:?}", other),
        }

        let cli = parse(&["zrangebylex", "board", "-", "(m", "--offset", "0", "--count", "3"]);
        match cli.command {
            ZCommand::Zrangebylex {
                min,
                max,
                offset,
                count,
                ..
            } => {
                assert_eq!(min, LexBound::min());
                assert_eq!(max, LexBound::exclusive("m"));
                assert_eq!((offset, count), (Some(0), Some(3)));
            }
            other => panic!("Expected ZRANGEBYLEX, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_indexes_and_globals() {
        let cli = parse(&["--addr", "10.0.0.1:6380", "zremrangebyrank", "board", "0", "-2"]);
        assert_eq!(cli.addr.as_deref(), Some("10.0.0.1:6380"));
        match cli.command {
            ZCommand::Zremrangebyrank { start, stop, .. } => assert_eq!((start, stop), (0, -2)),
            other => panic!("Expected ZREMRANGEBYRANK, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_bound_rejected() {
        let result =
            Cli::try_parse_from(["zsetcli", "zrangebyscore", "board", "low", "high"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(Output::Integer(3).to_string(), "(integer) 3\n");
        assert_eq!(Output::Nil.to_string(), "(nil)\n");
        assert_eq!(Output::Score(Score::Float(1.5)).to_string(), "1.5\n");
        assert_eq!(
            Output::Range(RangeReply::Scored(vec![
                (Bytes::from_static(b"a"), Score::Integer(1)),
                (Bytes::from_static(b"b"), Score::Float(2.5)),
            ]))
            .to_string(),
            "1) \"a\" 1\n2) \"b\" 2.5\n"
        );
        assert_eq!(
            Output::Members(vec![Bytes::from_static(b"x")]).to_string(),
            "1) \"x\"\n"
        );
        assert_eq!(Output::Range(RangeReply::Members(vec![])).to_string(), "(empty array)\n");
        assert_eq!(
            Output::Scan(0, vec![(Bytes::from_static(b"m"), Score::Integer(4))]).to_string(),
            "cursor: 0\n  1) \"m\" 4\n"
        );
    }
}
