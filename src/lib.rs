//! Sorted-set commands for RESP key-value stores.
//!
//! Arguments are validated locally, encoded into a [`Command`] and handed
//! to an [`Executor`]; raw replies are decoded into typed values.
//!
//! ```no_run
//! use coredb_zset::{Connection, RangeOptions, Score, ScoreBound, SortedSetCommands};
//!
//! # async fn demo() -> coredb_zset::Result<()> {
//! let conn = Connection::connect("127.0.0.1:6379").await?;
//! conn.zadd(b"board", Score::Integer(10), b"alice", &[(Score::Float(7.5), &b"bob"[..])])
//!     .await?;
//! let top = conn
//!     .zrevrangebyscore(
//!         b"board",
//!         ScoreBound::pos_inf(),
//!         ScoreBound::exclusive(5),
//!         RangeOptions::new().withscores().limit(0, 10),
//!     )
//!     .await?;
//! # let _ = top;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod protocol;
pub mod zset;

pub use connection::Connection;
pub use error::{Result, ZsetError};
pub use executor::Executor;
pub use protocol::{Command, Value};
pub use zset::{LexBound, RangeOptions, RangeReply, Score, ScoreBound, SortedSetCommands};
