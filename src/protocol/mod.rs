//! Redis protocol implementation
//!
//! This module provides RESP (REdis Serialization Protocol) encoding and
//! reply parsing, plus the `Command` builder used by every sorted-set
//! operation.

pub mod command;
pub mod resp;

pub use command::{Command, ToArg};
pub use resp::{FrameScanner, Parser, Value};

/// Parse a whole byte slice as a signed decimal integer.
///
/// Unlike a bare `atoi` call this rejects trailing garbage, so `b"10.5"`
/// yields `None` instead of `10`.
pub(crate) fn parse_i64(text: &[u8]) -> Option<i64> {
    let digits = match text.first() {
        Some(b'-') | Some(b'+') => &text[1..],
        _ => text,
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    atoi::atoi::<i64>(text)
}
