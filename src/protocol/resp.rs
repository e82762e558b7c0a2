use crate::error::{Result, ZsetError};
use crate::protocol::parse_i64;

/// RESP (REdis Serialization Protocol) data types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// Simple strings, used for simple responses like "OK"
  SimpleString(String),
  /// Errors
  Error(String),
  /// Integers
  Integer(i64),
  /// Bulk strings, used for binary-safe strings (can be null)
  BulkString(Option<Vec<u8>>),
  /// Arrays of other values (can be null)
  Array(Option<Vec<Value>>),
}

impl Value {
  /// Create a bulk string value
  pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
    Value::BulkString(Some(data.into()))
  }

  /// Create an error reply
  pub fn error(msg: impl Into<String>) -> Self {
    Value::Error(msg.into())
  }

  /// Null bulk string
  pub fn nil() -> Self {
    Value::BulkString(None)
  }

  /// Whether this is a null bulk string or null array
  pub fn is_nil(&self) -> bool {
    matches!(self, Value::BulkString(None) | Value::Array(None))
  }

  /// Turn an error reply into `ZsetError::Server`, pass everything else through
  pub fn into_result(self) -> Result<Value> {
    match self {
      Value::Error(msg) => Err(ZsetError::Server(msg)),
      other => Ok(other),
    }
  }

  /// Encode Value to RESP bytes
  pub fn encode(&self) -> Vec<u8> {
    let mut buf = Vec::new();
    self.encode_to(&mut buf);
    buf
  }

  fn encode_to(&self, buf: &mut Vec<u8>) {
    match self {
      Value::SimpleString(s) => {
        buf.push(b'+');
        buf.extend_from_slice(s.as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::Error(e) => {
        buf.push(b'-');
        buf.extend_from_slice(e.as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::Integer(i) => {
        buf.push(b':');
        buf.extend_from_slice(i.to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::BulkString(None) => {
        buf.extend_from_slice(b"$-1\r\n");
      }
      Value::BulkString(Some(data)) => {
        buf.push(b'$');
        buf.extend_from_slice(data.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(data);
        buf.extend_from_slice(b"\r\n");
      }
      Value::Array(None) => {
        buf.extend_from_slice(b"*-1\r\n");
      }
      Value::Array(Some(items)) => {
        buf.push(b'*');
        buf.extend_from_slice(items.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        for item in items {
          item.encode_to(buf);
        }
      }
    }
  }
}

/// Deepest array nesting accepted in a reply
pub const MAX_DEPTH: usize = 64;

fn depth_exceeded() -> ZsetError {
  ZsetError::Protocol(format!("reply nested deeper than {} arrays", MAX_DEPTH))
}

/// Incremental parser for RESP replies
pub struct Parser;

impl Parser {
  /// Parse one value from the front of `buffer`.
  ///
  /// Returns `Ok(None)` while the buffer holds an incomplete value, and
  /// `Ok(Some((value, consumed_bytes)))` once a full value is available.
  pub fn parse(buffer: &[u8]) -> Result<Option<(Value, usize)>> {
    if buffer.is_empty() {
      return Ok(None);
    }

    let mut pos = 0;
    match Self::parse_value(buffer, &mut pos, 0)? {
      Some(value) => Ok(Some((value, pos))),
      None => Ok(None),
    }
  }

  fn parse_value(buffer: &[u8], pos: &mut usize, depth: usize) -> Result<Option<Value>> {
    if *pos >= buffer.len() {
      return Ok(None);
    }

    let type_byte = buffer[*pos];
    *pos += 1;

    match type_byte {
      b'+' => Ok(Self::read_line(buffer, pos).map(|line| {
        Value::SimpleString(String::from_utf8_lossy(line).to_string())
      })),
      b'-' => Ok(
        Self::read_line(buffer, pos)
          .map(|line| Value::Error(String::from_utf8_lossy(line).to_string())),
      ),
      b':' => match Self::read_line(buffer, pos) {
        Some(line) => Ok(Some(Value::Integer(Self::parse_len(line)?))),
        None => Ok(None),
      },
      b'$' => Self::parse_bulk_string(buffer, pos),
      b'*' => Self::parse_array(buffer, pos, depth),
      other => Err(ZsetError::Protocol(format!(
        "unknown reply type byte 0x{:02x}",
        other
      ))),
    }
  }

  fn parse_bulk_string(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>> {
    let line = match Self::read_line(buffer, pos) {
      Some(line) => line,
      None => return Ok(None),
    };
    let len = Self::parse_len(line)?;

    if len == -1 {
      return Ok(Some(Value::BulkString(None)));
    }

    if len < 0 {
      return Err(ZsetError::Protocol(format!("invalid bulk length {}", len)));
    }

    let len = len as usize;

    // Check if we have enough data (len + \r\n)
    if *pos + len + 2 > buffer.len() {
      return Ok(None);
    }

    if &buffer[*pos + len..*pos + len + 2] != b"\r\n" {
      return Err(ZsetError::Protocol("bulk string missing terminator".to_string()));
    }

    let data = buffer[*pos..*pos + len].to_vec();
    *pos += len + 2; // +2 for \r\n

    Ok(Some(Value::BulkString(Some(data))))
  }

  fn parse_array(buffer: &[u8], pos: &mut usize, depth: usize) -> Result<Option<Value>> {
    let line = match Self::read_line(buffer, pos) {
      Some(line) => line,
      None => return Ok(None),
    };
    let count = Self::parse_len(line)?;

    if count == -1 {
      return Ok(Some(Value::Array(None)));
    }

    if count < 0 {
      return Err(ZsetError::Protocol(format!("invalid array length {}", count)));
    }

    if count > 0 && depth >= MAX_DEPTH {
      return Err(depth_exceeded());
    }

    let count = count as usize;
    let mut items = Vec::with_capacity(count.min(1024));

    for _ in 0..count {
      match Self::parse_value(buffer, pos, depth + 1)? {
        Some(item) => items.push(item),
        None => return Ok(None),
      }
    }

    Ok(Some(Value::Array(Some(items))))
  }

  fn parse_len(line: &[u8]) -> Result<i64> {
    parse_i64(line).ok_or_else(|| {
      ZsetError::Protocol(format!(
        "invalid integer '{}'",
        String::from_utf8_lossy(line)
      ))
    })
  }

  fn read_line<'a>(buffer: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let start = *pos;
    let end = find_crlf(buffer, start)?;
    *pos = end + 2;
    Some(&buffer[start..end])
  }
}

fn find_crlf(buffer: &[u8], from: usize) -> Option<usize> {
  (from..buffer.len().saturating_sub(1)).find(|&i| buffer[i] == b'\r' && buffer[i + 1] == b'\n')
}

/// Finds where the first complete reply in a growing buffer ends.
///
/// Progress is kept between calls, so each byte is framed once no matter
/// how many reads the reply arrives in. Call [`FrameScanner::scan`] with the
/// same buffer (plus newly appended bytes) until it returns a length.
#[derive(Debug, Default)]
pub struct FrameScanner {
  pos: usize,
  /// Elements still expected by each open array, outermost first
  remaining: Vec<usize>,
}

impl FrameScanner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `Ok(Some(len))` once `buffer[..len]` holds one complete reply,
  /// and resets itself for the next reply.
  pub fn scan(&mut self, buffer: &[u8]) -> Result<Option<usize>> {
    loop {
      let start = self.pos;
      if start >= buffer.len() {
        return Ok(None);
      }
      let line_end = match find_crlf(buffer, start + 1) {
        Some(end) => end,
        None => return Ok(None),
      };
      let header = &buffer[start + 1..line_end];
      let mut next = line_end + 2;
      let mut children = 0;

      match buffer[start] {
        b'+' | b'-' => {}
        b':' => {
          Parser::parse_len(header)?;
        }
        b'$' => {
          let len = Parser::parse_len(header)?;
          if len >= 0 {
            let end = next + len as usize;
            if end + 2 > buffer.len() {
              return Ok(None);
            }
            if &buffer[end..end + 2] != b"\r\n" {
              return Err(ZsetError::Protocol("bulk string missing terminator".to_string()));
            }
            next = end + 2;
          } else if len != -1 {
            return Err(ZsetError::Protocol(format!("invalid bulk length {}", len)));
          }
        }
        b'*' => {
          let count = Parser::parse_len(header)?;
          if count > 0 {
            children = count as usize;
          } else if count < -1 {
            return Err(ZsetError::Protocol(format!("invalid array length {}", count)));
          }
        }
        other => {
          return Err(ZsetError::Protocol(format!(
            "unknown reply type byte 0x{:02x}",
            other
          )));
        }
      }

      self.pos = next;
      if children > 0 {
        if self.remaining.len() >= MAX_DEPTH {
          return Err(depth_exceeded());
        }
        self.remaining.push(children);
        continue;
      }

      // One value finished: close every array it completes
      loop {
        match self.remaining.last_mut() {
          None => {
            let len = self.pos;
            *self = Self::default();
            return Ok(Some(len));
          }
          Some(left) => {
            *left -= 1;
            if *left > 0 {
              break;
            }
            self.remaining.pop();
          }
        }
      }
    }
  }
}
