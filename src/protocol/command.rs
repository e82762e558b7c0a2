use std::fmt;

use bytes::Bytes;

use crate::protocol::resp::Value;

/// Conversion of a single positional command argument into wire bytes
pub trait ToArg {
    fn to_arg(&self) -> Bytes;
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for &[u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for &str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for i64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for u64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

/// A command ready for the executor: a fixed name token followed by
/// positional arguments in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: &'static str,
    args: Vec<Bytes>,
}

impl Command {
    /// Start a command with the given name token, e.g. `ZADD`
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Append one positional argument
    pub fn arg<A: ToArg>(mut self, arg: A) -> Self {
        self.args.push(arg.to_arg());
        self
    }

    /// Append `keyword value` when the value is present, e.g. `COUNT 10`
    pub fn opt_keyword_arg<A: ToArg>(self, keyword: &'static str, value: Option<A>) -> Self {
        match value {
            Some(value) => self.arg(keyword).arg(value),
            None => self,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Represent the command as a RESP array of bulk strings
    pub fn to_resp(&self) -> Value {
        let mut items = Vec::with_capacity(self.args.len() + 1);
        items.push(Value::bulk(self.name.as_bytes()));
        items.extend(self.args.iter().map(|arg| Value::bulk(arg.to_vec())));
        Value::Array(Some(items))
    }

    /// Encode the command to RESP bytes
    pub fn encode(&self) -> Vec<u8> {
        self.to_resp().encode()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", String::from_utf8_lossy(arg))?;
        }
        Ok(())
    }
}
