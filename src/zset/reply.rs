//! Reply decoding for sorted-set commands

use bytes::Bytes;

use crate::error::{Result, ZsetError};
use crate::protocol::Value;
use crate::zset::score::Score;

fn unexpected(what: &str, value: &Value) -> ZsetError {
    ZsetError::UnexpectedReply(format!("expected {}, got {:?}", what, value))
}

fn textual(value: &Value) -> Option<&[u8]> {
    match value {
        Value::BulkString(Some(data)) => Some(data.as_slice()),
        Value::SimpleString(s) => Some(s.as_bytes()),
        _ => None,
    }
}

/// Decode a textual number: integer if it parses as one, float otherwise
pub fn int_or_float(value: &Value) -> Result<Score> {
    let text = textual(value).ok_or_else(|| unexpected("textual score", value))?;
    Score::from_text(text).ok_or_else(|| {
        ZsetError::UnexpectedReply(format!(
            "'{}' is not a number",
            String::from_utf8_lossy(text)
        ))
    })
}

/// Score reply that may be nil, e.g. ZSCORE on a missing member
pub fn optional_score(value: Value) -> Result<Option<Score>> {
    let value = value.into_result()?;
    if value.is_nil() {
        return Ok(None);
    }
    int_or_float(&value).map(Some)
}

pub fn score(value: Value) -> Result<Score> {
    int_or_float(&value.into_result()?)
}

pub fn integer(value: Value) -> Result<i64> {
    match value.into_result()? {
        Value::Integer(i) => Ok(i),
        other => Err(unexpected("integer", &other)),
    }
}

/// Integer reply that may be nil, e.g. ZRANK on a missing member
pub fn optional_integer(value: Value) -> Result<Option<i64>> {
    let value = value.into_result()?;
    if value.is_nil() {
        return Ok(None);
    }
    integer(value).map(Some)
}

fn into_member(value: Value) -> Result<Bytes> {
    match value {
        Value::BulkString(Some(data)) => Ok(Bytes::from(data)),
        Value::SimpleString(s) => Ok(Bytes::from(s)),
        other => Err(unexpected("member", &other)),
    }
}

fn into_items(value: Value) -> Result<Vec<Value>> {
    match value.into_result()? {
        Value::Array(Some(items)) => Ok(items),
        Value::Array(None) => Ok(Vec::new()),
        other => Err(unexpected("array", &other)),
    }
}

/// Plain list of members
pub fn members(value: Value) -> Result<Vec<Bytes>> {
    into_items(value)?.into_iter().map(into_member).collect()
}

/// Flat `member, score, member, score, ...` reply into ordered pairs.
///
/// A trailing member without a score is dropped.
pub fn pairs_int_or_float(value: Value) -> Result<Vec<(Bytes, Score)>> {
    let mut items = into_items(value)?.into_iter();
    let mut pairs = Vec::with_capacity(items.len() / 2);
    while let (Some(member), Some(score)) = (items.next(), items.next()) {
        let score = int_or_float(&score)?;
        pairs.push((into_member(member)?, score));
    }
    Ok(pairs)
}

/// `[cursor, [member, score, ...]]` into the next cursor and the page
pub fn scan_page(value: Value) -> Result<(u64, Vec<(Bytes, Score)>)> {
    let items = into_items(value)?;
    let [cursor, page]: [Value; 2] = items
        .try_into()
        .map_err(|items: Vec<Value>| {
            ZsetError::UnexpectedReply(format!(
                "scan reply must have 2 elements, got {}",
                items.len()
            ))
        })?;

    let cursor = textual(&cursor)
        .filter(|text| !text.is_empty() && text.iter().all(u8::is_ascii_digit))
        .and_then(atoi::atoi::<u64>)
        .ok_or_else(|| unexpected("numeric cursor", &cursor))?;

    Ok((cursor, pairs_int_or_float(page)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(items: &[&str]) -> Value {
        Value::Array(Some(items.iter().map(|s| Value::bulk(*s)).collect()))
    }

    #[test]
    fn test_int_or_float() {
        assert!(matches!(int_or_float(&Value::bulk("10")), Ok(Score::Integer(10))));
        assert!(matches!(int_or_float(&Value::bulk("10.5")), Ok(Score::Float(f)) if f == 10.5));
        assert!(matches!(
            int_or_float(&Value::SimpleString("-inf".into())),
            Ok(Score::Float(f)) if f == f64::NEG_INFINITY
        ));
    }

    #[test]
    fn test_int_or_float_requires_text() {
        assert!(matches!(
            int_or_float(&Value::Integer(10)),
            Err(ZsetError::UnexpectedReply(_))
        ));
        assert!(matches!(
            int_or_float(&Value::nil()),
            Err(ZsetError::UnexpectedReply(_))
        ));
        assert!(matches!(
            int_or_float(&Value::bulk("ten")),
            Err(ZsetError::UnexpectedReply(_))
        ));
    }

    #[test]
    fn test_optional_score_nil() {
        assert!(optional_score(Value::nil()).unwrap().is_none());
        assert!(matches!(optional_score(Value::bulk("3")), Ok(Some(Score::Integer(3)))));
    }

    #[test]
    fn test_error_reply_surfaces() {
        let err = integer(Value::error("WRONGTYPE Operation against a key")).unwrap_err();
        assert!(matches!(err, ZsetError::Server(msg) if msg.starts_with("WRONGTYPE")));
    }

    #[test]
    fn test_optional_integer() {
        assert_eq!(optional_integer(Value::Integer(2)).unwrap(), Some(2));
        assert_eq!(optional_integer(Value::nil()).unwrap(), None);
        assert!(optional_integer(Value::bulk("2")).is_err());
    }

    #[test]
    fn test_pairs_preserve_order() {
        let pairs = pairs_int_or_float(array(&["a", "1", "b", "2.5"])).unwrap();
        assert_eq!(
            pairs,
            vec![
                (Bytes::from_static(b"a"), Score::Integer(1)),
                (Bytes::from_static(b"b"), Score::Float(2.5)),
            ]
        );
    }

    #[test]
    fn test_pairs_drop_trailing_member() {
        let pairs = pairs_int_or_float(array(&["a", "1", "b"])).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_members_empty_and_nil() {
        assert!(members(Value::Array(Some(vec![]))).unwrap().is_empty());
        assert!(members(Value::Array(None)).unwrap().is_empty());
        assert!(members(Value::Integer(1)).is_err());
    }

    #[test]
    fn test_scan_page() {
        let reply = Value::Array(Some(vec![Value::bulk("42"), array(&["m", "7", "n", "0.5"])]));
        let (cursor, page) = scan_page(reply).unwrap();
        assert_eq!(cursor, 42);
        assert_eq!(page[0], (Bytes::from_static(b"m"), Score::Integer(7)));
        assert_eq!(page[1], (Bytes::from_static(b"n"), Score::Float(0.5)));
    }

    #[test]
    fn test_scan_page_malformed() {
        assert!(scan_page(array(&["0"])).is_err());
        let bad_cursor = Value::Array(Some(vec![Value::bulk("x"), array(&[])]));
        assert!(matches!(scan_page(bad_cursor), Err(ZsetError::UnexpectedReply(_))));
    }
}
