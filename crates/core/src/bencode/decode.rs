//! Bencode decoder.

use num_bigint::BigInt;

use super::error::CodecError;
use super::value::{ByteString, Dict, Value};

/// Maximum nesting of lists and dictionaries accepted by the decoder.
pub const MAX_DEPTH: usize = 512;

/// Decodes one value from the front of `input`.
///
/// Returns the value and the unconsumed remainder of the input.
pub fn decode(input: &[u8]) -> Result<(Value, &[u8]), CodecError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.value(0)?;
    Ok((value, &input[decoder.pos..]))
}

/// Decodes a complete document: exactly one dictionary and nothing after it.
pub fn decode_document(input: &[u8]) -> Result<Dict, CodecError> {
    let (value, rest) = decode(input)?;
    if !rest.is_empty() {
        return Err(CodecError::malformed(
            input.len() - rest.len(),
            format!("{} trailing byte(s) after root value", rest.len()),
        ));
    }
    match value {
        Value::Dict(dict) => Ok(dict),
        other => Err(CodecError::malformed(
            0,
            format!("document root is a {}, expected a dictionary", other.kind()),
        )),
    }
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn value(&mut self, depth: usize) -> Result<Value, CodecError> {
        match self.peek() {
            Some(b'i') => self.integer(),
            Some(b'0'..=b'9') => self.byte_string().map(Value::Bytes),
            Some(b'l') => self.list(depth),
            Some(b'd') => self.dict(depth),
            Some(other) => Err(CodecError::malformed(
                self.pos,
                format!("unexpected byte 0x{:02x} at start of value", other),
            )),
            None => Err(CodecError::malformed(self.pos, "unexpected end of input")),
        }
    }

    /// Reads `[-]digits` up to (not including) `terminator`.
    ///
    /// Leading zeros and `-0` are accepted; encoding writes them back in
    /// canonical form.
    fn number(&mut self, terminator: u8, allow_negative: bool) -> Result<&'a str, CodecError> {
        let start = self.pos;
        let input = self.input;
        let rest = &input[start..];
        let len = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or_else(|| {
                CodecError::malformed(
                    start,
                    format!("missing '{}' terminator", terminator as char),
                )
            })?;
        let text = &rest[..len];

        let digits = match text.split_first() {
            Some((b'-', digits)) if allow_negative => digits,
            _ => text,
        };
        if digits.is_empty() {
            return Err(CodecError::malformed(start, "number has no digits"));
        }
        if let Some(bad) = digits.iter().position(|b| !b.is_ascii_digit()) {
            let offset = start + (text.len() - digits.len()) + bad;
            return Err(CodecError::malformed(offset, "non-digit byte in number"));
        }

        self.pos = start + len + 1;
        // Only ASCII digits and '-' remain, so this cannot fail.
        std::str::from_utf8(text).map_err(|_| CodecError::malformed(start, "invalid number"))
    }

    fn integer(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        self.pos += 1;
        let text = self.number(b'e', true)?;
        text.parse::<BigInt>()
            .map(Value::Integer)
            .map_err(|e| CodecError::malformed(start, format!("invalid integer: {}", e)))
    }

    fn byte_string(&mut self) -> Result<ByteString, CodecError> {
        let start = self.pos;
        let text = self.number(b':', false)?;
        let len: usize = text
            .parse()
            .map_err(|_| CodecError::malformed(start, "string length out of range"))?;

        let available = self.input.len() - self.pos;
        if len > available {
            return Err(CodecError::malformed(
                start,
                format!("string length {} exceeds {} remaining byte(s)", len, available),
            ));
        }

        let bytes = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(ByteString::from(bytes))
    }

    fn enter(&self, depth: usize) -> Result<usize, CodecError> {
        if depth >= MAX_DEPTH {
            return Err(CodecError::malformed(
                self.pos,
                format!("nesting deeper than {} levels", MAX_DEPTH),
            ));
        }
        Ok(depth + 1)
    }

    fn list(&mut self, depth: usize) -> Result<Value, CodecError> {
        let depth = self.enter(depth)?;
        let start = self.pos;
        self.pos += 1;

        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(b'e') => {
                    self.pos += 1;
                    return Ok(Value::List(items));
                }
                Some(_) => items.push(self.value(depth)?),
                None => return Err(CodecError::malformed(start, "unterminated list")),
            }
        }
    }

    fn dict(&mut self, depth: usize) -> Result<Value, CodecError> {
        let depth = self.enter(depth)?;
        let start = self.pos;
        self.pos += 1;

        let mut dict = Dict::new();
        loop {
            match self.peek() {
                Some(b'e') => {
                    self.pos += 1;
                    return Ok(Value::Dict(dict));
                }
                Some(b'0'..=b'9') => {
                    let key_offset = self.pos;
                    let key = self.byte_string()?;
                    let value = self.value(depth)?;
                    if dict.contains_key(&key) {
                        return Err(CodecError::malformed(
                            key_offset,
                            format!("duplicate dictionary key {:?}", key),
                        ));
                    }
                    dict.insert(key, value);
                }
                Some(other) => {
                    return Err(CodecError::malformed(
                        self.pos,
                        format!("dictionary key must be a byte string, found 0x{:02x}", other),
                    ))
                }
                None => return Err(CodecError::malformed(start, "unterminated dictionary")),
            }
        }
    }
}
