//! `%NNN` escapes for entering arbitrary bytes in search and replacement
//! strings. A percent sign must be followed by exactly three decimal digits;
//! a literal percent sign is written `%037`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
  #[error("percent sign at offset {offset} must be followed by three decimal digits")]
  MissingDigits { offset: usize },
  #[error("escape %{value:03} at offset {offset} does not fit in a byte")]
  OutOfRange { offset: usize, value: u16 },
}

pub type Result<T> = std::result::Result<T, EscapeError>;

const ESCAPE_DIGITS: usize = 3;

pub fn decode_percent_escapes(input: &[u8]) -> Result<Vec<u8>> {
  let mut out = Vec::with_capacity(input.len());
  let mut offset = 0;
  while offset < input.len() {
    let byte = input[offset];
    if byte != b'%' {
      out.push(byte);
      offset += 1;
      continue;
    }
    let digits = input
      .get(offset + 1..offset + 1 + ESCAPE_DIGITS)
      .filter(|digits| digits.iter().all(u8::is_ascii_digit))
      .ok_or(EscapeError::MissingDigits { offset })?;
    let value = digits
      .iter()
      .fold(0u16, |value, digit| value * 10 + u16::from(digit - b'0'));
    let byte = u8::try_from(value).map_err(|_| EscapeError::OutOfRange { offset, value })?;
    out.push(byte);
    offset += 1 + ESCAPE_DIGITS;
  }
  Ok(out)
}
