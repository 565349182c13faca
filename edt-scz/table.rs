//! Substitution tables and the header that stores them.
//!
//! A header is written in front of the body of every round:
//!
//! ```text
//! forcing  count  (marker first second) * count  0x5B
//! ```
//!
//! In the body a marker stands for its pair, the forcing byte makes the byte
//! after it literal, and anything else is itself.

use crate::error::{
  Result,
  SczError,
};

/// Byte closing every substitution header.
pub const BOUNDARY: u8 = 0x5B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
  pub marker: u8,
  pub pair:   [u8; 2],
}

/// One round's forcing byte and marker assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionTable {
  pub forcing: u8,
  pub entries: Vec<Substitution>,
}

/// What the encoder does with the input at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
  /// The pair starting here is replaced by entry `index`'s marker.
  Pair { index: usize },
  /// The byte is the forcing byte (`slot` 0) or the marker of entry
  /// `slot - 1` and must be escaped.
  Escaped { byte: u8, slot: usize },
  Literal(u8),
}

impl SubstitutionTable {
  pub fn new(forcing: u8, entries: Vec<Substitution>) -> Self {
    Self { forcing, entries }
  }

  pub fn header_len(&self) -> usize {
    3 * (self.entries.len() + 1)
  }

  pub fn write_header(&self, out: &mut Vec<u8>) {
    out.push(self.forcing);
    // Encoders never keep more than 250 entries.
    out.push(self.entries.len() as u8);
    for entry in &self.entries {
      out.extend_from_slice(&[entry.marker, entry.pair[0], entry.pair[1]]);
    }
    out.push(BOUNDARY);
  }

  /// Reads a header from the front of `input`, returning the table and the
  /// body that follows it.
  pub fn parse(input: &[u8]) -> Result<(Self, &[u8])> {
    let truncated = SczError::Truncated {
      context: "substitution header",
    };
    let [forcing, count, rest @ ..] = input else {
      return Err(truncated);
    };
    let table_len = 3 * usize::from(*count);
    if rest.len() <= table_len {
      return Err(truncated);
    }
    let (triples, rest) = rest.split_at(table_len);
    let entries = triples
      .chunks_exact(3)
      .map(|triple| {
        Substitution {
          marker: triple[0],
          pair:   [triple[1], triple[2]],
        }
      })
      .collect();
    match rest.split_first() {
      Some((&BOUNDARY, body)) => Ok((Self::new(*forcing, entries), body)),
      Some((&found, _)) => Err(SczError::MissingBoundary { found }),
      None => Err(truncated),
    }
  }

  /// Splits `data` into tokens, preferring a pair over an escape whenever
  /// both apply.
  pub fn tokens<'a>(&self, data: &'a [u8]) -> Tokens<'a> {
    let mut pairs = vec![None; 256 * 256];
    // A header holds at most 255 entries, so every index fits a byte.
    for (index, entry) in self.entries.iter().enumerate().take(usize::from(u8::MAX)) {
      let [first, second] = entry.pair;
      pairs[(usize::from(first) << 8) | usize::from(second)].get_or_insert(index as u8);
    }
    let mut slots = [None; 256];
    slots[usize::from(self.forcing)] = Some(0);
    for (index, entry) in self.entries.iter().enumerate() {
      slots[usize::from(entry.marker)] = Some(index + 1);
    }
    Tokens {
      data,
      at: 0,
      pairs,
      slots,
    }
  }

  /// Appends the encoded body of `data` to `out`.
  pub fn encode_body(&self, data: &[u8], out: &mut Vec<u8>) {
    for token in self.tokens(data) {
      match token {
        Token::Pair { index } => out.push(self.entries[index].marker),
        Token::Escaped { byte, .. } => out.extend_from_slice(&[self.forcing, byte]),
        Token::Literal(byte) => out.push(byte),
      }
    }
  }

  /// Expands an encoded body. Bytes produced by a marker are not scanned
  /// again.
  pub fn decode_body(&self, body: &[u8]) -> Result<Vec<u8>> {
    if self.entries.is_empty() {
      return Ok(body.to_vec());
    }
    let mut expansions: [Option<[u8; 2]>; 256] = [None; 256];
    for entry in &self.entries {
      expansions[usize::from(entry.marker)] = Some(entry.pair);
    }

    let mut out = Vec::with_capacity(body.len() + body.len() / 2);
    let mut bytes = body.iter().copied();
    while let Some(byte) = bytes.next() {
      if byte == self.forcing {
        out.push(bytes.next().ok_or(SczError::DanglingForcingByte)?);
      } else if let Some(pair) = expansions[usize::from(byte)] {
        out.extend_from_slice(&pair);
      } else {
        out.push(byte);
      }
    }
    Ok(out)
  }
}

/// Iterator returned by [`SubstitutionTable::tokens`].
pub struct Tokens<'a> {
  data:  &'a [u8],
  at:    usize,
  pairs: Vec<Option<u8>>,
  slots: [Option<usize>; 256],
}

impl Iterator for Tokens<'_> {
  type Item = Token;

  fn next(&mut self) -> Option<Token> {
    let byte = *self.data.get(self.at)?;
    if let Some(&second) = self.data.get(self.at + 1) {
      if let Some(index) = self.pairs[(usize::from(byte) << 8) | usize::from(second)] {
        self.at += 2;
        return Some(Token::Pair {
          index: usize::from(index),
        });
      }
    }
    self.at += 1;
    Some(match self.slots[usize::from(byte)] {
      Some(slot) => Token::Escaped { byte, slot },
      None => Token::Literal(byte),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table() -> SubstitutionTable {
    SubstitutionTable::new(0x00, vec![
      Substitution {
        marker: 0x01,
        pair:   *b"ab",
      },
      Substitution {
        marker: 0x02,
        pair:   [0x01, b'c'],
      },
    ])
  }

  #[test]
  fn header_layout() {
    let mut out = Vec::new();
    table().write_header(&mut out);
    assert_eq!(out, [0x00, 2, 0x01, b'a', b'b', 0x02, 0x01, b'c', BOUNDARY]);
    assert_eq!(out.len(), table().header_len());

    let mut input = out.clone();
    input.extend_from_slice(b"body");
    let (parsed, body) = SubstitutionTable::parse(&input).unwrap();
    assert_eq!(parsed, table());
    assert_eq!(body, b"body");
  }

  #[test]
  fn header_errors() {
    assert!(matches!(
      SubstitutionTable::parse(&[0, 1, 9, 9]),
      Err(SczError::Truncated { .. })
    ));
    assert!(matches!(
      SubstitutionTable::parse(&[0, 0, 0x5C]),
      Err(SczError::MissingBoundary { found: 0x5C })
    ));
    assert!(matches!(
      SubstitutionTable::parse(&[0]),
      Err(SczError::Truncated { .. })
    ));
  }

  #[test]
  fn pairs_win_over_escapes() {
    let table = table();
    let tokens: Vec<_> = table.tokens(&[0x01, b'c', b'a', b'b', 0x00]).collect();
    assert_eq!(tokens, [
      Token::Pair { index: 1 },
      Token::Pair { index: 0 },
      Token::Escaped { byte: 0x00, slot: 0 },
    ]);
  }

  #[test]
  fn body_round_trip_without_rescan() {
    let table = table();
    let data = [b'a', b'b', b'c', 0x01, 0x02, b'x', 0x00];
    let mut encoded = Vec::new();
    table.encode_body(&data, &mut encoded);
    assert_eq!(encoded, [0x01, b'c', 0x00, 0x01, 0x00, 0x02, b'x', 0x00, 0x00]);
    assert_eq!(table.decode_body(&encoded).unwrap(), data);
  }

  #[test]
  fn dangling_forcing_byte() {
    assert!(matches!(
      table().decode_body(&[b'x', 0x00]),
      Err(SczError::DanglingForcingByte)
    ));
  }
}
