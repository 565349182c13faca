//! Compression rounds.

use crate::{
  analyze::{
    self,
    Histogram,
  },
  table::{
    Substitution,
    SubstitutionTable,
    Token,
  },
};

/// A pair is kept only when it saves more than this many bytes, the size of
/// its header triple.
const PHRASE_THRESHOLD: i64 = 3;

/// A round must save at least this many bytes overall.
const MIN_SAVINGS: i64 = 6;

/// Most rounds a segment header can record.
pub const MAX_ROUNDS: u8 = u8::MAX;

/// Result of compressing one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedSegment {
  /// Rounds applied, each adding one header in front of the payload.
  pub rounds:  u8,
  pub payload: Vec<u8>,
}

/// Runs one round over `data`. Returns the header followed by the new body,
/// or `None` when no substitution pays for itself.
pub fn compress_round(data: &[u8]) -> Option<Vec<u8>> {
  if data.len() < 2 {
    return None;
  }
  let histogram = Histogram::of(data);
  let bytes = histogram.rank_bytes();
  let pairs = histogram.rank_pairs();
  let candidates = analyze::candidate_count(&bytes, &pairs);
  if candidates == 0 {
    return None;
  }

  let forcing = bytes[0].byte;
  let tentative = SubstitutionTable::new(
    forcing,
    (0..candidates)
      .map(|index| {
        Substitution {
          marker: bytes[index + 1].byte,
          pair:   pairs[index].pair,
        }
      })
      .collect(),
  );

  // Slot 0 counts escapes of the forcing byte, slot `i + 1` those of
  // entry `i`'s marker.
  let mut pair_hits = vec![0i64; candidates];
  let mut escapes = vec![0i64; candidates + 1];
  let mut saved = 0i64;
  for token in tentative.tokens(data) {
    match token {
      Token::Pair { index } => {
        pair_hits[index] += 1;
        saved += 1;
      },
      Token::Escaped { slot, .. } => {
        escapes[slot] += 1;
        saved -= 1;
      },
      Token::Literal(_) => {},
    }
  }
  if saved <= 1 {
    tracing::trace!(candidates, saved, "round rejected before filtering");
    return None;
  }

  let mut saved = -escapes[0];
  let mut kept = Vec::new();
  for (index, entry) in tentative.entries.iter().enumerate() {
    let gain = pair_hits[index] - escapes[index + 1];
    if gain > PHRASE_THRESHOLD {
      saved += gain - PHRASE_THRESHOLD;
      kept.push(*entry);
    }
  }
  if kept.is_empty() || saved < MIN_SAVINGS {
    tracing::trace!(candidates, kept = kept.len(), saved, "round rejected after filtering");
    return None;
  }

  let table = SubstitutionTable::new(forcing, kept);
  let mut out = Vec::with_capacity(table.header_len() + data.len());
  table.write_header(&mut out);
  table.encode_body(data, &mut out);
  tracing::trace!(
    candidates,
    kept = table.entries.len(),
    saved,
    from = data.len(),
    to = out.len(),
    "round committed"
  );
  Some(out)
}

/// Applies rounds until one fails to pay or the round limit is reached.
pub fn compress_segment(data: &[u8]) -> CompressedSegment {
  let mut payload = data.to_vec();
  let mut rounds = 0;
  while rounds < MAX_ROUNDS {
    match compress_round(&payload) {
      Some(next) => {
        payload = next;
        rounds += 1;
      },
      None => break,
    }
  }
  CompressedSegment { rounds, payload }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    decompress::expand_segment,
    frame::{
      self,
      CompressOptions,
    },
  };

  #[test]
  fn short_runs_do_not_pay() {
    let segment = compress_segment(&[b'a'; 16]);
    assert_eq!(segment.rounds, 0);
    assert_eq!(segment.payload, [b'a'; 16]);
    assert_eq!(compress_round(b""), None);
    assert_eq!(compress_round(b"x"), None);
  }

  #[test]
  fn long_runs_shrink() {
    let data = [b'a'; 64];
    let segment = compress_segment(&data);
    assert!(segment.rounds > 0);
    assert!(segment.payload.len() < data.len());
    assert_eq!(expand_segment(segment.rounds, &segment.payload).unwrap(), data);
  }

  #[test]
  fn first_round_layout() {
    let data = b"abababababababababab";
    let round = compress_round(data).unwrap();
    // Forcing byte 0x00, one entry mapping marker 0x01 to "ab".
    assert_eq!(&round[..6], &[0x00, 1, 0x01, b'a', b'b', 0x5B]);
    assert_eq!(&round[6..], &[0x01; 10]);
  }

  #[test]
  fn natural_markers_are_escaped() {
    let mut data: Vec<u8> = (0..=u8::MAX).collect();
    data.extend_from_slice(&b"ab".repeat(40));
    let round = compress_round(&data).unwrap();
    assert_eq!(&round[..6], &[0x00, 1, 0x01, b'a', b'b', 0x5B]);
    // 0x00 and 0x01 are escaped, 0x02 lost its marker role in filtering.
    assert_eq!(&round[6..11], &[0x00, 0x00, 0x00, 0x01, 0x02]);
    assert_eq!(expand_segment(1, &round).unwrap(), data);
  }

  #[test]
  fn text_compresses_over_several_rounds() {
    let text = b"the quick brown fox jumps over the lazy dog. ".repeat(40);
    let segment = compress_segment(&text);
    assert!(segment.rounds > 1);
    assert!(segment.payload.len() < text.len() / 2);
    assert_eq!(expand_segment(segment.rounds, &segment.payload).unwrap(), text);
  }

  #[test]
  fn multi_round_container_is_stable() {
    let text = b"the cat sat on the mat. ".repeat(300);
    let packed = frame::compress(&text, &CompressOptions::default()).unwrap();
    #[rustfmt::skip]
    let expected: [u8; 166] = [
      0x65, 0x62, 0x08, 0x00, 0x00, 0x9E, 0x29, 0x03, 0x2A, 0x28, 0x27, 0x2B,
      0x27, 0x26, 0x2C, 0x26, 0x28, 0x5B, 0x25, 0x03, 0x26, 0x24, 0x22, 0x27,
      0x22, 0x23, 0x28, 0x23, 0x24, 0x5B, 0x21, 0x03, 0x22, 0x1F, 0x1D, 0x23,
      0x1E, 0x1F, 0x24, 0x1D, 0x1E, 0x5B, 0x1C, 0x03, 0x1D, 0x1B, 0x1A, 0x1E,
      0x19, 0x1B, 0x1F, 0x1A, 0x19, 0x5B, 0x15, 0x03, 0x19, 0x12, 0x16, 0x1A,
      0x16, 0x18, 0x1B, 0x18, 0x12, 0x5B, 0x09, 0x03, 0x12, 0x0D, 0x10, 0x16,
      0x11, 0x13, 0x18, 0x17, 0x14, 0x5B, 0x08, 0x06, 0x0D, 0x05, 0x02, 0x10,
      0x0A, 0x03, 0x11, 0x0C, 0x03, 0x13, 0x0F, 0x06, 0x14, 0x01, 0x07, 0x17,
      0x04, 0x0E, 0x5B, 0x00, 0x0B, 0x01, 0x61, 0x74, 0x02, 0x65, 0x20, 0x03,
      0x74, 0x20, 0x04, 0x68, 0x65, 0x05, 0x74, 0x68, 0x06, 0x20, 0x74, 0x07,
      0x2E, 0x20, 0x0A, 0x63, 0x61, 0x0C, 0x73, 0x61, 0x0E, 0x20, 0x6D, 0x0F,
      0x6F, 0x6E, 0x5B, 0x2A, 0x2C, 0x2B, 0x2A, 0x2C, 0x2B, 0x2A, 0x2C, 0x2B,
      0x2A, 0x2C, 0x2B, 0x2A, 0x2C, 0x2B, 0x2A, 0x2C, 0x2B, 0x2A, 0x2C, 0x2B,
      0x2A, 0x2C, 0x2B, 0x2A, 0x2C, 0x2B, 0x2A, 0x1D, 0x94, 0x5D,
    ];
    assert_eq!(packed, expected);
    assert_eq!(packed[2], 8);
    assert_eq!(expand_segment(packed[2], &packed[6..164]).unwrap(), text);
  }
}
