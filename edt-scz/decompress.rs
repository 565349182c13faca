//! Undoing compression rounds.

use crate::{
  error::{
    Result,
    SczError,
  },
  frame::MAX_SEGMENT_LEN,
  table::SubstitutionTable,
};

/// Expands a segment payload compressed with `rounds` rounds.
///
/// Headers are peeled off front to back, so the first header read belongs to
/// the last round the encoder applied.
pub fn expand_segment(rounds: u8, payload: &[u8]) -> Result<Vec<u8>> {
  let mut data = payload.to_vec();
  for round in 0..rounds {
    let (table, body) = SubstitutionTable::parse(&data)?;
    let expanded = table.decode_body(body)?;
    if expanded.len() >= MAX_SEGMENT_LEN {
      return Err(SczError::SegmentTooLarge {
        len: expanded.len(),
        max: MAX_SEGMENT_LEN,
      });
    }
    tracing::trace!(round, entries = table.entries.len(), len = expanded.len(), "round expanded");
    data = expanded;
  }
  Ok(data)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compress::compress_segment;

  #[test]
  fn zero_rounds_is_identity() {
    assert_eq!(expand_segment(0, b"plain").unwrap(), b"plain");
    assert_eq!(expand_segment(0, b"").unwrap(), b"");
  }

  #[test]
  fn empty_table_leaves_body_alone() {
    assert_eq!(expand_segment(1, &[0x00, 0, 0x5B, 0x00, b'x']).unwrap(), [0x00, b'x']);
  }

  #[test]
  fn rejects_corrupted_headers() {
    let segment = compress_segment(&b"abcabcabcabcabcabcabcabcabcabc".repeat(4));
    assert!(segment.rounds > 0);

    let mut payload = segment.payload.clone();
    let boundary = 3 * (usize::from(payload[1]) + 1) - 1;
    payload[boundary] = 0x00;
    assert!(matches!(
      expand_segment(segment.rounds, &payload),
      Err(SczError::MissingBoundary { found: 0x00 })
    ));

    assert!(matches!(
      expand_segment(segment.rounds.saturating_add(1), &segment.payload),
      Err(SczError::Truncated { .. } | SczError::MissingBoundary { .. })
    ));
  }

  #[test]
  fn dangling_forcing_byte_is_an_error() {
    let payload = [0x07, 1, 0x01, b'a', b'b', 0x5B, 0x01, 0x07];
    assert!(matches!(
      expand_segment(1, &payload),
      Err(SczError::DanglingForcingByte)
    ));
  }
}
