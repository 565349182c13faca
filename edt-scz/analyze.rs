//! Byte and pair frequencies of a segment, and the rankings built on them.

/// Byte pairs considered as substitution candidates per round.
pub const MAX_CANDIDATES: usize = 250;

/// A pair must occur more than this many times beyond its marker's own
/// frequency to be considered.
pub const PAIR_MARGIN: u32 = 3;

/// Occurrence counts for every byte value and every ordered byte pair.
#[derive(Clone)]
pub struct Histogram {
  bytes: [u32; 256],
  /// Indexed by `first * 256 + second`.
  pairs: Vec<u32>,
}

impl std::fmt::Debug for Histogram {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Histogram")
      .field("distinct_bytes", &self.bytes.iter().filter(|&&n| n > 0).count())
      .field("distinct_pairs", &self.pairs.iter().filter(|&&n| n > 0).count())
      .finish()
  }
}

/// A byte value with its frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedByte {
  pub byte:  u8,
  pub count: u32,
}

/// An ordered byte pair with its frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedPair {
  pub pair:  [u8; 2],
  pub count: u32,
}

impl Histogram {
  pub fn of(data: &[u8]) -> Self {
    let mut bytes = [0u32; 256];
    let mut pairs = vec![0u32; 256 * 256];
    for &byte in data {
      bytes[usize::from(byte)] += 1;
    }
    for window in data.windows(2) {
      pairs[pair_index(window[0], window[1])] += 1;
    }
    Self { bytes, pairs }
  }

  pub fn byte_count(&self, byte: u8) -> u32 {
    self.bytes[usize::from(byte)]
  }

  pub fn pair_count(&self, first: u8, second: u8) -> u32 {
    self.pairs[pair_index(first, second)]
  }

  /// Byte values from least to most used, ties in value order. Only the
  /// first `MAX_CANDIDATES + 1` are kept: one forcing byte and one marker
  /// per candidate.
  pub fn rank_bytes(&self) -> Vec<RankedByte> {
    let mut ranked: Vec<_> = (0..=u8::MAX)
      .map(|byte| {
        RankedByte {
          byte,
          count: self.byte_count(byte),
        }
      })
      .collect();
    ranked.sort_by_key(|entry| entry.count);
    ranked.truncate(MAX_CANDIDATES + 1);
    ranked
  }

  /// Pairs that occur at all, from most to least used. Ties keep scan order,
  /// which walks the second byte in the outer loop.
  pub fn rank_pairs(&self) -> Vec<RankedPair> {
    let mut ranked = Vec::new();
    for second in 0..=u8::MAX {
      for first in 0..=u8::MAX {
        let count = self.pair_count(first, second);
        if count > 0 {
          ranked.push(RankedPair {
            pair: [first, second],
            count,
          });
        }
      }
    }
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(MAX_CANDIDATES);
    ranked
  }
}

#[inline]
fn pair_index(first: u8, second: u8) -> usize {
  (usize::from(first) << 8) | usize::from(second)
}

/// Number of leading candidates whose pair beats the next unused byte value
/// by more than [`PAIR_MARGIN`].
pub fn candidate_count(bytes: &[RankedByte], pairs: &[RankedPair]) -> usize {
  let mut count = 0;
  while count < MAX_CANDIDATES {
    let (Some(marker), Some(pair)) = (bytes.get(count + 1), pairs.get(count)) else {
      break;
    };
    if u64::from(marker.count) + u64::from(PAIR_MARGIN) >= u64::from(pair.count) {
      break;
    }
    count += 1;
  }
  count
}
