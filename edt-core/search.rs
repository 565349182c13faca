//! Pattern search and global substitution over a [`TextBuffer`].

use smallvec::SmallVec;

use crate::{
  buffer::TextBuffer,
  chars,
  pool::CellId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
  #[default]
  Forward,
  Backward,
}

impl SearchDirection {
  pub fn reverse(self) -> Self {
    match self {
      Self::Forward => Self::Backward,
      Self::Backward => Self::Forward,
    }
  }
}

/// A byte string to look for.
///
/// The empty pattern stands for "no search string entered yet" and never
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
  bytes:                SmallVec<[u8; 32]>,
  pub case_insensitive: bool,
}

impl Pattern {
  pub fn new(bytes: &[u8], case_insensitive: bool) -> Self {
    Self {
      bytes: SmallVec::from_slice(bytes),
      case_insensitive,
    }
  }

  #[inline]
  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

/// Whether `pattern` occurs contiguously starting at `at`. Matches never
/// run into `eob`.
pub fn matches_at(buffer: &TextBuffer, at: CellId, pattern: &Pattern) -> bool {
  if pattern.is_empty() || buffer.is_sentinel(at) {
    return false;
  }
  let mut cells = buffer.cells_from(at);
  pattern.bytes().iter().all(|&wanted| {
    cells.next().is_some_and(|cell| {
      chars::bytes_match(buffer.byte(cell), wanted, pattern.case_insensitive)
    })
  })
}

/// Scans from `start` in `direction` for the next cell where `pattern`
/// matches. `start` itself is never reported. A forward scan stops at `eob`,
/// a backward scan at the first cell.
pub fn find(
  buffer: &TextBuffer,
  start: CellId,
  pattern: &Pattern,
  direction: SearchDirection,
) -> Option<CellId> {
  if pattern.is_empty() {
    return None;
  }
  let step = |at: CellId| match direction {
    SearchDirection::Forward => buffer.next(at).filter(|&next| next != buffer.eob()),
    SearchDirection::Backward => buffer.prev(at).filter(|&prev| prev != buffer.head()),
  };
  let mut at = step(start);
  while let Some(cell) = at {
    if matches_at(buffer, cell, pattern) {
      return Some(cell);
    }
    at = step(cell);
  }
  None
}

/// Replaces every occurrence of `pattern` with `replacement` in one pass from
/// the start of the buffer, resuming the scan after each inserted
/// replacement. When anything was replaced the buffer is made to end with a
/// newline. An empty pattern replaces nothing.
pub fn substitute_all(buffer: &mut TextBuffer, pattern: &Pattern, replacement: &[u8]) -> usize {
  if pattern.is_empty() {
    return 0;
  }
  let mut count = 0;
  let mut at = buffer.first();
  while at != buffer.eob() {
    if !matches_at(buffer, at, pattern) {
      at = buffer.next(at).unwrap_or(buffer.eob());
      continue;
    }
    for _ in 0..pattern.len() {
      let next = buffer.next(at).unwrap_or(buffer.eob());
      buffer.remove(at);
      at = next;
    }
    buffer.insert_bytes_before(at, replacement);
    count += 1;
  }
  if count > 0 {
    buffer.ensure_trailing_newline();
    tracing::debug!(count, "substitutions made");
  }
  count
}
