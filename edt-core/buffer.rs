//! Doubly-linked character buffer.
//!
//! # Overview
//!
//! A [`TextBuffer`] is a chain of byte cells between two sentinels: `head`,
//! which never holds editable content, and `eob`, the end-of-buffer cell. The
//! buffer is empty exactly when `head`'s successor is `eob`. Every editable
//! cell lies strictly between the two.
//!
//! Positions are [`CellId`] handles. A position means "insert before this
//! cell", so `eob` is the position after the last byte and [`TextBuffer::first`]
//! is the position before the first byte.
//!
//! # Design
//!
//! - Cells come from a [`CellPool`]; removing a cell returns it to the pool.
//! - Handles are validated on every dereference. Using a handle to a removed
//!   cell panics instead of reading unrelated text.
//! - Splicing before `head` or asking for the line start of `head` breaks the
//!   chain invariants and panics with a diagnostic.
//! - The buffer tracks its length and newline count incrementally and bumps a
//!   revision counter on every mutation.

use crate::{
  chars::{
    self,
    NEWLINE,
  },
  pool::{
    CellId,
    CellPool,
  },
};

/// Byte stored in the head sentinel.
pub const HEAD_TAG: u8 = b'B';

/// Byte stored in the end-of-buffer sentinel.
pub const EOB_TAG: u8 = 0;

/// What [`TextBuffer::load_bytes`] read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
  /// Newlines read from the input.
  pub lines:            usize,
  /// Bytes taken from the input.
  pub bytes:            usize,
  /// Whether a missing final newline had to be inserted.
  pub appended_newline: bool,
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
  cells:    CellPool,
  head:     CellId,
  eob:      CellId,
  len:      usize,
  newlines: usize,
  revision: u64,
}

impl Default for TextBuffer {
  fn default() -> Self {
    Self::new()
  }
}

impl TextBuffer {
  pub fn new() -> Self {
    let mut cells = CellPool::new();
    let head = cells.alloc(HEAD_TAG);
    let eob = cells.alloc(EOB_TAG);
    cells.get_mut(head).next = Some(eob);
    cells.get_mut(eob).prev = Some(head);

    Self {
      cells,
      head,
      eob,
      len: 0,
      newlines: 0,
      revision: 0,
    }
  }

  pub fn from_bytes(bytes: &[u8]) -> Self {
    let mut buffer = Self::new();
    buffer.insert_bytes_before(buffer.eob, bytes);
    buffer
  }

  #[inline]
  pub fn head(&self) -> CellId {
    self.head
  }

  #[inline]
  pub fn eob(&self) -> CellId {
    self.eob
  }

  /// The first editable cell, or `eob` when the buffer is empty.
  #[inline]
  pub fn first(&self) -> CellId {
    self.link_next(self.head)
  }

  /// The last editable cell.
  pub fn last(&self) -> Option<CellId> {
    let last = self.link_prev(self.eob);
    (last != self.head).then_some(last)
  }

  #[inline]
  pub fn is_sentinel(&self, id: CellId) -> bool {
    id == self.head || id == self.eob
  }

  /// Whether `id` is a live cell of this buffer.
  pub fn contains(&self, id: CellId) -> bool {
    self.cells.contains(id)
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Number of newline bytes in the buffer.
  #[inline]
  pub fn line_count(&self) -> usize {
    self.newlines
  }

  /// Incremented by every mutation.
  #[inline]
  pub fn revision(&self) -> u64 {
    self.revision
  }

  #[inline]
  pub fn byte(&self, id: CellId) -> u8 {
    self.cells.get(id).byte
  }

  /// Successor of `id`, `None` past `eob`.
  #[inline]
  pub fn next(&self, id: CellId) -> Option<CellId> {
    self.cells.get(id).next
  }

  /// Predecessor of `id`, `None` before `head`.
  #[inline]
  pub fn prev(&self, id: CellId) -> Option<CellId> {
    self.cells.get(id).prev
  }

  fn link_next(&self, id: CellId) -> CellId {
    match self.cells.get(id).next {
      Some(next) => next,
      None => panic!("cell {id:?} has no successor; the chain is corrupted"),
    }
  }

  fn link_prev(&self, id: CellId) -> CellId {
    match self.cells.get(id).prev {
      Some(prev) => prev,
      None => panic!("cell {id:?} has no predecessor; the chain is corrupted"),
    }
  }

  fn touch(&mut self) {
    self.revision = self.revision.wrapping_add(1);
  }

  /// Splices a new cell holding `byte` immediately before `at`.
  ///
  /// # Panics
  ///
  /// Panics if `at` is the head sentinel or a removed cell.
  pub fn insert_before(&mut self, at: CellId, byte: u8) -> CellId {
    assert!(at != self.head, "insertion before the buffer head");
    let prev = self.link_prev(at);
    let id = self.cells.alloc(byte);
    {
      let cell = self.cells.get_mut(id);
      cell.prev = Some(prev);
      cell.next = Some(at);
    }
    self.cells.get_mut(prev).next = Some(id);
    self.cells.get_mut(at).prev = Some(id);

    self.len += 1;
    if chars::is_newline(byte) {
      self.newlines += 1;
    }
    self.touch();
    id
  }

  /// Inserts `bytes` in order before `at`, returning the first new cell.
  pub fn insert_bytes_before(&mut self, at: CellId, bytes: &[u8]) -> Option<CellId> {
    let mut first = None;
    for &byte in bytes {
      let id = self.insert_before(at, byte);
      first.get_or_insert(id);
    }
    first
  }

  /// Unsplices `id` and hands its storage back to the pool.
  ///
  /// Removing a sentinel does nothing and returns `None`.
  pub fn remove(&mut self, id: CellId) -> Option<u8> {
    if self.is_sentinel(id) {
      return None;
    }
    let prev = self.link_prev(id);
    let next = self.link_next(id);
    self.cells.get_mut(prev).next = Some(next);
    self.cells.get_mut(next).prev = Some(prev);
    let byte = self.cells.free(id)?.byte;

    self.len -= 1;
    if chars::is_newline(byte) {
      self.newlines -= 1;
    }
    self.touch();
    Some(byte)
  }

  /// Overwrites the byte stored in an editable cell, returning the old one.
  ///
  /// # Panics
  ///
  /// Panics if `id` is a sentinel.
  pub fn set_byte(&mut self, id: CellId, byte: u8) -> u8 {
    assert!(!self.is_sentinel(id), "sentinel cells are not editable");
    let cell = self.cells.get_mut(id);
    let old = std::mem::replace(&mut cell.byte, byte);
    match (chars::is_newline(old), chars::is_newline(byte)) {
      (true, false) => self.newlines -= 1,
      (false, true) => self.newlines += 1,
      _ => {},
    }
    self.touch();
    old
  }

  /// First cell of the line containing `id`.
  ///
  /// # Panics
  ///
  /// Panics when called on the head sentinel.
  pub fn line_start(&self, id: CellId) -> CellId {
    assert!(id != self.head, "line start requested for the buffer head");
    let mut at = self.link_prev(id);
    while at != self.head && self.byte(at) != NEWLINE {
      at = self.link_prev(at);
    }
    self.link_next(at)
  }

  /// The newline ending the line that contains `id`, or `eob`.
  pub fn line_end(&self, id: CellId) -> CellId {
    let mut at = id;
    while at != self.eob && self.byte(at) != NEWLINE {
      at = self.link_next(at);
    }
    at
  }

  /// Steps back onto the newline that ends the previous line. Stops on the
  /// first cell when there is no previous line.
  pub fn up_line(&self, id: CellId) -> CellId {
    let first = self.first();
    let mut at = id;
    loop {
      if at != first {
        at = self.link_prev(at);
      }
      if at == first || self.byte(at) == NEWLINE {
        return at;
      }
    }
  }

  /// First cell of the next line, or `eob` when there is none.
  pub fn down_line(&self, id: CellId) -> CellId {
    let end = self.line_end(id);
    if end == self.eob {
      end
    } else {
      self.link_next(end)
    }
  }

  /// Display column of `id` within its line.
  pub fn column(&self, id: CellId) -> usize {
    if id == self.head {
      return 0;
    }
    self
      .cells_from(self.line_start(id))
      .take_while(|&at| at != id)
      .fold(0, |column, at| chars::advance_column(self.byte(at), column))
  }

  /// Zero-based line number of `id`.
  pub fn row_of(&self, id: CellId) -> usize {
    if id == self.head {
      return 0;
    }
    self
      .cells()
      .take_while(|&at| at != id)
      .filter(|&at| self.byte(at) == NEWLINE)
      .count()
  }

  /// First cell of line `row`. The line after a final newline starts at
  /// `eob`. Returns `None` past that.
  pub fn line_start_of_row(&self, row: usize) -> Option<CellId> {
    if row == 0 {
      return Some(self.first());
    }
    let mut seen = 0;
    for at in self.cells() {
      if self.byte(at) == NEWLINE {
        seen += 1;
        if seen == row {
          return Some(self.link_next(at));
        }
      }
    }
    None
  }

  /// Bytes of line `row` without its newline.
  pub fn line_bytes(&self, row: usize) -> Option<Vec<u8>> {
    let start = self.line_start_of_row(row)?;
    Some(
      self
        .cells_from(start)
        .map(|at| self.byte(at))
        .take_while(|&byte| byte != NEWLINE)
        .collect(),
    )
  }

  /// Editable cells from first to last.
  pub fn cells(&self) -> Cells<'_> {
    self.cells_from(self.first())
  }

  /// Editable cells from `id` up to, but excluding, `eob`.
  pub fn cells_from(&self, id: CellId) -> Cells<'_> {
    Cells {
      buffer: self,
      at:     if id == self.head { self.first() } else { id },
    }
  }

  pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
    self.cells().map(|at| self.byte(at))
  }

  pub fn contents(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.len);
    out.extend(self.bytes());
    out
  }

  /// Bytes to write out. A missing final newline is supplied, so an empty
  /// buffer serializes as a single newline.
  pub fn serialize(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.len + 1);
    out.extend(self.bytes());
    if out.last() != Some(&NEWLINE) {
      out.push(NEWLINE);
    }
    out
  }

  /// Appends a newline unless the buffer is empty or already ends in one.
  pub fn ensure_trailing_newline(&mut self) -> bool {
    match self.last() {
      Some(last) if self.byte(last) != NEWLINE => {
        self.insert_before(self.eob, NEWLINE);
        true
      },
      _ => false,
    }
  }

  /// Appends `bytes` at the end of the buffer, then makes sure the text ends
  /// with a newline.
  pub fn load_bytes(&mut self, bytes: &[u8]) -> LoadStats {
    self.load_bytes_before(self.eob, bytes)
  }

  /// Inserts `bytes` before `at`, then makes sure the text ends with a
  /// newline.
  pub fn load_bytes_before(&mut self, at: CellId, bytes: &[u8]) -> LoadStats {
    self.insert_bytes_before(at, bytes);
    let appended_newline = self.ensure_trailing_newline();
    if appended_newline {
      tracing::debug!("missing final newline inserted after {} bytes", bytes.len());
    }

    LoadStats {
      lines: bytes.iter().filter(|&&byte| byte == NEWLINE).count(),
      bytes: bytes.len(),
      appended_newline,
    }
  }
}

/// Iterator over cell handles, see [`TextBuffer::cells`].
pub struct Cells<'a> {
  buffer: &'a TextBuffer,
  at:     CellId,
}

impl Iterator for Cells<'_> {
  type Item = CellId;

  fn next(&mut self) -> Option<CellId> {
    if self.at == self.buffer.eob {
      return None;
    }
    let id = self.at;
    self.at = self.buffer.link_next(id);
    Some(id)
  }
}

#[cfg(test)]
mod tests {
  use quickcheck::quickcheck;

  use super::*;

  fn nth(buffer: &TextBuffer, index: usize) -> CellId {
    buffer.cells().nth(index).unwrap_or(buffer.eob())
  }

  #[test]
  fn empty_buffer_links_sentinels() {
    let buffer = TextBuffer::new();
    assert!(buffer.is_empty());
    assert_eq!(buffer.first(), buffer.eob());
    assert_eq!(buffer.prev(buffer.eob()), Some(buffer.head()));
    assert_eq!(buffer.next(buffer.eob()), None);
    assert_eq!(buffer.prev(buffer.head()), None);
    assert_eq!(buffer.byte(buffer.head()), HEAD_TAG);
    assert_eq!(buffer.last(), None);
  }

  #[test]
  fn insert_at_start_keeps_line_count() {
    let mut buffer = TextBuffer::from_bytes(b"ab\ncd\n");
    assert_eq!(buffer.line_count(), 2);
    buffer.insert_before(buffer.first(), b'X');
    assert_eq!(buffer.serialize(), b"Xab\ncd\n");
    assert_eq!(buffer.line_count(), 2);
  }

  #[test]
  #[should_panic(expected = "insertion before the buffer head")]
  fn insert_before_head_panics() {
    let mut buffer = TextBuffer::new();
    buffer.insert_before(buffer.head(), b'a');
  }

  #[test]
  #[should_panic(expected = "line start requested for the buffer head")]
  fn line_start_of_head_panics() {
    let buffer = TextBuffer::from_bytes(b"a\n");
    buffer.line_start(buffer.head());
  }

  #[test]
  fn removing_sentinels_is_a_no_op() {
    let mut buffer = TextBuffer::from_bytes(b"abc");
    let revision = buffer.revision();
    assert_eq!(buffer.remove(buffer.head()), None);
    assert_eq!(buffer.remove(buffer.eob()), None);
    assert_eq!(buffer.contents(), b"abc");
    assert_eq!(buffer.revision(), revision);
  }

  #[test]
  fn mutations_bump_revision() {
    let mut buffer = TextBuffer::new();
    let start = buffer.revision();
    let id = buffer.insert_before(buffer.eob(), b'a');
    buffer.set_byte(id, b'b');
    buffer.remove(id);
    assert_eq!(buffer.revision(), start + 3);
  }

  #[test]
  fn set_byte_tracks_newlines() {
    let mut buffer = TextBuffer::from_bytes(b"a b");
    let space = nth(&buffer, 1);
    buffer.set_byte(space, b'\n');
    assert_eq!(buffer.line_count(), 1);
    buffer.set_byte(space, b' ');
    assert_eq!(buffer.line_count(), 0);
  }

  #[test]
  fn line_navigation() {
    let buffer = TextBuffer::from_bytes(b"one\ntwo\nthree");
    let w = nth(&buffer, 5);
    assert_eq!(buffer.byte(w), b'w');
    assert_eq!(buffer.line_start(w), nth(&buffer, 4));
    assert_eq!(buffer.line_end(w), nth(&buffer, 7));
    assert_eq!(buffer.up_line(w), nth(&buffer, 3));
    assert_eq!(buffer.down_line(w), nth(&buffer, 8));
    assert_eq!(buffer.down_line(nth(&buffer, 9)), buffer.eob());
    assert_eq!(buffer.up_line(nth(&buffer, 1)), buffer.first());
    assert_eq!(buffer.line_end(nth(&buffer, 9)), buffer.eob());
    assert_eq!(buffer.line_start(buffer.eob()), nth(&buffer, 8));
  }

  #[test]
  fn rows_and_columns() {
    let buffer = TextBuffer::from_bytes(b"a\tb\n\x01c\n");
    assert_eq!(buffer.column(nth(&buffer, 2)), 8);
    assert_eq!(buffer.column(nth(&buffer, 3)), 9);
    assert_eq!(buffer.column(nth(&buffer, 5)), 2);
    assert_eq!(buffer.row_of(nth(&buffer, 5)), 1);
    assert_eq!(buffer.row_of(buffer.eob()), 2);
    assert_eq!(buffer.line_start_of_row(2), Some(buffer.eob()));
    assert_eq!(buffer.line_start_of_row(3), None);
    assert_eq!(buffer.line_bytes(1), Some(b"\x01c".to_vec()));
  }

  #[test]
  fn load_supplies_missing_newline() {
    let mut buffer = TextBuffer::new();
    let stats = buffer.load_bytes(b"one\ntwo");
    assert_eq!(stats, LoadStats {
      lines:            1,
      bytes:            7,
      appended_newline: true,
    });
    assert_eq!(buffer.contents(), b"one\ntwo\n");

    let mut empty = TextBuffer::new();
    assert!(!empty.load_bytes(b"").appended_newline);
    assert!(empty.is_empty());
    assert_eq!(empty.serialize(), b"\n");
  }

  quickcheck! {
    fn remove_undoes_insert(text: Vec<u8>, position: usize, byte: u8) -> bool {
      let mut buffer = TextBuffer::from_bytes(&text);
      let before = buffer.contents();
      let lines = buffer.line_count();
      let at = nth(&buffer, position % (text.len() + 1));
      let id = buffer.insert_before(at, byte);
      buffer.remove(id);
      buffer.contents() == before && buffer.line_count() == lines && buffer.len() == text.len()
    }

    fn newline_edits_move_line_count_by_one(text: Vec<u8>, position: usize) -> bool {
      let mut buffer = TextBuffer::from_bytes(&text);
      let lines = buffer.line_count();
      let at = nth(&buffer, position % (text.len() + 1));
      let id = buffer.insert_before(at, b'\n');
      let grew = buffer.line_count() == lines + 1;
      buffer.remove(id);
      grew && buffer.line_count() == lines
    }

    fn line_count_matches_contents(text: Vec<u8>) -> bool {
      let buffer = TextBuffer::from_bytes(&text);
      buffer.line_count() == text.iter().filter(|&&b| b == b'\n').count()
    }
  }
}
