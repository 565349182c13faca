//! Singly-linked scratch buffers for deleted and cut text.
//!
//! Deletion walks text from right to left and pushes every byte on the
//! front, so reading from the front replays the text left to right.

use crate::pool::{
  CellId,
  CellPool,
};

#[derive(Debug, Clone, Default)]
pub struct ScratchBuffer {
  cells: CellPool,
  front: Option<CellId>,
  len:   usize,
}

impl ScratchBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push_front(&mut self, byte: u8) {
    let id = self.cells.alloc(byte);
    self.cells.get_mut(id).next = self.front;
    self.front = Some(id);
    self.len += 1;
  }

  /// Empties the buffer, returning its cells to the pool.
  pub fn clear(&mut self) {
    self.cells.clear();
    self.front = None;
    self.len = 0;
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.front.is_none()
  }

  pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
    let mut at = self.front;
    std::iter::from_fn(move || {
      let cell = self.cells.get(at?);
      at = cell.next;
      Some(cell.byte)
    })
  }

  pub fn to_vec(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.len);
    out.extend(self.iter());
    out
  }
}

/// The scratch state shared by every buffer of a session.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
  /// Filled by delete-word, replayed by undelete-word.
  pub word:  ScratchBuffer,
  /// Filled by delete-line, replayed by undelete-line.
  pub line:  ScratchBuffer,
  /// Filled by cut, replayed by paste and replace.
  pub paste: ScratchBuffer,
  /// The last byte removed by a single-character delete.
  pub char:  Option<u8>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn push_front_replays_in_original_order() {
    let mut scratch = ScratchBuffer::new();
    for &byte in b"olleh" {
      scratch.push_front(byte);
    }
    assert_eq!(scratch.to_vec(), b"hello");
    assert_eq!(scratch.len(), 5);
  }

  #[test]
  fn clear_empties() {
    let mut scratch = ScratchBuffer::new();
    scratch.push_front(b'x');
    scratch.clear();
    assert!(scratch.is_empty());
    assert_eq!(scratch.iter().count(), 0);
    scratch.push_front(b'y');
    assert_eq!(scratch.to_vec(), b"y");
  }
}
