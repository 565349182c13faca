//! Block-allocated storage for chain cells.
//!
//! Cells are addressed by generational [`CellId`] keys, so a handle to a
//! removed cell can never alias a newer one. Removed slots go back on the
//! slot map's free list and are handed out again before the pool grows. When
//! every slot is in use the pool reserves another [`BLOCK_CELLS`] slots at
//! once. Storage is never returned to the system while the pool lives.

use slotmap::{
  SlotMap,
  new_key_type,
};

new_key_type! {
  /// Stable handle to a cell owned by a [`CellPool`].
  pub struct CellId;
}

/// Number of cells reserved each time the pool runs dry.
pub const BLOCK_CELLS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
  pub byte: u8,
  pub prev: Option<CellId>,
  pub next: Option<CellId>,
}

impl Cell {
  fn detached(byte: u8) -> Self {
    Self {
      byte,
      prev: None,
      next: None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct CellPool {
  cells: SlotMap<CellId, Cell>,
}

impl Default for CellPool {
  fn default() -> Self {
    Self::new()
  }
}

impl CellPool {
  pub fn new() -> Self {
    Self {
      cells: SlotMap::with_capacity_and_key(BLOCK_CELLS),
    }
  }

  /// Takes a detached cell holding `byte` from the free list.
  pub fn alloc(&mut self, byte: u8) -> CellId {
    if self.cells.len() >= self.cells.capacity() {
      self.cells.reserve(BLOCK_CELLS);
    }
    self.cells.insert(Cell::detached(byte))
  }

  /// Returns a cell to the free list. Freeing a stale handle is a no-op.
  pub fn free(&mut self, id: CellId) -> Option<Cell> {
    self.cells.remove(id)
  }

  #[inline]
  pub fn contains(&self, id: CellId) -> bool {
    self.cells.contains_key(id)
  }

  /// Validated dereference.
  ///
  /// # Panics
  ///
  /// Panics if `id` refers to a cell that was already freed.
  #[inline]
  pub fn get(&self, id: CellId) -> &Cell {
    match self.cells.get(id) {
      Some(cell) => cell,
      None => panic!("dangling cell reference {id:?}"),
    }
  }

  #[inline]
  pub fn get_mut(&mut self, id: CellId) -> &mut Cell {
    match self.cells.get_mut(id) {
      Some(cell) => cell,
      None => panic!("dangling cell reference {id:?}"),
    }
  }

  /// Cells currently handed out.
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// Cells the pool can hand out before it reserves another block.
  pub fn capacity(&self) -> usize {
    self.cells.capacity()
  }

  /// Drops every cell while keeping the reserved storage.
  pub fn clear(&mut self) {
    self.cells.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn freed_cells_are_reused_before_growing() {
    let mut pool = CellPool::new();
    let ids: Vec<_> = (0..BLOCK_CELLS).map(|i| pool.alloc(i as u8)).collect();
    let capacity = pool.capacity();

    pool.free(ids[10]);
    pool.alloc(b'x');
    assert_eq!(pool.capacity(), capacity);
    assert_eq!(pool.len(), BLOCK_CELLS);
  }

  #[test]
  fn grows_by_whole_blocks() {
    let mut pool = CellPool::new();
    let start = pool.capacity();
    for _ in 0..=start {
      pool.alloc(0);
    }
    assert!(pool.capacity() >= start + BLOCK_CELLS);
  }

  #[test]
  fn stale_handles_do_not_alias() {
    let mut pool = CellPool::new();
    let old = pool.alloc(b'a');
    pool.free(old);
    let new = pool.alloc(b'b');
    assert_ne!(old, new);
    assert!(!pool.contains(old));
    assert_eq!(pool.get(new).byte, b'b');
  }

  #[test]
  #[should_panic(expected = "dangling cell reference")]
  fn dereferencing_freed_cell_panics() {
    let mut pool = CellPool::new();
    let id = pool.alloc(b'a');
    pool.free(id);
    pool.get(id);
  }
}
