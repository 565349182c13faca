//! Cursor and mark positions.
//!
//! A cursor is a cell handle plus values derived from it: the zero-based row
//! and the display column. It also remembers a goal column that vertical
//! motion tries to return to. A mark is a saved cursor that, together with
//! the live cursor, spans a range.

use crate::{
  buffer::TextBuffer,
  pool::CellId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
  pub cell:        CellId,
  pub row:         usize,
  pub column:      usize,
  pub goal_column: usize,
}

impl Cursor {
  /// Cursor on `cell` with row and column derived from the buffer. The goal
  /// column follows the actual column.
  pub fn at(buffer: &TextBuffer, cell: CellId) -> Self {
    let column = buffer.column(cell);
    Self {
      cell,
      row: buffer.row_of(cell),
      column,
      goal_column: column,
    }
  }

  /// Cursor on `cell` when its row is already known.
  pub fn on_row(buffer: &TextBuffer, cell: CellId, row: usize) -> Self {
    let column = buffer.column(cell);
    Self {
      cell,
      row,
      column,
      goal_column: column,
    }
  }

  /// Cursor on `cell` keeping `goal_column` for the next vertical move.
  pub fn with_goal(buffer: &TextBuffer, cell: CellId, goal_column: usize) -> Self {
    Self {
      goal_column,
      ..Self::at(buffer, cell)
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
  pub cell:   CellId,
  pub row:    usize,
  pub column: usize,
}

impl From<Cursor> for Mark {
  fn from(cursor: Cursor) -> Self {
    Self {
      cell:   cursor.cell,
      row:    cursor.row,
      column: cursor.column,
    }
  }
}

/// How a mark/cursor range is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDirection {
  /// The mark comes after the cursor. The range is `[cursor, mark)` and the
  /// cursor ends up on the mark.
  Forward,
  /// The mark precedes the cursor. The range is `[mark, cursor)` and the
  /// cursor stays put.
  Backward,
  /// Mark and cursor share a cell. The range is empty.
  NoOp,
}

/// Decides the range direction by comparing `(row, column)` of the mark with
/// the cursor's.
pub fn range_direction(mark: &Mark, cursor: &Cursor) -> RangeDirection {
  if mark.cell == cursor.cell {
    RangeDirection::NoOp
  } else if (mark.row, mark.column) < (cursor.row, cursor.column) {
    RangeDirection::Backward
  } else {
    RangeDirection::Forward
  }
}

/// The `[start, end)` cells covered by a mark and cursor, earliest first.
pub fn ordered_range(mark: &Mark, cursor: &Cursor) -> Option<(CellId, CellId)> {
  match range_direction(mark, cursor) {
    RangeDirection::Backward => Some((mark.cell, cursor.cell)),
    RangeDirection::Forward => Some((cursor.cell, mark.cell)),
    RangeDirection::NoOp => None,
  }
}
