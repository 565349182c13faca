//! Cursor motion.
//!
//! Vertical motion keeps the goal column of the cursor so a run of up and
//! down moves through short lines returns to the original column. Every other
//! motion resets the goal to the column it lands on.

use crate::{
  buffer::TextBuffer,
  chars::{
    self,
    NEWLINE,
    TAB,
  },
  cursor::Cursor,
  pool::CellId,
  search::{
    self,
    SearchDirection,
  },
  session::{
    EditorSession,
    Result,
    SessionError,
  },
};

/// Walks from `start` towards `goal` display columns, stopping at the end of
/// the line. Lands on the cell before an overshooting wide byte.
fn seek_column(text: &TextBuffer, start: CellId, goal: usize) -> CellId {
  let eob = text.eob();
  let mut at = start;
  let mut column = 0;
  while at != eob && text.byte(at) != NEWLINE && column < goal {
    column = chars::advance_column(text.byte(at), column);
    match text.next(at) {
      Some(next) => at = next,
      None => break,
    }
  }
  if column > goal && at != text.first() {
    if let Some(prev) = text.prev(at) {
      at = prev;
    }
  }
  at
}

impl EditorSession {
  pub fn move_left(&mut self) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    if cursor.cell == record.text.first() {
      return Err(SessionError::PastStart);
    }
    let prev = record.text.prev(cursor.cell).ok_or(SessionError::PastStart)?;
    let row = cursor.row - usize::from(record.text.byte(prev) == NEWLINE);
    record.cursor = Cursor::on_row(&record.text, prev, row);
    Ok(())
  }

  pub fn move_right(&mut self) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    if cursor.cell == record.text.eob() {
      return Err(SessionError::PastEnd);
    }
    let next = record.text.next(cursor.cell).ok_or(SessionError::PastEnd)?;
    let row = cursor.row + usize::from(record.text.byte(cursor.cell) == NEWLINE);
    record.cursor = Cursor::on_row(&record.text, next, row);
    Ok(())
  }

  pub fn move_up(&mut self) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    if cursor.row == 0 {
      return Err(SessionError::PastStart);
    }
    let start = record.text.line_start(record.text.up_line(cursor.cell));
    let cell = seek_column(&record.text, start, cursor.goal_column);
    record.cursor = Cursor {
      goal_column: cursor.goal_column,
      ..Cursor::on_row(&record.text, cell, cursor.row - 1)
    };
    Ok(())
  }

  pub fn move_down(&mut self) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    let eob = record.text.eob();
    let end = record.text.line_end(cursor.cell);
    if end == eob {
      return Err(SessionError::PastEnd);
    }
    let start = record.text.next(end).ok_or(SessionError::PastEnd)?;
    let cell = seek_column(&record.text, start, cursor.goal_column);
    record.cursor = Cursor {
      goal_column: cursor.goal_column,
      ..Cursor::on_row(&record.text, cell, cursor.row + 1)
    };
    Ok(())
  }

  /// Moves to the start of the next word, or back to the start of the
  /// previous one. Newlines and tabs count as words of their own.
  pub fn move_word(&mut self, direction: SearchDirection) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    let text = &record.text;
    let (cell, row) = match direction {
      SearchDirection::Forward => {
        let eob = text.eob();
        if cursor.cell == eob {
          return Err(SessionError::PastEnd);
        }
        let byte = text.byte(cursor.cell);
        let mut at = cursor.cell;
        if byte == NEWLINE || byte == TAB {
          at = text.next(at).ok_or(SessionError::PastEnd)?;
        } else {
          while at != eob && !chars::is_word_delimiter(text.byte(at)) {
            at = text.next(at).ok_or(SessionError::PastEnd)?;
          }
          while at != eob && text.byte(at) == b' ' {
            at = text.next(at).ok_or(SessionError::PastEnd)?;
          }
        }
        (at, cursor.row + usize::from(byte == NEWLINE))
      },
      SearchDirection::Backward => {
        let head = text.head();
        if cursor.cell == text.first() {
          return Err(SessionError::PastStart);
        }
        let mut at = text.prev(cursor.cell).ok_or(SessionError::PastStart)?;
        let byte = text.byte(at);
        if byte == NEWLINE {
          (at, cursor.row - 1)
        } else if byte == TAB {
          (at, cursor.row)
        } else {
          while at != head && text.byte(at) == b' ' {
            at = text.prev(at).ok_or(SessionError::PastStart)?;
          }
          while at != head && !chars::is_word_delimiter(text.byte(at)) {
            at = text.prev(at).ok_or(SessionError::PastStart)?;
          }
          (text.next(at).ok_or(SessionError::PastStart)?, cursor.row)
        }
      },
    };
    record.cursor = Cursor::on_row(&record.text, cell, row);
    Ok(())
  }

  /// Forward: to the end of this line, or of the next one when already on a
  /// line end. Backward: to the end of the previous line.
  pub fn move_line_end(&mut self, direction: SearchDirection) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    let text = &record.text;
    let cell = match direction {
      SearchDirection::Forward => {
        if cursor.cell == text.eob() {
          return Err(SessionError::PastEnd);
        }
        let mut at = cursor.cell;
        if text.byte(at) == NEWLINE {
          at = text.down_line(at);
        }
        text.line_end(at)
      },
      SearchDirection::Backward => {
        if cursor.cell == text.first() {
          return Err(SessionError::PastStart);
        }
        text.line_end(text.up_line(cursor.cell))
      },
    };
    self.place_cursor(cell);
    Ok(())
  }

  /// Forward: to the start of the next line. Backward: to the start of this
  /// line, or of the previous one when already at a line start.
  pub fn move_line_start(&mut self, direction: SearchDirection) -> Result<()> {
    let record = self.record_mut();
    let cursor = record.cursor;
    let text = &record.text;
    let (cell, row) = match direction {
      SearchDirection::Forward => {
        let next = text.down_line(cursor.cell);
        if cursor.cell == text.eob() || (next == text.eob() && text.line_end(cursor.cell) == next) {
          return Err(SessionError::PastEnd);
        }
        (next, cursor.row + 1)
      },
      SearchDirection::Backward => {
        if cursor.cell == text.first() {
          return Err(SessionError::PastStart);
        }
        let prev = text.prev(cursor.cell).ok_or(SessionError::PastStart)?;
        if text.byte(prev) == NEWLINE {
          (text.line_start(prev), cursor.row - 1)
        } else {
          (text.line_start(cursor.cell), cursor.row)
        }
      },
    };
    self.place_cursor_on_row(cell, row);
    Ok(())
  }

  /// Moves a page of rows, clamped to the buffer, landing on a line start.
  pub fn move_page(&mut self, direction: SearchDirection) -> Result<()> {
    let page = self.settings.page_rows.max(1);
    let record = self.record_mut();
    let cursor = record.cursor;
    let text = &record.text;
    let (cell, row) = match direction {
      SearchDirection::Forward => {
        let last_row = text.line_count();
        if cursor.row >= last_row {
          return Err(SessionError::PastEnd);
        }
        let row = (cursor.row + page).min(last_row);
        let mut at = cursor.cell;
        for _ in cursor.row..row {
          at = text.down_line(at);
        }
        (at, row)
      },
      SearchDirection::Backward => {
        if cursor.cell == text.first() {
          return Err(SessionError::PastStart);
        }
        let steps = page.min(cursor.row);
        let mut at = cursor.cell;
        for _ in 0..steps {
          at = text.up_line(at);
        }
        (text.line_start(at), cursor.row - steps)
      },
    };
    if row != cursor.row || cell != cursor.cell {
      tracing::trace!(from = cursor.row, to = row, "page motion");
    }
    self.place_cursor_on_row(cell, row);
    Ok(())
  }

  /// Jumps to the first cell. Later direction-sensitive commands then run
  /// forward.
  pub fn move_to_top(&mut self) {
    let first = self.text().first();
    self.place_cursor_on_row(first, 0);
    self.direction = SearchDirection::Forward;
  }

  /// Jumps to end of buffer. Later direction-sensitive commands then run
  /// backward.
  pub fn move_to_bottom(&mut self) {
    let eob = self.text().eob();
    let row = self.text().line_count();
    self.place_cursor_on_row(eob, row);
    self.direction = SearchDirection::Backward;
  }

  /// Moves to the start of the one-based `line`, clamped to the last line.
  /// Returns the line reached.
  pub fn goto_line(&mut self, line: usize) -> usize {
    let row = line.saturating_sub(1).min(self.line_count());
    let cell = self
      .text()
      .line_start_of_row(row)
      .unwrap_or_else(|| self.text().eob());
    self.place_cursor_on_row(cell, row);
    row + 1
  }

  /// Moves to the next match of the search string in the current direction.
  /// Returns whether one was found. The cursor stays put otherwise.
  pub fn search_next(&mut self) -> bool {
    let cursor = self.cursor();
    let found = search::find(self.text(), cursor.cell, &self.pattern, self.direction);
    match found {
      Some(cell) => {
        self.place_cursor(cell);
        true
      },
      None => {
        tracing::debug!(direction = ?self.direction, "search string not found");
        false
      },
    }
  }

  /// Sets the search string and moves to its next match.
  pub fn find(&mut self, bytes: &[u8]) -> bool {
    self.set_search_pattern(bytes);
    self.search_next()
  }
}
