//! Deletion into scratch buffers and the operations that replay them.
//!
//! Word and line deletion fill their own scratch buffers, cut fills the paste
//! buffer. A new deletion of the same kind replaces the previous contents.

use crate::{
  buffer::TextBuffer,
  chars::{
    self,
    NEWLINE,
    TAB,
  },
  cursor::{
    Cursor,
    RangeDirection,
    range_direction,
  },
  pool::CellId,
  scratch::ScratchBuffer,
  search,
  session::{
    EditorSession,
    Result,
    SessionError,
  },
};

/// Removes the cells in `[start, end)`, walking back from `end` and pushing
/// each byte on the front of `into`. Returns the number of newlines removed.
///
/// # Panics
///
/// Panics when `start` does not precede `end`.
fn drain_range(text: &mut TextBuffer, start: CellId, end: CellId, into: &mut ScratchBuffer) -> usize {
  let head = text.head();
  let mut newlines = 0;
  while start != end {
    let Some(cell) = text.prev(end) else {
      break;
    };
    assert!(cell != head, "range start not found before the buffer head");
    let Some(byte) = text.remove(cell) else {
      break;
    };
    into.push_front(byte);
    newlines += usize::from(byte == NEWLINE);
    if cell == start {
      break;
    }
  }
  newlines
}

/// Inserts `bytes` before `at` and returns the first inserted cell, or `at`
/// itself when there was nothing to insert.
fn replay(text: &mut TextBuffer, at: CellId, bytes: &[u8]) -> CellId {
  text.insert_bytes_before(at, bytes).unwrap_or(at)
}

impl EditorSession {
  /// Moves the marked range into the paste buffer.
  ///
  /// With the mark before the cursor the cursor stays where it is. With the
  /// mark after it the cursor lands on the mark. The mark is cleared either
  /// way, and a cut of an empty range leaves the paste buffer empty.
  pub fn cut(&mut self) -> Result<usize> {
    let mark = self.mark.take().ok_or(SessionError::NoMark)?;
    self.scratch.paste.clear();

    let record = self.directory.active_mut();
    let cursor = record.cursor;
    match range_direction(&mark, &cursor) {
      RangeDirection::NoOp => {},
      RangeDirection::Backward => {
        let removed = drain_range(&mut record.text, mark.cell, cursor.cell, &mut self.scratch.paste);
        record.cursor = Cursor::on_row(&record.text, cursor.cell, cursor.row - removed);
      },
      RangeDirection::Forward => {
        drain_range(&mut record.text, cursor.cell, mark.cell, &mut self.scratch.paste);
        record.cursor = Cursor::on_row(&record.text, mark.cell, cursor.row);
      },
    }
    let len = self.scratch.paste.len();
    tracing::debug!(bytes = len, "cut to paste buffer");
    Ok(len)
  }

  /// Inserts the paste buffer before the cursor. The cursor stays after the
  /// inserted text.
  pub fn paste(&mut self) -> usize {
    let bytes = self.scratch.paste.to_vec();
    self.insert_bytes(&bytes);
    bytes.len()
  }

  /// Replaces the search match under the cursor with the paste buffer, then
  /// optionally searches on. Returns whether the follow-up search found a
  /// match.
  pub fn replace(&mut self, find_next: bool) -> Result<bool> {
    let cursor = self.cursor();
    if !search::matches_at(self.text(), cursor.cell, &self.pattern) {
      return Err(SessionError::NoMatchAtCursor);
    }
    self.mark = None;
    let paste = self.scratch.paste.to_vec();
    let record = self.directory.active_mut();
    let mut at = cursor.cell;
    for _ in 0..self.pattern.len() {
      let Some(next) = record.text.next(at) else {
        break;
      };
      record.text.remove(at);
      at = next;
    }
    record.text.insert_bytes_before(at, &paste);
    record.cursor = Cursor::at(&record.text, at);

    Ok(find_next && self.search_next())
  }

  /// Deletes from the cursor to the start of the next word, keeping the
  /// text for [`Self::undelete_word`]. A newline or tab under the cursor is
  /// deleted alone.
  pub fn delete_word_forward(&mut self) -> Result<usize> {
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    let text = &record.text;
    let eob = text.eob();
    if cursor.cell == eob {
      return Err(SessionError::PastEnd);
    }
    self.scratch.word.clear();

    let byte = text.byte(cursor.cell);
    if byte == NEWLINE || byte == TAB {
      self.delete_forward()?;
      self.scratch.word.push_front(byte);
      return Ok(1);
    }

    let mut end = cursor.cell;
    while end != eob && !chars::is_word_delimiter(text.byte(end)) {
      end = text.next(end).ok_or(SessionError::PastEnd)?;
    }
    while end != eob && text.byte(end) == b' ' {
      end = text.next(end).ok_or(SessionError::PastEnd)?;
    }
    drain_range(&mut record.text, cursor.cell, end, &mut self.scratch.word);
    record.cursor = Cursor::on_row(&record.text, end, cursor.row);
    self.mark = None;
    Ok(self.scratch.word.len())
  }

  /// Re-inserts the last deleted word before the cursor, leaving the cursor
  /// on its first byte.
  pub fn undelete_word(&mut self) -> Result<usize> {
    if self.scratch.word.is_empty() {
      return Err(SessionError::EmptyScratch("word"));
    }
    let bytes = self.scratch.word.to_vec();
    self.replay_at_cursor(&bytes);
    Ok(bytes.len())
  }

  /// Deletes from the cursor through the end of the line, newline included,
  /// keeping the text for [`Self::undelete_line`].
  pub fn delete_line_forward(&mut self) -> Result<usize> {
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    let eob = record.text.eob();
    if cursor.cell == eob {
      return Err(SessionError::PastEnd);
    }
    self.scratch.line.clear();

    let line_end = record.text.line_end(cursor.cell);
    let end = if line_end == eob {
      eob
    } else {
      record.text.next(line_end).ok_or(SessionError::PastEnd)?
    };
    drain_range(&mut record.text, cursor.cell, end, &mut self.scratch.line);
    record.cursor = Cursor::on_row(&record.text, end, cursor.row);
    self.mark = None;
    Ok(self.scratch.line.len())
  }

  /// Re-inserts the last deleted line before the cursor, leaving the cursor
  /// on its first byte.
  pub fn undelete_line(&mut self) -> Result<usize> {
    if self.scratch.line.is_empty() {
      return Err(SessionError::EmptyScratch("line"));
    }
    let bytes = self.scratch.line.to_vec();
    self.replay_at_cursor(&bytes);
    Ok(bytes.len())
  }

  fn replay_at_cursor(&mut self, bytes: &[u8]) {
    self.mark = None;
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    let first = replay(&mut record.text, cursor.cell, bytes);
    record.cursor = Cursor::on_row(&record.text, first, cursor.row);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::search::SearchDirection;

  fn session_with(text: &[u8]) -> EditorSession {
    let mut session = EditorSession::default();
    session.load_document(text);
    session
  }

  fn lines(count: usize) -> Vec<u8> {
    (0..count)
      .flat_map(|index| format!("line {index}\n").into_bytes())
      .collect()
  }

  #[test]
  fn cut_backward_then_paste_elsewhere() {
    let mut session = session_with(&lines(8));
    session.goto_line(3);
    session.set_mark();
    session.goto_line(6);

    assert_eq!(session.cut(), Ok(21));
    assert_eq!(session.mark(), None);
    assert_eq!(session.cursor_row(), 2);
    assert_eq!(session.line_count(), 5);
    assert_eq!(session.paste_contents(), b"line 2\nline 3\nline 4\n");

    session.move_to_bottom();
    assert_eq!(session.paste(), 21);
    assert_eq!(session.cursor().cell, session.text().eob());
    assert_eq!(
      session.serialize(),
      b"line 0\nline 1\nline 5\nline 6\nline 7\nline 2\nline 3\nline 4\n"
    );
  }

  #[test]
  fn cut_then_paste_in_place_restores_text() {
    let original = lines(8);
    let mut session = session_with(&original);
    session.goto_line(3);
    session.set_mark();
    session.goto_line(6);
    assert_eq!(session.cursor_row(), 5);

    session.cut().unwrap();
    session.paste();
    assert_eq!(session.serialize(), original);
    assert_eq!(session.line_count(), 8);
    assert_eq!(session.cursor_row(), 5);
  }

  #[test]
  fn cut_forward_lands_on_mark() {
    let mut session = session_with(b"abcdef\n");
    for _ in 0..4 {
      session.move_right().unwrap();
    }
    session.set_mark();
    session.move_to_top();
    session.move_right().unwrap();

    assert_eq!(session.cut(), Ok(3));
    assert_eq!(session.serialize(), b"aef\n");
    assert_eq!(session.paste_contents(), b"bcd");
    assert_eq!(session.text().byte(session.cursor().cell), b'e');
    assert_eq!(session.cursor_column(), 1);
  }

  #[test]
  fn empty_cut_clears_paste() {
    let mut session = session_with(b"abc\n");
    session.set_mark();
    session.move_right().unwrap();
    session.cut().unwrap();
    assert_eq!(session.paste_contents(), b"a");

    session.set_mark();
    assert_eq!(session.cut(), Ok(0));
    assert!(session.paste_contents().is_empty());
    assert_eq!(session.cut(), Err(SessionError::NoMark));
  }

  #[test]
  fn replace_requires_match_under_cursor() {
    let mut session = session_with(b"one two one\n");
    session.set_search_pattern(b"one");
    session.move_right().unwrap();
    assert_eq!(session.replace(false), Err(SessionError::NoMatchAtCursor));

    session.move_to_top();
    session.move_right().unwrap();
    session.set_mark();
    session.move_right().unwrap();
    session.move_right().unwrap();
    session.cut().unwrap();
    assert_eq!(session.serialize(), b"o two one\n");

    session.set_search_pattern(b"ONE");
    session.set_direction(SearchDirection::Forward);
    assert!(session.search_next());
    assert_eq!(session.replace(true), Ok(false));
    assert_eq!(session.serialize(), b"o two ne\n");
    assert_eq!(session.cursor_column(), 8);
  }

  #[test]
  fn replace_and_find_next() {
    let mut session = session_with(b"xa xa\n");
    session.move_right().unwrap();
    session.set_mark();
    session.move_right().unwrap();
    session.cut().unwrap();
    session.paste();
    session.move_to_top();
    session.set_search_pattern(b"x");
    assert_eq!(session.replace(true), Ok(true));
    assert_eq!(session.serialize(), b"aa xa\n");
    assert_eq!(session.cursor_column(), 3);
  }

  #[test]
  fn delete_and_undelete_word() {
    let mut session = session_with(b"alpha  beta\n");
    assert_eq!(session.delete_word_forward(), Ok(7));
    assert_eq!(session.serialize(), b"beta\n");
    assert_eq!(session.scratch().word.to_vec(), b"alpha  ");

    session.move_line_end(SearchDirection::Forward).unwrap();
    assert_eq!(session.undelete_word(), Ok(7));
    assert_eq!(session.serialize(), b"betaalpha  \n");
    assert_eq!(session.cursor_column(), 4);
  }

  #[test]
  fn newline_is_its_own_word() {
    let mut session = session_with(b"ab\ncd\n");
    session.move_line_end(SearchDirection::Forward).unwrap();
    assert_eq!(session.delete_word_forward(), Ok(1));
    assert_eq!(session.serialize(), b"abcd\n");
    assert_eq!(session.scratch().word.to_vec(), b"\n");
    session.move_to_bottom();
    assert_eq!(session.delete_word_forward(), Err(SessionError::PastEnd));
  }

  #[test]
  fn delete_and_undelete_line() {
    let mut session = session_with(b"one\ntwo\nthree\n");
    session.goto_line(2);
    session.move_right().unwrap();
    assert_eq!(session.delete_line_forward(), Ok(3));
    assert_eq!(session.serialize(), b"one\ntthree\n");
    assert_eq!(session.scratch().line.to_vec(), b"wo\n");

    assert_eq!(session.undelete_line(), Ok(3));
    assert_eq!(session.serialize(), b"one\ntwo\nthree\n");
    assert_eq!(session.cursor_column(), 1);
    assert_eq!(session.text().byte(session.cursor().cell), b'w');
  }

  #[test]
  fn delete_line_without_final_newline() {
    let mut session = EditorSession::default();
    session.insert_bytes(b"tail");
    session.move_to_top();
    assert_eq!(session.delete_line_forward(), Ok(4));
    assert!(session.text().is_empty());
    assert_eq!(session.undelete_word(), Err(SessionError::EmptyScratch("word")));
  }
}
