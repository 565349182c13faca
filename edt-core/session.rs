//! The editing session.
//!
//! # Overview
//!
//! [`EditorSession`] is the one value a front end talks to. It owns:
//!
//! - the [`BufferDirectory`] of named buffers, one of them active,
//! - the optional [`Mark`] in the active buffer,
//! - the word, line, paste and character [`Scratch`] buffers, shared by all
//!   named buffers,
//! - the search pattern and the current direction,
//! - the [`SessionSettings`] (screen geometry and right margin).
//!
//! Operations live in several modules: editing and buffer management here,
//! motion in [`crate::movement`], deletion with undelete and cut/paste in
//! [`crate::cut`], case toggling and paragraph reformatting in
//! [`crate::format`].
//!
//! # Design
//!
//! - Every operation that changes text clears the mark. Case toggling over a
//!   marked range is the one exception since it never removes cells.
//! - Motion past either end of the buffer is reported as
//!   [`SessionError::PastStart`] or [`SessionError::PastEnd`] and leaves the
//!   cursor where it was.
//! - The cursor always names a live cell of the active buffer. Deleting the
//!   cursor cell moves the cursor to the following cell.

use std::ops::Range;

use thiserror::Error;

use crate::{
  buffer::{
    LoadStats,
    TextBuffer,
  },
  chars::{
    self,
    NEWLINE,
  },
  cursor::{
    Cursor,
    Mark,
  },
  directory::{
    BufferDirectory,
    BufferRecord,
    BufferSummary,
  },
  escape::{
    self,
    EscapeError,
  },
  pool::CellId,
  scratch::Scratch,
  search::{
    self,
    Pattern,
    SearchDirection,
  },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
  #[error("backup past top of buffer")]
  PastStart,
  #[error("advance past bottom of buffer")]
  PastEnd,
  #[error("no mark is set")]
  NoMark,
  #[error("cursor is not on a match for the search string")]
  NoMatchAtCursor,
  #[error("the {0} buffer is empty")]
  EmptyScratch(&'static str),
  #[error("no buffer named '{0}'")]
  UnknownBuffer(String),
  #[error(transparent)]
  Escape(#[from] EscapeError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Screen geometry and formatting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
  pub rows:         usize,
  pub cols:         usize,
  /// Column past which reformatting wraps a word onto the next line.
  pub right_margin: usize,
  /// Rows moved by one page motion.
  pub page_rows:    usize,
}

impl Default for SessionSettings {
  fn default() -> Self {
    Self {
      rows:         24,
      cols:         80,
      right_margin: 70,
      page_rows:    16,
    }
  }
}

impl SessionSettings {
  /// Rows available for text. Two screen rows are kept for the status and
  /// command lines.
  pub fn text_rows(&self) -> usize {
    self.rows.saturating_sub(2).max(1)
  }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
  pub(crate) directory: BufferDirectory,
  pub(crate) mark:      Option<Mark>,
  pub(crate) scratch:   Scratch,
  pub(crate) pattern:   Pattern,
  pub(crate) direction: SearchDirection,
  pub(crate) settings:  SessionSettings,
}

impl Default for EditorSession {
  fn default() -> Self {
    Self::new(SessionSettings::default())
  }
}

impl EditorSession {
  pub fn new(settings: SessionSettings) -> Self {
    Self {
      directory: BufferDirectory::new(),
      mark: None,
      scratch: Scratch::default(),
      pattern: Pattern::new(&[], true),
      direction: SearchDirection::Forward,
      settings,
    }
  }

  pub fn text(&self) -> &TextBuffer {
    &self.directory.active().text
  }

  pub fn cursor(&self) -> Cursor {
    self.directory.active().cursor
  }

  pub fn mark(&self) -> Option<Mark> {
    self.mark
  }

  pub fn settings(&self) -> &SessionSettings {
    &self.settings
  }

  pub fn set_settings(&mut self, settings: SessionSettings) {
    self.settings = settings;
  }

  pub fn scratch(&self) -> &Scratch {
    &self.scratch
  }

  pub fn direction(&self) -> SearchDirection {
    self.direction
  }

  pub fn set_direction(&mut self, direction: SearchDirection) {
    self.direction = direction;
  }

  pub fn search_pattern(&self) -> &Pattern {
    &self.pattern
  }

  /// Replaces the search string, keeping the case sensitivity setting.
  pub fn set_search_pattern(&mut self, bytes: &[u8]) {
    self.pattern = Pattern::new(bytes, self.pattern.case_insensitive);
  }

  pub fn set_case_insensitive(&mut self, case_insensitive: bool) {
    self.pattern.case_insensitive = case_insensitive;
  }

  /// Flips search case sensitivity, returning whether searches now ignore
  /// case.
  pub fn toggle_case_sensitivity(&mut self) -> bool {
    self.pattern.case_insensitive = !self.pattern.case_insensitive;
    self.pattern.case_insensitive
  }

  pub(crate) fn record_mut(&mut self) -> &mut BufferRecord {
    self.directory.active_mut()
  }

  /// Moves the cursor to `cell`, recomputing row and column.
  pub(crate) fn place_cursor(&mut self, cell: CellId) {
    let record = self.directory.active_mut();
    record.cursor = Cursor::at(&record.text, cell);
  }

  pub(crate) fn place_cursor_on_row(&mut self, cell: CellId, row: usize) {
    let record = self.directory.active_mut();
    record.cursor = Cursor::on_row(&record.text, cell, row);
  }

  pub fn set_mark(&mut self) {
    self.mark = Some(Mark::from(self.cursor()));
  }

  pub fn clear_mark(&mut self) {
    self.mark = None;
  }

  /// Inserts `byte` before the cursor.
  pub fn insert_byte(&mut self, byte: u8) {
    self.mark = None;
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    record.text.insert_before(cursor.cell, byte);
    let row = cursor.row + usize::from(byte == NEWLINE);
    record.cursor = Cursor::on_row(&record.text, cursor.cell, row);
  }

  pub fn insert_bytes(&mut self, bytes: &[u8]) {
    self.mark = None;
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    record.text.insert_bytes_before(cursor.cell, bytes);
    let row = cursor.row + bytes.iter().filter(|&&byte| byte == NEWLINE).count();
    record.cursor = Cursor::on_row(&record.text, cursor.cell, row);
  }

  /// Deletes the byte before the cursor and remembers it for
  /// [`Self::undelete_char`].
  pub fn delete_backward(&mut self) -> Result<u8> {
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    if cursor.cell == record.text.first() {
      return Err(SessionError::PastStart);
    }
    let prev = record.text.prev(cursor.cell).ok_or(SessionError::PastStart)?;
    let byte = record.text.remove(prev).ok_or(SessionError::PastStart)?;
    let row = cursor.row - usize::from(byte == NEWLINE);
    record.cursor = Cursor::on_row(&record.text, cursor.cell, row);

    self.scratch.char = Some(byte);
    self.mark = None;
    Ok(byte)
  }

  /// Deletes the byte under the cursor and remembers it for
  /// [`Self::undelete_char`].
  pub fn delete_forward(&mut self) -> Result<u8> {
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    if cursor.cell == record.text.eob() {
      return Err(SessionError::PastEnd);
    }
    let next = record.text.next(cursor.cell).ok_or(SessionError::PastEnd)?;
    let byte = record.text.remove(cursor.cell).ok_or(SessionError::PastEnd)?;
    record.cursor = Cursor::on_row(&record.text, next, cursor.row);

    self.scratch.char = Some(byte);
    self.mark = None;
    Ok(byte)
  }

  /// Re-inserts the last single deleted byte before the cursor.
  pub fn undelete_char(&mut self) -> Result<u8> {
    let byte = self.scratch.char.ok_or(SessionError::EmptyScratch("character"))?;
    self.insert_byte(byte);
    Ok(byte)
  }

  /// Replaces the active buffer's text with `bytes`, supplying a missing
  /// final newline. The cursor goes to the first line.
  pub fn load_document(&mut self, bytes: &[u8]) -> LoadStats {
    self.mark = None;
    let record = self.directory.active_mut();
    record.text = TextBuffer::new();
    let stats = record.text.load_bytes(bytes);
    record.cursor = Cursor::on_row(&record.text, record.text.first(), 0);
    tracing::debug!(
      buffer = self.directory.active_name(),
      lines = stats.lines,
      bytes = stats.bytes,
      "loaded document"
    );
    stats
  }

  /// Inserts a file's bytes before the cursor, supplying a missing final
  /// newline for the buffer.
  pub fn include_bytes(&mut self, bytes: &[u8]) -> LoadStats {
    self.mark = None;
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    let stats = record.text.load_bytes_before(cursor.cell, bytes);
    record.cursor = Cursor::at(&record.text, cursor.cell);
    stats
  }

  /// The active buffer's bytes as they are written out.
  pub fn serialize(&self) -> Vec<u8> {
    self.text().serialize()
  }

  pub fn serialize_buffer(&self, name: &str) -> Result<Vec<u8>> {
    self
      .directory
      .get(name)
      .map(|record| record.text.serialize())
      .ok_or_else(|| SessionError::UnknownBuffer(name.to_string()))
  }

  pub fn paste_contents(&self) -> Vec<u8> {
    self.scratch.paste.to_vec()
  }

  /// Activates the buffer called `name`, creating it empty if needed.
  /// Returns whether it was created. The mark never survives a switch.
  pub fn switch_buffer(&mut self, name: &str) -> bool {
    self.mark = None;
    self.directory.switch_to(name)
  }

  pub fn active_buffer_name(&self) -> &str {
    self.directory.active_name()
  }

  pub fn buffer_names(&self) -> Vec<&str> {
    self.directory.names().collect()
  }

  pub fn buffer_summaries(&self) -> Vec<BufferSummary> {
    self.directory.summaries()
  }

  /// Replaces every match of `search` with `replacement` in the active
  /// buffer. Both strings may contain `%NNN` escapes. When anything was
  /// replaced the cursor returns to the first line.
  pub fn substitute_all(&mut self, search: &[u8], replacement: &[u8]) -> Result<usize> {
    let search = escape::decode_percent_escapes(search)?;
    let replacement = escape::decode_percent_escapes(replacement)?;
    let pattern = Pattern::new(&search, self.pattern.case_insensitive);

    self.mark = None;
    let record = self.directory.active_mut();
    let count = search::substitute_all(&mut record.text, &pattern, &replacement);
    if count > 0 {
      record.cursor = Cursor::on_row(&record.text, record.text.first(), 0);
      self.direction = SearchDirection::Forward;
    }
    Ok(count)
  }

  pub fn revision(&self) -> u64 {
    self.text().revision()
  }

  pub fn line_count(&self) -> usize {
    self.text().line_count()
  }

  pub fn cursor_row(&self) -> usize {
    self.cursor().row
  }

  pub fn cursor_column(&self) -> usize {
    self.cursor().column
  }

  /// Bytes of line `row`, without the newline.
  pub fn line_text(&self, row: usize) -> Option<Vec<u8>> {
    self.text().line_bytes(row)
  }

  /// Screen form of line `row` clipped to the screen width.
  pub fn render_line(&self, row: usize) -> Option<String> {
    let bytes = self.line_text(row)?;
    let mut out = String::new();
    let mut column = 0;
    for byte in bytes {
      if column >= self.settings.cols {
        break;
      }
      chars::push_display(byte, column, &mut out);
      column = chars::advance_column(byte, column);
    }
    Some(out.chars().take(self.settings.cols).collect())
  }

  /// First row to show so the cursor stays on screen, given the row
  /// currently at the top.
  pub fn scroll_top(&self, top: usize) -> usize {
    let rows = self.settings.text_rows();
    let row = self.cursor_row();
    if row < top {
      row
    } else if row >= top + rows {
      row + 1 - rows
    } else {
      top
    }
  }

  /// Rows visible when `top` is the first row on screen.
  pub fn visible_rows(&self, top: usize) -> Range<usize> {
    let last = self.line_count() + 1;
    top.min(last)..(top + self.settings.text_rows()).min(last)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn session_with(text: &[u8]) -> EditorSession {
    let mut session = EditorSession::default();
    session.load_document(text);
    session
  }

  #[test]
  fn insert_at_start_scenario() {
    let mut session = session_with(b"ab\ncd\n");
    session.insert_byte(b'X');
    assert_eq!(session.serialize(), b"Xab\ncd\n");
    assert_eq!(session.line_count(), 2);
    assert_eq!(session.cursor_column(), 1);
  }

  #[test]
  fn load_reports_and_fixes_missing_newline() {
    let mut session = EditorSession::default();
    let stats = session.load_document(b"a\nb");
    assert!(stats.appended_newline);
    assert_eq!(stats.bytes, 3);
    assert_eq!(session.serialize(), b"a\nb\n");
    assert_eq!(session.cursor().cell, session.text().first());
  }

  #[test]
  fn delete_and_undelete_char() {
    let mut session = session_with(b"ab\ncd\n");
    session.insert_bytes(b"xy");
    assert_eq!(session.delete_backward(), Ok(b'y'));
    assert_eq!(session.serialize(), b"xab\ncd\n");
    assert_eq!(session.delete_forward(), Ok(b'a'));
    assert_eq!(session.serialize(), b"xb\ncd\n");
    assert_eq!(session.undelete_char(), Ok(b'a'));
    assert_eq!(session.serialize(), b"xab\ncd\n");
  }

  #[test]
  fn deleting_newline_updates_row() {
    let mut session = session_with(b"ab\ncd\n");
    session.goto_line(2);
    assert_eq!(session.cursor_row(), 1);
    assert_eq!(session.delete_backward(), Ok(b'\n'));
    assert_eq!(session.cursor_row(), 0);
    assert_eq!(session.cursor_column(), 2);
    assert_eq!(session.line_count(), 1);
  }

  #[test]
  fn deleting_at_the_ends_is_reported() {
    let mut session = session_with(b"a\n");
    assert_eq!(session.delete_backward(), Err(SessionError::PastStart));
    session.move_to_bottom();
    assert_eq!(session.delete_forward(), Err(SessionError::PastEnd));
    assert_eq!(session.undelete_char(), Err(SessionError::EmptyScratch("character")));
  }

  #[test]
  fn edits_clear_the_mark() {
    let mut session = session_with(b"abc\n");
    session.set_mark();
    session.insert_byte(b'z');
    assert_eq!(session.mark(), None);
  }

  #[test]
  fn buffers_keep_their_own_cursor() {
    let mut session = session_with(b"main\n");
    session.move_right().unwrap();
    session.set_mark();
    assert!(session.switch_buffer("scratch"));
    assert_eq!(session.mark(), None);
    session.insert_bytes(b"other\n");
    assert_eq!(session.active_buffer_name(), "scratch");

    assert!(!session.switch_buffer("main"));
    assert_eq!(session.cursor_column(), 1);
    assert_eq!(session.buffer_names(), ["main", "scratch"]);
    assert_eq!(session.serialize_buffer("scratch"), Ok(b"other\n".to_vec()));
    assert_eq!(
      session.serialize_buffer("missing"),
      Err(SessionError::UnknownBuffer("missing".into()))
    );
  }

  #[test]
  fn include_inserts_at_cursor() {
    let mut session = session_with(b"one\nthree\n");
    session.goto_line(2);
    let stats = session.include_bytes(b"two\n");
    assert_eq!(stats.lines, 1);
    assert_eq!(session.serialize(), b"one\ntwo\nthree\n");
    assert_eq!(session.cursor_row(), 2);
  }

  #[test]
  fn substitute_with_escapes_resets_cursor() {
    let mut session = session_with(b"a,b\nc,d\n");
    session.move_to_bottom();
    assert_eq!(session.substitute_all(b",", b"%009"), Ok(2));
    assert_eq!(session.serialize(), b"a\tb\nc\td\n");
    assert_eq!(session.cursor_row(), 0);
    assert_eq!(session.cursor().cell, session.text().first());
    assert!(matches!(
      session.substitute_all(b"%1", b""),
      Err(SessionError::Escape(_))
    ));
    assert_eq!(session.substitute_all(b"", b"x"), Ok(0));
  }

  #[test]
  fn substitute_honours_case_setting() {
    let mut session = session_with(b"Word word\n");
    assert_eq!(session.substitute_all(b"word", b"w"), Ok(2));
    let mut strict = session_with(b"Word word\n");
    strict.set_case_insensitive(false);
    assert_eq!(strict.substitute_all(b"word", b"w"), Ok(1));
    assert_eq!(strict.serialize(), b"Word w\n");
  }

  #[test]
  fn render_queries() {
    let mut session = session_with(b"a\tb\x01\nsecond\n");
    assert_eq!(session.line_text(1), Some(b"second".to_vec()));
    assert_eq!(session.render_line(0).as_deref(), Some("a       b^A"));
    session.set_settings(SessionSettings {
      cols: 4,
      ..SessionSettings::default()
    });
    assert_eq!(session.render_line(1).as_deref(), Some("seco"));
    assert_eq!(session.render_line(5), None);
    assert_eq!(session.visible_rows(0), 0..3);
  }

  #[test]
  fn scroll_keeps_cursor_visible() {
    let mut text = Vec::new();
    for _ in 0..100 {
      text.extend_from_slice(b"line\n");
    }
    let mut session = session_with(&text);
    assert_eq!(session.scroll_top(0), 0);
    session.goto_line(50);
    let top = session.scroll_top(0);
    assert_eq!(top, 49 + 1 - session.settings().text_rows());
    assert_eq!(session.scroll_top(60), 49);
  }
}
