//! Case toggling and paragraph reformatting.

use crate::{
  buffer::TextBuffer,
  chars::{
    self,
    NEWLINE,
  },
  cursor::{
    Cursor,
    ordered_range,
  },
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

impl EditorSession {
  /// Toggles letter case.
  ///
  /// With a mark away from the cursor the whole marked range is toggled and
  /// the mark stays. Otherwise a search match under the cursor is toggled in
  /// place. Otherwise one byte is toggled and the cursor steps over it in the
  /// current direction. Returns the number of bytes changed.
  pub fn toggle_case(&mut self) -> Result<usize> {
    let cursor = self.cursor();
    if let Some((start, end)) = self.mark.as_ref().and_then(|mark| ordered_range(mark, &cursor)) {
      let text = &mut self.directory.active_mut().text;
      let cells: Vec<_> = text.cells_from(start).take_while(|&at| at != end).collect();
      return Ok(toggle_cells(text, &cells));
    }

    if search::matches_at(self.text(), cursor.cell, &self.pattern) {
      let text = &mut self.directory.active_mut().text;
      let cells: Vec<_> = text.cells_from(cursor.cell).take(self.pattern.len()).collect();
      return Ok(toggle_cells(text, &cells));
    }

    match self.direction {
      SearchDirection::Forward => {
        let text = &mut self.directory.active_mut().text;
        let changed = if cursor.cell == text.eob() {
          0
        } else {
          toggle_cells(text, &[cursor.cell])
        };
        self.move_right()?;
        Ok(changed)
      },
      SearchDirection::Backward => {
        let text = &mut self.directory.active_mut().text;
        let changed = match text.prev(cursor.cell) {
          Some(prev) if prev != text.head() => toggle_cells(text, &[prev]),
          _ => 0,
        };
        self.move_left()?;
        Ok(changed)
      },
    }
  }

  /// Refills the marked range so no word ends past the right margin.
  ///
  /// Single newlines inside the range become spaces. Blank lines, the final
  /// newline of the buffer and runs of newlines are kept. Then every word
  /// whose last byte starts past the margin moves to a new line, dropping the
  /// blanks that followed the break. The mark is cleared.
  pub fn reformat(&mut self) -> Result<()> {
    let mark = self.mark.take().ok_or(SessionError::NoMark)?;
    let margin = self.settings.right_margin;
    let record = self.directory.active_mut();
    let cursor = record.cursor;
    let Some((start, end)) = ordered_range(&mark, &cursor) else {
      return Ok(());
    };

    let text = &mut record.text;
    let next = |text: &TextBuffer, at| text.next(at).unwrap_or(end);
    let mut lines_broken = 0;

    let mut at = start;
    while at != end && !chars::is_word_delimiter(text.byte(at)) {
      at = next(text, at);
    }
    while at != end {
      let mut scan = at;
      let mut previous = b' ';
      while scan != end && chars::is_word_delimiter(text.byte(scan)) {
        let byte = text.byte(scan);
        let joins_lines = byte == NEWLINE
          && text.byte(next(text, scan)) != NEWLINE
          && previous != NEWLINE
          && Some(scan) != text.last();
        if joins_lines {
          text.set_byte(scan, b' ');
        }
        previous = byte;
        scan = next(text, scan);
      }
      while scan != end && !chars::is_word_delimiter(text.byte(scan)) {
        scan = next(text, scan);
      }
      if scan == end {
        break;
      }

      let word_end = text.prev(scan).unwrap_or(scan);
      if text.column(word_end) > margin {
        text.set_byte(at, NEWLINE);
        lines_broken += 1;
        let mut blank = next(text, at);
        while blank != end && chars::is_blank(text.byte(blank)) {
          let following = next(text, blank);
          text.remove(blank);
          blank = following;
        }
      }
      at = next(text, word_end);
    }

    record.cursor = Cursor::at(&record.text, cursor.cell);
    tracing::debug!(margin, lines_broken, "reformatted range");
    Ok(())
  }
}

/// Toggles the case of each letter among `cells`, returning how many
/// changed.
fn toggle_cells(text: &mut TextBuffer, cells: &[CellId]) -> usize {
  let mut changed = 0;
  for &cell in cells {
    if let Some(toggled) = chars::toggle_case(text.byte(cell)) {
      text.set_byte(cell, toggled);
      changed += 1;
    }
  }
  changed
}
