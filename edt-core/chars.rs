//! Byte classification and display widths.
//!
//! The editor works on raw 8-bit bytes. Control bytes are shown with a
//! multi-column notation, so the display column of a cell depends on every
//! byte before it on the same line.

pub const NEWLINE: u8 = b'\n';
pub const TAB: u8 = b'\t';
pub const FORM_FEED: u8 = 0x0c;
pub const ESCAPE: u8 = 0x1b;
pub const DELETE: u8 = 0x7f;

/// Tab stops fall on every multiple of this column.
pub const TAB_WIDTH: usize = 8;

#[inline]
pub fn is_newline(byte: u8) -> bool {
  byte == NEWLINE
}

/// Space or tab.
#[inline]
pub fn is_blank(byte: u8) -> bool {
  byte == b' ' || byte == TAB
}

/// Bytes that end a word for word motion, word deletion and reformatting.
#[inline]
pub fn is_word_delimiter(byte: u8) -> bool {
  is_blank(byte) || is_newline(byte)
}

/// Upper-cases `a..=z` only.
#[inline]
pub fn fold_case(byte: u8) -> u8 {
  byte.to_ascii_uppercase()
}

#[inline]
pub fn bytes_match(a: u8, b: u8, case_insensitive: bool) -> bool {
  if case_insensitive {
    fold_case(a) == fold_case(b)
  } else {
    a == b
  }
}

/// Swaps the case of an ASCII letter, `None` for anything else.
#[inline]
pub fn toggle_case(byte: u8) -> Option<u8> {
  match byte {
    b'a'..=b'z' => Some(byte.to_ascii_uppercase()),
    b'A'..=b'Z' => Some(byte.to_ascii_lowercase()),
    _ => None,
  }
}

/// Column reached after drawing `byte` starting at `column`.
#[inline]
pub fn advance_column(byte: u8, column: usize) -> usize {
  match byte {
    TAB => (column / TAB_WIDTH) * TAB_WIDTH + TAB_WIDTH,
    DELETE => column + 5,
    FORM_FEED => column + 4,
    ESCAPE => column + 5,
    b if b < ESCAPE => column + 2,
    _ => column + 1,
  }
}

/// Appends the on-screen form of `byte` drawn at `column` to `out`.
pub fn push_display(byte: u8, column: usize, out: &mut String) {
  match byte {
    TAB => {
      let stop = advance_column(TAB, column);
      out.extend(std::iter::repeat_n(' ', stop - column));
    },
    DELETE => out.push_str("<DEL>"),
    FORM_FEED => out.push_str("<FF>"),
    ESCAPE => out.push_str("<ESC>"),
    b if b < ESCAPE => {
      out.push('^');
      out.push(char::from(b + 64));
    },
    0x1c..=0x1f => out.push('#'),
    b => out.push(char::from(b)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn render(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut column = 0;
    for &byte in bytes {
      push_display(byte, column, &mut out);
      column = advance_column(byte, column);
    }
    out
  }

  #[test]
  fn tabs_round_up_to_next_stop() {
    assert_eq!(advance_column(TAB, 0), 8);
    assert_eq!(advance_column(TAB, 7), 8);
    assert_eq!(advance_column(TAB, 8), 16);
    assert_eq!(advance_column(TAB, 13), 16);
  }

  #[test]
  fn control_widths() {
    assert_eq!(advance_column(DELETE, 0), 5);
    assert_eq!(advance_column(FORM_FEED, 0), 4);
    assert_eq!(advance_column(ESCAPE, 0), 5);
    assert_eq!(advance_column(0x01, 0), 2);
    assert_eq!(advance_column(0x1d, 0), 1);
    assert_eq!(advance_column(b'a', 3), 4);
  }

  #[test]
  fn display_width_matches_column_advance() {
    let line = b"a\tb\x01\x7f\x0c\x1b\x1cz";
    let mut column = 0;
    for &byte in line {
      column = advance_column(byte, column);
    }
    assert_eq!(render(line).len(), column);
    assert_eq!(render(b"\x01\x1b"), "^A<ESC>");
  }

  #[test]
  fn case_helpers_only_touch_ascii_letters() {
    assert_eq!(fold_case(b'q'), b'Q');
    assert_eq!(fold_case(0xe9), 0xe9);
    assert_eq!(toggle_case(b'Q'), Some(b'q'));
    assert_eq!(toggle_case(b'1'), None);
    assert!(bytes_match(b'x', b'X', true));
    assert!(!bytes_match(b'x', b'X', false));
  }
}
