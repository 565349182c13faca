use edt_core::{
  EditorSession,
  SearchDirection,
  SessionSettings,
};

const MAX_INITIAL_BYTES: usize = 4 * 1024;
const MAX_OPS: usize = 128;
const MAX_INSERT_BYTES: usize = 64;

#[derive(Debug, Clone)]
pub enum EditOp {
  Insert(Vec<u8>),
  DeleteBackward,
  DeleteForward,
  Undelete,
  Move { kind: u8, forward: bool },
  SetMark,
  Cut,
  Paste,
  DeleteWord,
  UndeleteWord,
  DeleteLine,
  UndeleteLine,
  ToggleCase,
  Reformat,
  Find(Vec<u8>),
  Replace,
  Substitute { search: Vec<u8>, replacement: Vec<u8> },
}

pub struct FuzzSession {
  pub session: EditorSession,
  pub ops:     Vec<EditOp>,
}

pub fn session_from_bytes(data: &[u8]) -> FuzzSession {
  let mut cursor = ByteCursor::new(data);
  let margin = cursor.next_u8();
  let initial_len = cursor.next_usize(MAX_INITIAL_BYTES);
  let initial = cursor.next_bytes(initial_len).to_vec();
  let op_count = cursor.next_usize(MAX_OPS);
  let mut ops = Vec::with_capacity(op_count);
  for _ in 0..op_count {
    ops.push(decode_op(&mut cursor));
  }

  let mut session = EditorSession::new(SessionSettings {
    right_margin: usize::from(margin % 100) + 1,
    page_rows: 4,
    ..SessionSettings::default()
  });
  session.load_document(&initial);
  FuzzSession { session, ops }
}

fn decode_op(cursor: &mut ByteCursor<'_>) -> EditOp {
  let tag = cursor.next_u8();
  match tag % 17 {
    0 => {
      let len = cursor.next_usize(MAX_INSERT_BYTES);
      EditOp::Insert(cursor.next_bytes(len).to_vec())
    },
    1 => EditOp::DeleteBackward,
    2 => EditOp::DeleteForward,
    3 => EditOp::Undelete,
    4 => {
      EditOp::Move {
        kind:    cursor.next_u8(),
        forward: tag & 0x80 != 0,
      }
    },
    5 => EditOp::SetMark,
    6 => EditOp::Cut,
    7 => EditOp::Paste,
    8 => EditOp::DeleteWord,
    9 => EditOp::UndeleteWord,
    10 => EditOp::DeleteLine,
    11 => EditOp::UndeleteLine,
    12 => EditOp::ToggleCase,
    13 => EditOp::Reformat,
    14 => {
      let len = cursor.next_usize(8);
      EditOp::Find(cursor.next_bytes(len).to_vec())
    },
    15 => EditOp::Replace,
    _ => {
      let search_len = cursor.next_usize(8);
      let search = cursor.next_bytes(search_len).to_vec();
      let replacement_len = cursor.next_usize(8);
      let replacement = cursor.next_bytes(replacement_len).to_vec();
      EditOp::Substitute {
        search,
        replacement,
      }
    },
  }
}

pub fn apply(session: &mut EditorSession, op: &EditOp) {
  let direction = |forward: bool| {
    if forward {
      SearchDirection::Forward
    } else {
      SearchDirection::Backward
    }
  };
  let _ = match op {
    EditOp::Insert(bytes) => {
      session.insert_bytes(bytes);
      Ok(())
    },
    EditOp::DeleteBackward => session.delete_backward().map(drop),
    EditOp::DeleteForward => session.delete_forward().map(drop),
    EditOp::Undelete => session.undelete_char().map(drop),
    EditOp::Move { kind, forward } => {
      match kind % 8 {
        0 => session.move_left(),
        1 => session.move_right(),
        2 => session.move_up(),
        3 => session.move_down(),
        4 => session.move_word(direction(*forward)),
        5 => session.move_line_end(direction(*forward)),
        6 => session.move_page(direction(*forward)),
        _ => {
          session.goto_line(usize::from(*kind));
          Ok(())
        },
      }
    },
    EditOp::SetMark => {
      session.set_mark();
      Ok(())
    },
    EditOp::Cut => session.cut().map(drop),
    EditOp::Paste => {
      session.paste();
      Ok(())
    },
    EditOp::DeleteWord => session.delete_word_forward().map(drop),
    EditOp::UndeleteWord => session.undelete_word().map(drop),
    EditOp::DeleteLine => session.delete_line_forward().map(drop),
    EditOp::UndeleteLine => session.undelete_line().map(drop),
    EditOp::ToggleCase => session.toggle_case().map(drop),
    EditOp::Reformat => session.reformat(),
    EditOp::Find(bytes) => {
      session.find(bytes);
      Ok(())
    },
    EditOp::Replace => session.replace(true).map(drop),
    EditOp::Substitute {
      search,
      replacement,
    } => session.substitute_all(search, replacement).map(drop),
  };
}

/// Checks that the buffer's bookkeeping agrees with its contents.
pub fn check(session: &EditorSession) {
  let text = session.text();
  let contents = text.contents();
  assert_eq!(text.len(), contents.len());
  assert_eq!(
    text.line_count(),
    contents.iter().filter(|&&byte| byte == b'\n').count()
  );
  let cursor = session.cursor();
  assert!(text.contains(cursor.cell));
  assert_eq!(text.row_of(cursor.cell), cursor.row);
  if let Some(mark) = session.mark() {
    assert!(text.contains(mark.cell));
  }
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  fn next_bytes(&mut self, len: usize) -> &'a [u8] {
    let start = self.pos.min(self.data.len());
    let end = start.saturating_add(len).min(self.data.len());
    self.pos = self.pos.saturating_add(len);
    &self.data[start..end]
  }
}
