//! Editing core for the edt screen editor.
//!
//! Text lives in a doubly-linked chain of byte cells ([`buffer::TextBuffer`])
//! allocated from a reusable pool ([`pool::CellPool`]). An
//! [`session::EditorSession`] owns every named buffer together with the
//! cursor, mark, scratch buffers and search state, and exposes the editing,
//! movement and query operations a front end drives.

pub mod buffer;
pub mod chars;
pub mod cursor;
pub mod cut;
pub mod directory;
pub mod escape;
pub mod format;
pub mod movement;
pub mod pool;
pub mod scratch;
pub mod search;
pub mod session;

pub use buffer::{
  LoadStats,
  TextBuffer,
};
pub use cursor::{
  Cursor,
  Mark,
  RangeDirection,
};
pub use pool::CellId;
pub use search::{
  Pattern,
  SearchDirection,
};
pub use session::{
  EditorSession,
  SessionError,
  SessionSettings,
};
