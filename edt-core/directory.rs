//! Named buffers.
//!
//! Each record owns its own text, with its own sentinels and pool, and its
//! own cursor. Records are created the first time a name is used and live as
//! long as the directory. Exactly one record is active. The active record is
//! edited in place, so switching away needs no copy-back step.

use indexmap::IndexMap;

use crate::{
  buffer::TextBuffer,
  cursor::Cursor,
};

/// Name of the buffer a session starts in.
pub const MAIN_BUFFER: &str = "main";

#[derive(Debug, Clone)]
pub struct BufferRecord {
  pub text:   TextBuffer,
  pub cursor: Cursor,
}

impl BufferRecord {
  /// Empty text with the cursor at end of buffer.
  pub fn new() -> Self {
    let text = TextBuffer::new();
    let cursor = Cursor::at(&text, text.eob());
    Self { text, cursor }
  }
}

impl Default for BufferRecord {
  fn default() -> Self {
    Self::new()
  }
}

/// Snapshot of a record for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSummary {
  pub name:      String,
  pub lines:     usize,
  pub bytes:     usize,
  pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct BufferDirectory {
  records: IndexMap<String, BufferRecord>,
  active:  usize,
}

impl Default for BufferDirectory {
  fn default() -> Self {
    Self::new()
  }
}

impl BufferDirectory {
  pub fn new() -> Self {
    let mut records = IndexMap::new();
    records.insert(MAIN_BUFFER.to_string(), BufferRecord::new());
    Self { records, active: 0 }
  }

  pub fn active_name(&self) -> &str {
    self
      .records
      .get_index(self.active)
      .map(|(name, _)| name.as_str())
      .unwrap_or(MAIN_BUFFER)
  }

  pub fn active(&self) -> &BufferRecord {
    &self.records[self.active]
  }

  pub fn active_mut(&mut self) -> &mut BufferRecord {
    &mut self.records[self.active]
  }

  /// Makes `name` the active record, creating an empty one if the name is
  /// new. Returns whether a record was created.
  pub fn switch_to(&mut self, name: &str) -> bool {
    if let Some(index) = self.records.get_index_of(name) {
      self.active = index;
      return false;
    }
    let (index, _) = self
      .records
      .insert_full(name.to_string(), BufferRecord::new());
    self.active = index;
    tracing::debug!(buffer = name, "created buffer");
    true
  }

  pub fn get(&self, name: &str) -> Option<&BufferRecord> {
    self.records.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.records.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Names in creation order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.records.keys().map(String::as_str)
  }

  pub fn summaries(&self) -> Vec<BufferSummary> {
    self
      .records
      .iter()
      .enumerate()
      .map(|(index, (name, record))| {
        BufferSummary {
          name:      name.clone(),
          lines:     record.text.line_count(),
          bytes:     record.text.len(),
          is_active: index == self.active,
        }
      })
      .collect()
  }
}
