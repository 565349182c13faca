use thiserror::Error;

#[derive(Debug, Error)]
pub enum SczError {
  #[error("not an SCZ stream: bad magic bytes {found:?}")]
  BadMagic { found: [u8; 2] },
  #[error("SCZ stream ended early while reading {context}")]
  Truncated { context: &'static str },
  #[error("corrupted substitution header: expected boundary byte, found {found}")]
  MissingBoundary { found: u8 },
  #[error("corrupted segment trailer: unknown continuation byte {found}")]
  BadContinuation { found: u8 },
  #[error("forcing byte at end of segment body")]
  DanglingForcingByte,
  #[error("segment of {len} bytes exceeds the {max} byte limit")]
  SegmentTooLarge { len: usize, max: usize },
  #[error("checksum mismatch in segment {segment}: stored {stored}, computed {computed}")]
  ChecksumMismatch {
    segment:  usize,
    stored:   u8,
    computed: u8,
  },
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SczError>;
