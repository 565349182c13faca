//! The segmented container.
//!
//! Every segment is framed as
//!
//! ```text
//! 0x65 0x62  rounds  len(3 bytes, big endian)  payload[len]  checksum  flag
//! ```
//!
//! where `checksum` is the wrapping byte sum of the decoded segment and `flag`
//! is `]` on the final segment and `[` on every other one.

use std::io::{
  self,
  Read,
  Write,
};

use crate::{
  compress::compress_segment,
  decompress::expand_segment,
  error::{
    Result,
    SczError,
  },
};

pub const MAGIC: [u8; 2] = [0x65, 0x62];
pub const FINAL_SEGMENT: u8 = b']';
pub const MORE_SEGMENTS: u8 = b'[';

/// Segments must stay below this many bytes so their length fits the
/// three-byte field.
pub const MAX_SEGMENT_LEN: usize = 0x00FF_FFFF;

/// Default upper bound on the bytes placed in one segment.
pub const DEFAULT_SEGMENT_SIZE: usize = 4 * 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
  /// Upper bound on segment size. Input is split into equal segments of at
  /// most this size.
  pub segment_size: usize,
}

impl Default for CompressOptions {
  fn default() -> Self {
    Self {
      segment_size: DEFAULT_SEGMENT_SIZE,
    }
  }
}

/// What to do when a decoded segment does not match its stored checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
  /// Log a warning, count the mismatch and keep the data.
  #[default]
  Warn,
  /// Fail with [`SczError::ChecksumMismatch`].
  Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompressOptions {
  pub checksum: ChecksumPolicy,
}

/// Totals for one compressed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
  pub segments:     usize,
  pub input_bytes:  usize,
  pub output_bytes: usize,
}

impl FrameStats {
  /// Input size over output size.
  pub fn ratio(&self) -> f64 {
    if self.output_bytes == 0 {
      return 0.0;
    }
    self.input_bytes as f64 / self.output_bytes as f64
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
  pub bytes:               Vec<u8>,
  pub segments:            usize,
  pub checksum_mismatches: usize,
}

/// Wrapping byte sum.
pub fn checksum(data: &[u8]) -> u8 {
  data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Length of every segment but the last when splitting `total` bytes into
/// segments of at most `max` bytes.
pub fn segment_length(total: usize, max: usize) -> Result<usize> {
  let segments = total / max.max(1) + 1;
  let len = total / segments + 1;
  if len >= MAX_SEGMENT_LEN {
    return Err(SczError::SegmentTooLarge {
      len,
      max: MAX_SEGMENT_LEN,
    });
  }
  Ok(len)
}

/// Compresses and frames one segment.
pub fn encode_segment(data: &[u8], last: bool) -> Result<Vec<u8>> {
  if data.len() >= MAX_SEGMENT_LEN {
    return Err(SczError::SegmentTooLarge {
      len: data.len(),
      max: MAX_SEGMENT_LEN,
    });
  }
  let segment = compress_segment(data);
  let len = segment.payload.len() as u32;

  let mut out = Vec::with_capacity(segment.payload.len() + 8);
  out.extend_from_slice(&MAGIC);
  out.push(segment.rounds);
  out.extend_from_slice(&len.to_be_bytes()[1..]);
  out.extend_from_slice(&segment.payload);
  out.push(checksum(data));
  out.push(if last { FINAL_SEGMENT } else { MORE_SEGMENTS });
  tracing::debug!(
    input = data.len(),
    output = out.len(),
    rounds = segment.rounds,
    last,
    "framed segment"
  );
  Ok(out)
}

/// Compresses `data` into `writer` as a sequence of segments.
pub fn write_compressed(data: &[u8], options: &CompressOptions, mut writer: impl Write) -> Result<FrameStats> {
  let len = segment_length(data.len(), options.segment_size)?;
  let mut stats = FrameStats {
    input_bytes: data.len(),
    ..FrameStats::default()
  };

  if data.is_empty() {
    let frame = encode_segment(data, true)?;
    writer.write_all(&frame)?;
    stats.segments = 1;
    stats.output_bytes = frame.len();
    writer.flush()?;
    return Ok(stats);
  }

  let count = data.len().div_ceil(len);
  for (index, chunk) in data.chunks(len).enumerate() {
    let frame = encode_segment(chunk, index + 1 == count)?;
    writer.write_all(&frame)?;
    stats.segments += 1;
    stats.output_bytes += frame.len();
  }
  writer.flush()?;
  Ok(stats)
}

/// Compresses `data` into a new buffer.
pub fn compress(data: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
  let mut out = Vec::new();
  write_compressed(data, options, &mut out)?;
  Ok(out)
}

fn read_exact(reader: &mut impl Read, buf: &mut [u8], context: &'static str) -> Result<()> {
  reader.read_exact(buf).map_err(|err| {
    match err.kind() {
      io::ErrorKind::UnexpectedEof => SczError::Truncated { context },
      _ => SczError::Io(err),
    }
  })
}

/// Decodes segments from `reader` until the final one.
///
/// Nothing is returned for a malformed stream, even when earlier segments
/// decoded fine.
pub fn read_compressed(mut reader: impl Read, options: &DecompressOptions) -> Result<Decoded> {
  let mut decoded = Decoded::default();
  loop {
    let mut header = [0u8; 6];
    read_exact(&mut reader, &mut header, "segment header")?;
    let [first, second, rounds, len @ ..] = header;
    if [first, second] != MAGIC {
      return Err(SczError::BadMagic {
        found: [first, second],
      });
    }
    let len = u32::from_be_bytes([0, len[0], len[1], len[2]]) as usize;

    let mut payload = Vec::new();
    (&mut reader).take(len as u64).read_to_end(&mut payload)?;
    if payload.len() < len {
      return Err(SczError::Truncated {
        context: "segment payload",
      });
    }
    let mut trailer = [0u8; 2];
    read_exact(&mut reader, &mut trailer, "segment trailer")?;
    let [stored, flag] = trailer;
    let last = match flag {
      FINAL_SEGMENT => true,
      MORE_SEGMENTS => false,
      found => return Err(SczError::BadContinuation { found }),
    };

    let segment = expand_segment(rounds, &payload)?;
    let computed = checksum(&segment);
    if computed != stored {
      match options.checksum {
        ChecksumPolicy::Strict => {
          return Err(SczError::ChecksumMismatch {
            segment: decoded.segments,
            stored,
            computed,
          });
        },
        ChecksumPolicy::Warn => {
          tracing::warn!(segment = decoded.segments, stored, computed, "checksum mismatch");
          decoded.checksum_mismatches += 1;
        },
      }
    }
    decoded.bytes.extend_from_slice(&segment);
    decoded.segments += 1;
    if last {
      break;
    }
  }

  let mut extra = [0u8; 1];
  if reader.read(&mut extra)? > 0 {
    tracing::warn!("ignoring bytes after the final segment");
  }
  Ok(decoded)
}

/// Decodes a complete stream held in memory.
pub fn decompress(bytes: &[u8], options: &DecompressOptions) -> Result<Decoded> {
  read_compressed(bytes, options)
}
