//! SCZ, a pair-substitution compressor.
//!
//! Each round finds the most frequent byte pairs and the least used byte
//! values. The rarest byte becomes the forcing byte, and the next rarest ones
//! become markers that stand in for the frequent pairs. A round is kept only
//! when it pays for its own header. Running rounds repeatedly builds longer
//! phrases out of pairs of earlier markers.
//!
//! The container splits input into segments, each carrying its round count,
//! payload length, checksum and a continuation flag. Segments decode
//! independently, so the decoded output does not depend on where the
//! boundaries fell.
//!
//! ```
//! use edt_scz::{CompressOptions, DecompressOptions};
//!
//! let text = b"the cat sat on the mat with the hat".repeat(8);
//! let packed = edt_scz::compress(&text, &CompressOptions::default()).unwrap();
//! let decoded = edt_scz::decompress(&packed, &DecompressOptions::default()).unwrap();
//! assert_eq!(decoded.bytes, text);
//! ```

pub mod analyze;
pub mod compress;
pub mod decompress;
pub mod error;
pub mod frame;
pub mod table;

pub use compress::{
  CompressedSegment,
  compress_segment,
};
pub use decompress::expand_segment;
pub use error::{
  Result,
  SczError,
};
pub use frame::{
  ChecksumPolicy,
  CompressOptions,
  DecompressOptions,
  Decoded,
  FrameStats,
  compress,
  decompress,
  encode_segment,
  read_compressed,
  write_compressed,
};
