//! Reading and writing documents, with `.scz` files decompressed and
//! compressed on the way through.

use std::{
  ffi::OsString,
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use anyhow::{
  Context,
  Result,
};
use edt_scz::{
  CompressOptions,
  DecompressOptions,
  FrameStats,
};

pub const COMPRESSED_EXTENSION: &str = "scz";
const UNCOMPRESSED_SUFFIX: &str = ".uscz";

pub fn is_compressed(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|ext| ext == COMPRESSED_EXTENSION)
}

/// `path` with `.scz` appended.
pub fn compressed_name(path: &Path) -> PathBuf {
  append_suffix(path, ".scz")
}

/// `path` without its `.scz` extension, or with `.uscz` appended if it has
/// none.
pub fn decompressed_name(path: &Path) -> PathBuf {
  if is_compressed(path) {
    path.with_extension("")
  } else {
    append_suffix(path, UNCOMPRESSED_SUFFIX)
  }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut name = OsString::from(path.as_os_str());
  name.push(suffix);
  PathBuf::from(name)
}

/// Reads a document's bytes, decompressing `.scz` files.
pub fn read_document(path: &Path, options: &DecompressOptions) -> Result<Vec<u8>> {
  let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
  if !is_compressed(path) {
    return Ok(bytes);
  }
  let decoded = edt_scz::decompress(&bytes, options)
    .with_context(|| format!("failed to decompress {}", path.display()))?;
  if decoded.checksum_mismatches > 0 {
    log::warn!(
      "{}: {} of {} segments failed their checksum",
      path.display(),
      decoded.checksum_mismatches,
      decoded.segments
    );
  }
  Ok(decoded.bytes)
}

/// Writes a document, compressing it when `path` ends in `.scz`. Returns the
/// container statistics for compressed writes. Nothing is written when
/// compression fails.
pub fn write_document(
  path: &Path,
  bytes: &[u8],
  options: &CompressOptions,
) -> Result<Option<FrameStats>> {
  if !is_compressed(path) {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    return Ok(None);
  }
  let mut packed = Vec::new();
  let stats = edt_scz::write_compressed(bytes, options, &mut packed)
    .with_context(|| format!("failed to compress {}", path.display()))?;
  fs::write(path, &packed).with_context(|| format!("failed to write {}", path.display()))?;
  log::info!(
    "wrote {} ({} segments, {} -> {} bytes)",
    path.display(),
    stats.segments,
    stats.input_bytes,
    stats.output_bytes
  );
  Ok(Some(stats))
}
