use std::path::Path;

use anyhow::{
  Context,
  Result,
};
use edt_core::EditorSession;

use crate::{
  cli::Command,
  config::Config,
  files,
};

/// Runs `command` and returns the summary printed on success.
pub fn run(command: &Command, config: &Config) -> Result<String> {
  match command {
    Command::Compress {
      input,
      output,
      segment_size,
    } => {
      let output = output.clone().unwrap_or_else(|| files::compressed_name(input));
      compress(input, &output, *segment_size, config)
    },
    Command::Decompress {
      input,
      output,
      strict,
    } => {
      let output = output.clone().unwrap_or_else(|| files::decompressed_name(input));
      decompress(input, &output, *strict, config)
    },
    Command::Stat { file } => stat(file, config),
    Command::Substitute {
      file,
      search,
      replace,
      case_sensitive,
      output,
    } => {
      let output = output.as_deref().unwrap_or(file);
      substitute(file, output, search, replace, *case_sensitive, config)
    },
  }
}

fn compress(input: &Path, output: &Path, segment_size: Option<usize>, config: &Config) -> Result<String> {
  let bytes = std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
  let mut options = config.scz.compress_options();
  if let Some(size) = segment_size {
    options.segment_size = size;
  }
  let packed = edt_scz::compress(&bytes, &options)?;
  std::fs::write(output, &packed).with_context(|| format!("failed to write {}", output.display()))?;
  log::info!("compressed {} into {}", input.display(), output.display());
  Ok(format!(
    "{}: {} -> {} bytes",
    output.display(),
    bytes.len(),
    packed.len()
  ))
}

fn decompress(input: &Path, output: &Path, strict: bool, config: &Config) -> Result<String> {
  let bytes = std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
  let mut options = config.scz.decompress_options();
  if strict {
    options.checksum = edt_scz::ChecksumPolicy::Strict;
  }
  let decoded = edt_scz::decompress(&bytes, &options)
    .with_context(|| format!("failed to decompress {}", input.display()))?;
  std::fs::write(output, &decoded.bytes)
    .with_context(|| format!("failed to write {}", output.display()))?;

  let mut summary = format!(
    "{}: {} segments, {} bytes",
    output.display(),
    decoded.segments,
    decoded.bytes.len()
  );
  if decoded.checksum_mismatches > 0 {
    summary.push_str(&format!(", {} checksum mismatches", decoded.checksum_mismatches));
  }
  Ok(summary)
}

fn stat(file: &Path, config: &Config) -> Result<String> {
  let raw = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
  let (bytes, container) = if files::is_compressed(file) {
    let decoded = edt_scz::decompress(&raw, &config.scz.decompress_options())
      .with_context(|| format!("failed to decompress {}", file.display()))?;
    let note = format!(
      ", {} segments, ratio {:.2}",
      decoded.segments,
      decoded.bytes.len() as f64 / raw.len().max(1) as f64
    );
    (decoded.bytes, note)
  } else {
    (raw, String::new())
  };

  let mut session = EditorSession::new(config.editor.session_settings());
  let loaded = session.load_document(&bytes);
  let missing_newline = if loaded.appended_newline {
    ", no final newline"
  } else {
    ""
  };
  Ok(format!(
    "{}: {} lines, {} bytes{missing_newline}{container}",
    file.display(),
    session.line_count(),
    session.text().len(),
  ))
}

fn substitute(
  file: &Path,
  output: &Path,
  search: &str,
  replace: &str,
  case_sensitive: bool,
  config: &Config,
) -> Result<String> {
  let bytes = files::read_document(file, &config.scz.decompress_options())?;
  let mut session = EditorSession::new(config.editor.session_settings());
  session.set_case_insensitive(config.editor.case_insensitive_search && !case_sensitive);
  session.load_document(&bytes);

  let count = session.substitute_all(search.as_bytes(), replace.as_bytes())?;
  if count > 0 || output != file {
    files::write_document(output, &session.serialize(), &config.scz.compress_options())?;
  }
  log::info!("{count} substitutions in {}", file.display());
  Ok(format!("{}: {count} substitutions", output.display()))
}
