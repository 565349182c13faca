use std::{
  fs,
  io::Error as IOError,
  path::Path,
};

use edt_core::SessionSettings;
use edt_scz::{
  ChecksumPolicy,
  CompressOptions,
  DecompressOptions,
  frame::{
    DEFAULT_SEGMENT_SIZE,
    MAX_SEGMENT_LEN,
  },
};
use serde::{
  Deserialize,
  Deserializer,
  de::Error as _,
};
use toml::{
  Value,
  de::Error as TomlError,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
  pub editor: EditorConfig,
  pub scz:    SczConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigRaw {
  pub editor: Option<Value>,
  pub scz:    Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EditorConfig {
  pub rows:                    usize,
  pub cols:                    usize,
  pub right_margin:            usize,
  pub page_rows:               usize,
  pub case_insensitive_search: bool,
}

impl Default for EditorConfig {
  fn default() -> Self {
    let settings = SessionSettings::default();
    Self {
      rows:                    settings.rows,
      cols:                    settings.cols,
      right_margin:            settings.right_margin,
      page_rows:               settings.page_rows,
      case_insensitive_search: true,
    }
  }
}

impl EditorConfig {
  pub fn session_settings(&self) -> SessionSettings {
    SessionSettings {
      rows:         self.rows,
      cols:         self.cols,
      right_margin: self.right_margin,
      page_rows:    self.page_rows,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SczConfig {
  #[serde(deserialize_with = "deserialize_segment_size")]
  pub segment_size:    usize,
  pub strict_checksum: bool,
}

impl Default for SczConfig {
  fn default() -> Self {
    Self {
      segment_size:    DEFAULT_SEGMENT_SIZE,
      strict_checksum: false,
    }
  }
}

fn deserialize_segment_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
  D: Deserializer<'de>,
{
  let size = usize::deserialize(deserializer)?;
  if size == 0 || size >= MAX_SEGMENT_LEN {
    return Err(D::Error::custom(format!(
      "segment-size must be between 1 and {}",
      MAX_SEGMENT_LEN - 1
    )));
  }
  Ok(size)
}

impl SczConfig {
  pub fn compress_options(&self) -> CompressOptions {
    CompressOptions {
      segment_size: self.segment_size,
    }
  }

  pub fn decompress_options(&self) -> DecompressOptions {
    DecompressOptions {
      checksum: if self.strict_checksum {
        ChecksumPolicy::Strict
      } else {
        ChecksumPolicy::Warn
      },
    }
  }
}

#[derive(Debug)]
pub enum ConfigLoadError {
  BadConfig(TomlError),
  Error(IOError),
}

impl std::fmt::Display for ConfigLoadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::BadConfig(err) => write!(f, "bad config: {err}"),
      Self::Error(err) => write!(f, "failed to read config: {err}"),
    }
  }
}

impl std::error::Error for ConfigLoadError {}

impl Config {
  pub fn load(source: Result<String, ConfigLoadError>) -> Result<Config, ConfigLoadError> {
    let raw: ConfigRaw =
      source.and_then(|file| toml::from_str(&file).map_err(ConfigLoadError::BadConfig))?;

    Ok(Config {
      editor: raw.editor.map_or_else(
        || Ok(EditorConfig::default()),
        |val| val.try_into().map_err(ConfigLoadError::BadConfig),
      )?,
      scz:    raw.scz.map_or_else(
        || Ok(SczConfig::default()),
        |val| val.try_into().map_err(ConfigLoadError::BadConfig),
      )?,
    })
  }

  /// Loads `path`, falling back to defaults when the file does not exist.
  pub fn load_file(path: &Path) -> Result<Config, ConfigLoadError> {
    match fs::read_to_string(path) {
      Ok(text) => Self::load(Ok(text)),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        log::debug!("no config at {}, using defaults", path.display());
        Ok(Config::default())
      },
      Err(err) => Err(ConfigLoadError::Error(err)),
    }
  }

  /// Loads the config file chosen through `edt_loader::initialize_config_file`.
  pub fn load_user() -> Result<Config, ConfigLoadError> {
    Self::load_file(&edt_loader::config_file())
  }
}
