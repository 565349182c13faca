//! Well-known locations for edt's configuration and log files.

use std::{
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

const APP_DIR: &str = "edt";

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  ensure_parent_dir(&config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

/// Replaces a leading `~` with the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  match path.strip_prefix("~") {
    Ok(rest) => {
      match etcetera::home_dir() {
        Ok(home) => home.join(rest),
        Err(_) => path.to_path_buf(),
      }
    },
    Err(_) => path.to_path_buf(),
  }
}

/// `$EDT_CONFIG_DIR`, or `edt/` under the platform config directory.
pub fn config_dir() -> PathBuf {
  if let Some(dir) = dir_override("EDT_CONFIG_DIR") {
    return dir;
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.config_dir().join(APP_DIR),
    Err(err) => fallback_dir(&err),
  }
}

/// `$EDT_CACHE_DIR`, or `edt/` under the platform cache directory.
pub fn cache_dir() -> PathBuf {
  if let Some(dir) = dir_override("EDT_CACHE_DIR") {
    return dir;
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.cache_dir().join(APP_DIR),
    Err(err) => fallback_dir(&err),
  }
}

fn dir_override(var: &str) -> Option<PathBuf> {
  std::env::var_os(var)
    .filter(|dir| !dir.is_empty())
    .map(|dir| expand_tilde(Path::new(&dir)))
}

fn fallback_dir(err: &dyn std::fmt::Display) -> PathBuf {
  tracing::warn!("no home directory found ({err}), using ./.{APP_DIR}");
  PathBuf::from(format!(".{APP_DIR}"))
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE
    .get_or_init(|| {
      let path = default_config_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn log_file() -> PathBuf {
  LOG_FILE
    .get_or_init(|| {
      let path = default_log_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn default_config_file() -> PathBuf {
  config_dir().join("config.toml")
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("edt.log")
}

fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent()
    && !parent.exists()
  {
    std::fs::create_dir_all(parent).ok();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_expands_to_home() {
    let expanded = expand_tilde(Path::new("~/notes.txt"));
    if let Ok(home) = etcetera::home_dir() {
      assert_eq!(expanded, home.join("notes.txt"));
    }
    assert_eq!(expand_tilde(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    assert_eq!(expand_tilde(Path::new("a~/b")), PathBuf::from("a~/b"));
  }

  #[test]
  fn default_files_live_under_app_dirs() {
    assert!(default_config_file().ends_with("config.toml"));
    assert!(default_log_file().ends_with("edt.log"));
  }

  #[test]
  fn parent_dirs_are_created() {
    let root = tempfile::tempdir().unwrap();
    let file = root.path().join("a").join("b").join("edt.log");
    ensure_parent_dir(&file);
    assert!(file.parent().unwrap().is_dir());
    ensure_parent_dir(&file);
  }
}
