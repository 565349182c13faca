use std::path::PathBuf;

use anyhow::{
  Result,
  bail,
};
use clap::{
  ArgAction,
  Parser,
  Subcommand,
};
use edt_scz::frame::MAX_SEGMENT_LEN;

/// Parsed command line.
#[derive(Clone, Debug)]
pub struct CliOptions {
  pub verbosity:   u8,
  pub log_file:    Option<PathBuf>,
  pub config_file: Option<PathBuf>,
  pub command:     Command,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
  Compress {
    input:        PathBuf,
    output:       Option<PathBuf>,
    segment_size: Option<usize>,
  },
  Decompress {
    input:  PathBuf,
    output: Option<PathBuf>,
    strict: bool,
  },
  Stat {
    file: PathBuf,
  },
  Substitute {
    file:           PathBuf,
    search:         String,
    replace:        String,
    case_sensitive: bool,
    output:         Option<PathBuf>,
  },
}

impl CliOptions {
  pub fn parse() -> Result<Self> {
    let raw = RawCli::parse();
    raw.try_into()
  }

  #[cfg(test)]
  fn parse_from<I, T>(args: I) -> Result<Self>
  where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
  {
    RawCli::try_parse_from(args)?.try_into()
  }
}

#[derive(Parser, Debug)]
#[command(name = "edt", about, version, long_about = None)]
struct RawCli {
  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count, global = true)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE", global = true, value_parser = parse_pathbuf)]
  log_file: Option<PathBuf>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE", global = true, value_parser = parse_pathbuf)]
  config_file: Option<PathBuf>,

  #[command(subcommand)]
  command: RawCommand,
}

#[derive(Subcommand, Debug)]
enum RawCommand {
  /// Compress a file into the scz container
  Compress {
    input:        PathBuf,
    /// Defaults to the input name with `.scz` appended
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output:       Option<PathBuf>,
    /// Largest segment to compress at once
    #[arg(long = "segment-size", value_name = "BYTES")]
    segment_size: Option<usize>,
  },
  /// Restore a compressed file
  Decompress {
    input:  PathBuf,
    /// Defaults to the input name without `.scz`, or with `.uscz` appended
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,
    /// Fail on checksum mismatches instead of warning
    #[arg(long)]
    strict: bool,
  },
  /// Print line, byte and container statistics for a file
  Stat { file: PathBuf },
  /// Replace every match of SEARCH with REPLACE. Both accept %NNN escapes
  Substitute {
    file:           PathBuf,
    search:         String,
    replace:        String,
    #[arg(long = "case-sensitive")]
    case_sensitive: bool,
    /// Write the result here instead of back to FILE
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output:         Option<PathBuf>,
  },
}

impl TryFrom<RawCli> for CliOptions {
  type Error = anyhow::Error;

  fn try_from(raw: RawCli) -> Result<Self> {
    let command = match raw.command {
      RawCommand::Compress {
        input,
        output,
        segment_size,
      } => {
        if let Some(size) = segment_size
          && (size == 0 || size >= MAX_SEGMENT_LEN)
        {
          bail!("--segment-size must be between 1 and {}", MAX_SEGMENT_LEN - 1);
        }
        Command::Compress {
          input,
          output,
          segment_size,
        }
      },
      RawCommand::Decompress {
        input,
        output,
        strict,
      } => {
        Command::Decompress {
          input,
          output,
          strict,
        }
      },
      RawCommand::Stat { file } => Command::Stat { file },
      RawCommand::Substitute {
        file,
        search,
        replace,
        case_sensitive,
        output,
      } => {
        if search.is_empty() {
          bail!("search string must not be empty");
        }
        Command::Substitute {
          file,
          search,
          replace,
          case_sensitive,
          output,
        }
      },
    };

    Ok(Self {
      verbosity: raw.verbosity,
      log_file: raw.log_file,
      config_file: raw.config_file,
      command,
    })
  }
}

fn parse_pathbuf(value: &str) -> std::result::Result<PathBuf, String> {
  Ok(edt_loader::expand_tilde(std::path::Path::new(value)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn global_flags_and_compress() {
    let options =
      CliOptions::parse_from(["edt", "-vv", "--log", "out.log", "compress", "notes.txt", "--segment-size", "1024"])
        .unwrap();
    assert_eq!(options.verbosity, 2);
    assert_eq!(options.log_file, Some(PathBuf::from("out.log")));
    assert_eq!(options.command, Command::Compress {
      input:        PathBuf::from("notes.txt"),
      output:       None,
      segment_size: Some(1024),
    });
  }

  #[test]
  fn substitute_arguments() {
    let options = CliOptions::parse_from([
      "edt",
      "substitute",
      "a.txt",
      "foo",
      "bar%010",
      "--case-sensitive",
      "-o",
      "b.txt",
    ])
    .unwrap();
    assert_eq!(options.command, Command::Substitute {
      file:           PathBuf::from("a.txt"),
      search:         "foo".into(),
      replace:        "bar%010".into(),
      case_sensitive: true,
      output:         Some(PathBuf::from("b.txt")),
    });
  }

  #[test]
  fn rejects_degenerate_values() {
    assert!(CliOptions::parse_from(["edt", "compress", "x", "--segment-size", "0"]).is_err());
    assert!(CliOptions::parse_from(["edt", "compress", "x", "--segment-size", "20000000"]).is_err());
    assert!(CliOptions::parse_from(["edt", "substitute", "x", "", "y"]).is_err());
    assert!(CliOptions::parse_from(["edt"]).is_err());
  }
}
