//! Run configuration, loaded from `pdxhist.toml`
//!
//! ```toml
//! primary_root = "/games/mods/SWMH"
//! secondary_root = "/games/Crusader Kings II"
//! output = "emf_nomad_codegen.txt"
//! cutoff_year = 1337
//! unplayable_ranges = [[0, 867], [867, 1066]]
//! ```
//!
//! Every field is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use pdx_core::{HistoryOptions, UnplayableRanges};
use serde::Deserialize;

use crate::error::{CliError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "pdxhist.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Mod root searched first for map data and history files
    pub primary_root: PathBuf,
    /// Fallback root (usually the base game) for history files
    pub secondary_root: Option<PathBuf>,
    pub output: PathBuf,
    pub cutoff_year: u32,
    pub unplayable_ranges: Vec<(u32, u32)>,
}

impl Default for Config {
    fn default() -> Self {
        let history = HistoryOptions::default();
        Config {
            primary_root: PathBuf::from("."),
            secondary_root: None,
            output: PathBuf::from("emf_nomad_codegen.txt"),
            cutoff_year: history.cutoff_year,
            unplayable_ranges: history.unplayable.ranges().to_vec(),
        }
    }
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// An explicit path must exist; otherwise `pdxhist.toml` in the working
    /// directory is used when present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    tracing::debug!(path = %default.display(), "loading config");
                    Self::load(default)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn history_options(&self) -> Result<HistoryOptions> {
        Ok(HistoryOptions {
            cutoff_year: self.cutoff_year,
            unplayable: UnplayableRanges::new(self.unplayable_ranges.clone())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config> {
        Config::parse(text, Path::new("pdxhist.toml"))
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_defaults_match_history_defaults() {
        let opts = Config::default().history_options().unwrap();
        assert_eq!(opts, HistoryOptions::default());
    }

    #[test]
    fn test_full_config() {
        let cfg = parse(
            r#"
primary_root = "mod"
secondary_root = "vanilla"
output = "out.txt"
cutoff_year = 1200
unplayable_ranges = [[0, 769], [769, 867]]
"#,
        )
        .unwrap();
        assert_eq!(cfg.primary_root, PathBuf::from("mod"));
        assert_eq!(cfg.secondary_root, Some(PathBuf::from("vanilla")));
        assert_eq!(cfg.cutoff_year, 1200);
        assert_eq!(cfg.unplayable_ranges, vec![(0, 769), (769, 867)]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse("end_year = 1337").unwrap_err();
        assert!(err.to_string().starts_with("pdxhist.toml: invalid config"));
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let cfg = parse("unplayable_ranges = [[0, 900], [867, 1066]]").unwrap();
        assert!(cfg.history_options().is_err());
    }
}
