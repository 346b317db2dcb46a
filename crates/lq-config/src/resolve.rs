//! Path resolution for data files referenced by a configuration.
//!
//! Resolves relative and tilde-prefixed paths of synonym lists and dictionaries.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a data file path to an absolute path.
///
/// Handles three cases:
/// - Tilde paths (`~/lists/drugs.csv`) - expanded to home directory
/// - Relative paths (`./drugs.csv`, `../shared/drugs.csv`) - resolved relative to `config_dir`,
///   or to the working directory when the configuration did not come from a file
/// - Absolute paths - returned as-is after validation
///
/// The path must exist. Returns an error otherwise.
pub fn resolve_data_path(path: &str, config_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;

    let absolute = match config_dir {
        Some(dir) if !expanded.is_absolute() => dir.join(&expanded),
        _ => expanded,
    };

    absolute
        .canonicalize()
        .map_err(|source| ConfigError::PathResolution {
            path: absolute.clone(),
            source,
        })
}

/// Expands a leading `~` or `~/` to the home directory. Other paths are returned unchanged.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    let Some(rest) = path
        .strip_prefix('~')
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
    else {
        return Ok(PathBuf::from(path));
    };
    let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
    let home = dirs.home_dir();
    Ok(match rest.trim_start_matches('/') {
        "" => home.to_path_buf(),
        rest => home.join(rest),
    })
}
