//! TOML-backed configuration for the driver (§6). Values here are
//! defaults only — CLI flags always win (see [`crate::run`]'s
//! layering of `cli.verbose`/`cli.emit` over these).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::EmitKind;
use crate::error::{DriverError, Result};

pub const CONFIG_FILE_NAME: &str = "cogen.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverConfig {
    #[serde(default)]
    pub verbose: Option<u8>,
    #[serde(default)]
    pub emit: Option<EmitKind>,
}

impl DriverConfig {
    /// Load from `explicit_path` if given, otherwise search the
    /// current directory then the user's config directory, falling
    /// back to defaults if nothing is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover(),
        };
        match path {
            Some(p) => Self::load_from_path(&p),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DriverError::Config(format!("configuration file not found: {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DriverError::Config(format!("{}: {e}", path.display())))
    }

    fn discover() -> Option<PathBuf> {
        let cwd_candidate = PathBuf::from(CONFIG_FILE_NAME);
        if cwd_candidate.exists() {
            return Some(cwd_candidate);
        }
        dirs::config_dir().map(|dir| dir.join("cogen").join(CONFIG_FILE_NAME)).filter(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_nothing_found() {
        let config = DriverConfig::default();
        assert_eq!(config.verbose, None);
        assert_eq!(config.emit, None);
    }

    #[test]
    fn loads_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cogen.toml");
        std::fs::write(&path, "verbose = 2\nemit = \"ast\"\n").unwrap();
        let config = DriverConfig::load_from_path(&path).unwrap();
        assert_eq!(config.verbose, Some(2));
        assert_eq!(config.emit, Some(EmitKind::Ast));
    }

    #[test]
    fn missing_explicit_path_errors() {
        let result = DriverConfig::load_from_path(Path::new("/nonexistent/cogen.toml"));
        assert!(result.is_err());
    }
}
