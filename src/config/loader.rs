// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Load a configuration file and return the raw, unvalidated `RawConfigFile`.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file and validate it.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `Fanexec.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Fanexec.toml")
}

/// Find the config for a run.
///
/// An explicit path must exist. Without one, the default path is used only
/// if it is present; otherwise there is no config at all.
pub fn discover_config(fs: &dyn FileSystem, explicit: Option<&str>) -> Result<Option<ConfigFile>> {
    let path = match explicit {
        Some(path) => PathBuf::from(path),
        None => {
            let default = default_config_path();
            if !fs.is_file(&default) {
                debug!("no config file given and no default config present");
                return Ok(None);
            }
            default
        }
    };

    debug!(path = %path.display(), "loading config file");
    load_and_validate(fs, &path).map(Some)
}
