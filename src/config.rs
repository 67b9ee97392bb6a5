use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the persisted settings.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding the settings location.
pub const CONFIG_ENV_VAR: &str = "S11_EXPORT_CONFIG";

/// Package directory the simulator's scripting library must contain.
pub const LIBRARY_PACKAGE_DIR: &str = "cst";

// ---------------------------------------------------------------------------
// Persisted settings
// ---------------------------------------------------------------------------

/// Settings kept across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the simulator's scripting library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,
}

impl Config {
    /// Where settings live when no location is given: `$S11_EXPORT_CONFIG`,
    /// else `config.json` next to the executable, else the working directory.
    pub fn default_path() -> PathBuf {
        if let Some(p) = std::env::var_os(CONFIG_ENV_VAR) {
            return PathBuf::from(p);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Read settings. A missing file yields the defaults; so does an
    /// unreadable or corrupt one, with a warning.
    pub fn load(path: &Path) -> Config {
        if !path.exists() {
            return Config::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring settings in {}: {e}", path.display());
                Config::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// The configured library path, checked with [`validate_library_path`].
    pub fn validated_library_path(&self) -> Result<PathBuf> {
        let path = self.library_path.as_deref().ok_or(Error::MissingLibraryPath)?;
        validate_library_path(path)?;
        Ok(path.to_path_buf())
    }

    /// Validate and store a new library path. The previous value is kept on failure.
    pub fn set_library_path(&mut self, path: PathBuf) -> Result<()> {
        validate_library_path(&path)?;
        self.library_path = Some(path);
        Ok(())
    }
}

/// A library path is valid when it is a directory holding the `cst` package.
pub fn validate_library_path(path: &Path) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidLibraryPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    if !path.is_dir() {
        return Err(invalid("not a directory"));
    }
    if !path.join(LIBRARY_PACKAGE_DIR).is_dir() {
        return Err(invalid(&format!(
            "no '{LIBRARY_PACKAGE_DIR}' package directory"
        )));
    }
    Ok(())
}
