use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use taskdeck_store_local::{LocalStore, LocalStoreError};
use thiserror::Error;
use tracing::debug;

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DATA_FILE: &str = "tasks.json";

/// Failures while loading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`AppConfig`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// The file parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration loaded from `<data-dir>/config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(skip)]
    data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from `data_dir`. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self {
                data_dir,
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;
        config.validate()?;
        config.data_dir = data_dir;
        debug!(path = %config_path.display(), "Loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.store.ensure_valid_data_file()
    }

    /// Directory the configuration was loaded from.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Data file location; relative paths resolve against the data dir.
    #[must_use]
    pub fn data_file_path(&self) -> PathBuf {
        let file = Path::new(&self.store.data_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    /// Open the configured store, seeding the starter categories when enabled.
    ///
    /// # Errors
    /// Returns an error if the data file cannot be opened or seeding fails.
    pub fn open_store(&self) -> Result<LocalStore, LocalStoreError> {
        let store = LocalStore::open(self.data_file_path())?;
        if self.store.seed_default_categories {
            store.seed_default_categories()?;
        }
        Ok(store)
    }
}

/// `[store]` block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_data_file")]
    pub data_file: String,
    #[serde(default = "StoreConfig::default_seed")]
    pub seed_default_categories: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: Self::default_data_file(),
            seed_default_categories: Self::default_seed(),
        }
    }
}

impl StoreConfig {
    fn default_data_file() -> String {
        DEFAULT_DATA_FILE.into()
    }

    const fn default_seed() -> bool {
        true
    }

    fn ensure_valid_data_file(&self) -> Result<(), ConfigError> {
        let trimmed = self.data_file.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("store.data_file must not be empty".into()));
        }
        if trimmed.ends_with(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "store.data_file must name a file, got '{}'",
                self.data_file
            )));
        }
        Ok(())
    }
}
