//! Get/update/reset over the single settings record.

use taskdeck_core::{Settings, SettingsPatch, TaskError};
use tracing::{debug, info};

use crate::async_store::AsyncSettingsStore;

/// Settings access with a fixed default when nothing is stored.
pub struct SettingsService<S> {
    store: S,
}

impl<S: AsyncSettingsStore> SettingsService<S> {
    /// Wrap a settings store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored settings, or the default record when none exists.
    ///
    /// # Errors
    /// Returns the store failure; a failure is never masked as defaults.
    pub async fn get(&self) -> Result<Settings, TaskError> {
        let stored = self.store.fetch_settings().await.map_err(Into::<TaskError>::into)?;
        if stored.is_none() {
            debug!("No stored settings, using defaults");
        }
        Ok(stored.unwrap_or_default())
    }

    /// Merge `patch` onto the current settings and store the result.
    ///
    /// # Errors
    /// Returns the store failure from either the read or the write.
    pub async fn update(&self, patch: &SettingsPatch) -> Result<Settings, TaskError> {
        let merged = self.get().await?.merged(patch);
        let saved = self.store.save_settings(merged).await.map_err(Into::<TaskError>::into)?;
        info!("Saved settings");
        Ok(saved)
    }

    /// Drop the stored record so reads fall back to defaults.
    ///
    /// # Errors
    /// Returns the store failure.
    pub async fn reset(&self) -> Result<Settings, TaskError> {
        self.store.clear_settings().await.map_err(Into::<TaskError>::into)?;
        info!("Reset settings to defaults");
        Ok(Settings::default())
    }
}
