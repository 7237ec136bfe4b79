//! Global configuration options.

use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dataset::GzipCompressionLevel;

/// Global configuration options for the `zarrs_dataset` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
/// Dataset creation functions read these values through [`DatasetCreateOptions::default`](crate::DatasetCreateOptions::default),
/// so a change only affects datasets created afterwards.
///
/// ## Compression Threshold
/// > default: `64` (bytes)
///
/// A unique dataset is stored chunked and `gzip` compressed if it has a rank greater than zero and its value occupies more than this many bytes.
/// Smaller values are stored contiguously without compression.
///
/// ## Compression Level
/// > default: `6`
///
/// The `gzip` compression level of compressed unique datasets and of all record datasets.
#[derive(Debug, Clone)]
pub struct Config {
    compression_threshold: usize,
    compression_level: GzipCompressionLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression_threshold: 64,
            compression_level: GzipCompressionLevel::DEFAULT,
        }
    }
}

impl Config {
    /// Get the [compression threshold](#compression-threshold) configuration.
    #[must_use]
    pub fn compression_threshold(&self) -> usize {
        self.compression_threshold
    }

    /// Set the [compression threshold](#compression-threshold) configuration.
    pub fn set_compression_threshold(&mut self, compression_threshold: usize) {
        self.compression_threshold = compression_threshold;
    }

    /// Get the [compression level](#compression-level) configuration.
    #[must_use]
    pub fn compression_level(&self) -> GzipCompressionLevel {
        self.compression_level
    }

    /// Set the [compression level](#compression-level) configuration.
    pub fn set_compression_level(&mut self, compression_level: GzipCompressionLevel) {
        self.compression_level = compression_level;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// A poisoned lock is recovered, since [`Config`] holds plain values that cannot be left half updated.
/// This might deadlock if the global config is already held mutably by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Returns a mutable reference to the global configuration.
///
/// This might deadlock if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.compression_threshold(), 64);
        assert_eq!(config.compression_level().as_u32(), 6);
    }

    #[test]
    fn config_set() {
        let mut config = Config::default();
        config.set_compression_threshold(128);
        config.set_compression_level(GzipCompressionLevel::try_from(9).unwrap());
        assert_eq!(config.compression_threshold(), 128);
        assert_eq!(config.compression_level().as_u32(), 9);
    }

    #[test]
    fn config_global_read() {
        // Other tests may hold modified values, only check the guard is obtainable
        let threshold = global_config().compression_threshold();
        assert!(threshold > 0);
    }
}
