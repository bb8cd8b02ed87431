//! Configuration for provider discovery.
//!
//! Options can be built in code, deserialized from a host's own configuration
//! file (with the `manifest` feature), or read from the environment.

use std::env;

#[cfg(feature = "manifest")]
use serde::Deserialize;

use crate::{DiError, DiResult};

/// Environment variable prefix read by [`ScanOptions::from_env`].
pub const ENV_PREFIX: &str = "SIMPLE_DI";

/// Options for walking directories in search of provider manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "manifest", derive(Deserialize))]
#[cfg_attr(feature = "manifest", serde(default, rename_all = "camelCase"))]
pub struct ScanOptions {
    /// File extension of manifests, without the dot
    pub extension: String,
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Maximum recursion depth below each root, unlimited when `None`
    pub max_depth: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            follow_links: false,
            max_depth: None,
        }
    }
}

impl ScanOptions {
    /// Reads `SIMPLE_DI_SCAN_EXTENSION`, `SIMPLE_DI_SCAN_FOLLOW_LINKS` and
    /// `SIMPLE_DI_SCAN_MAX_DEPTH`, falling back to the defaults for unset
    /// variables.
    pub fn from_env() -> DiResult<Self> {
        let mut options = Self::default();

        if let Some(extension) = read_var("SCAN_EXTENSION") {
            let extension = extension.trim_start_matches('.');
            if extension.is_empty() {
                return Err(DiError::Config(format!("{}_SCAN_EXTENSION must not be empty", ENV_PREFIX)));
            }
            options.extension = extension.to_string();
        }
        if let Some(value) = read_var("SCAN_FOLLOW_LINKS") {
            options.follow_links = value.parse::<bool>().map_err(|_| {
                DiError::Config(format!("{}_SCAN_FOLLOW_LINKS is not a boolean: {}", ENV_PREFIX, value))
            })?;
        }
        if let Some(value) = read_var("SCAN_MAX_DEPTH") {
            let depth = value.parse::<usize>().map_err(|_| {
                DiError::Config(format!("{}_SCAN_MAX_DEPTH is not a number: {}", ENV_PREFIX, value))
            })?;
            options.max_depth = Some(depth);
        }

        Ok(options)
    }

    /// Whether `path` has the configured manifest extension.
    pub fn matches(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }
}

fn read_var(key: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, key)).ok()
}
