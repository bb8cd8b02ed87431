//! Pluggable provider discovery.

use std::path::PathBuf;

use thiserror::Error;

use crate::observer::{DiagnosticKind, Level};
use crate::registration::Provider;

/// Something that can enumerate candidate providers.
///
/// The engine never loads code itself; a source hands over providers that are
/// already loaded, and [`ServiceCollection::add_from_source`] registers them.
/// A candidate that fails to load is returned as an `Err` and skipped.
///
/// [`ServiceCollection::add_from_source`]: crate::ServiceCollection::add_from_source
///
/// ```
/// use simple_di::{Depends, Provider, ServiceCollection};
///
/// let candidates = vec![
///     Provider::new("Clock", |_| 0u64).with_depends(Depends::Null),
///     Provider::new("Unrelated", |_| ()),
/// ];
///
/// let mut services = ServiceCollection::new();
/// services.add_from_source(&candidates);
/// assert!(services.lookup("Clock").is_some());
/// assert!(services.lookup("Unrelated").is_none());
/// ```
pub trait ProviderSource {
    fn candidates(&self) -> Vec<Result<Provider, SourceError>>;
}

impl ProviderSource for [Provider] {
    fn candidates(&self) -> Vec<Result<Provider, SourceError>> {
        self.iter().cloned().map(Ok).collect()
    }
}

impl ProviderSource for Vec<Provider> {
    fn candidates(&self) -> Vec<Result<Provider, SourceError>> {
        self.as_slice().candidates()
    }
}

/// Why a candidate could not be turned into a provider.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(feature = "manifest")]
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[cfg(feature = "manifest")]
    #[error("Cannot read provider root {path}: {source}")]
    UnreadableRoot {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[cfg(feature = "manifest")]
    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("No factory registered for class {class} ({path})")]
    UnknownFactory { path: PathBuf, class: String },
    #[error("Cannot add {class} to DI container. Every entry of serviceNames must be a non-empty string ({path})")]
    InvalidServiceNames { path: PathBuf, class: String },
}

impl SourceError {
    /// Whether the error is reported to the observers, as opposed to a
    /// candidate that simply is not a provider.
    pub fn is_reportable(&self) -> bool {
        self.severity().is_some()
    }

    /// Level and kind a reportable error is reported with.
    pub(crate) fn severity(&self) -> Option<(Level, DiagnosticKind)> {
        match self {
            SourceError::InvalidServiceNames { .. } => Some((Level::Error, DiagnosticKind::InvalidServiceNames)),
            #[cfg(feature = "manifest")]
            SourceError::UnreadableRoot { .. } => Some((Level::Warning, DiagnosticKind::UnreadableRoot)),
            _ => None,
        }
    }

    /// Class name or path the error is about.
    pub fn origin(&self) -> String {
        match self {
            SourceError::Io { path, .. } => path.display().to_string(),
            #[cfg(feature = "manifest")]
            SourceError::Walk(err) => err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            #[cfg(feature = "manifest")]
            SourceError::Parse { path, .. } | SourceError::UnreadableRoot { path, .. } => {
                path.display().to_string()
            }
            SourceError::UnknownFactory { class, .. } | SourceError::InvalidServiceNames { class, .. } => {
                class.clone()
            }
        }
    }
}
