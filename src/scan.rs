//! Directory discovery of providers described by JSON manifests.
//!
//! Rust cannot load arbitrary code from a directory, so discovery is split in
//! two: constructors are compiled in and registered in a [`FactoryCatalog`]
//! under a class name, and a directory tree holds one manifest per provider
//! saying which class to use, which service names it answers to and what it
//! depends on:
//!
//! ```json
//! { "class": "MyClass", "serviceNames": ["MyClass"], "depends": ["Clock", { "name": "Plugin", "type": "multiple" }] }
//! ```
//!
//! `serviceNames` and `depends` are optional. A missing `depends` and an
//! explicit `"depends": null` are different, exactly as
//! [`Depends::Undefined`] and [`Depends::Null`] are.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use walkdir::WalkDir;

use crate::config::ScanOptions;
use crate::dependency::{DependencySpec, Depends};
use crate::registration::{AnyArc, Arguments, BoxError, Constructor, Provider};
use crate::traits::{ProviderSource, SourceError};

/// Compiled-in constructors addressable by class name.
///
/// ```
/// use simple_di::scan::FactoryCatalog;
///
/// struct Clock;
///
/// let mut catalog = FactoryCatalog::new();
/// catalog.insert("Clock", |_| Clock);
/// assert!(catalog.contains("Clock"));
/// ```
#[derive(Default, Clone)]
pub struct FactoryCatalog {
    factories: HashMap<String, Constructor>,
}

impl FactoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T, F>(&mut self, class: impl Into<String>, ctor: F) -> &mut Self
    where
        T: std::any::Any + Send + Sync,
        F: Fn(&Arguments) -> T + Send + Sync + 'static,
    {
        let ctor: Constructor = Arc::new(move |args: &Arguments| -> Result<AnyArc, BoxError> {
            Ok(Arc::new(ctor(args)))
        });
        self.factories.insert(class.into(), ctor);
        self
    }

    pub fn insert_fallible<T, F>(&mut self, class: impl Into<String>, ctor: F) -> &mut Self
    where
        T: std::any::Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let ctor: Constructor = Arc::new(move |args: &Arguments| -> Result<AnyArc, BoxError> {
            Ok(Arc::new(ctor(args)?))
        });
        self.factories.insert(class.into(), ctor);
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn provider(&self, class: &str) -> Option<Provider> {
        self.factories
            .get(class)
            .map(|ctor| Provider::from_constructor(Some(class.to_string()), ctor.clone()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    class: String,
    #[serde(default)]
    service_names: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "present")]
    depends: Option<Option<Vec<DependencySpec>>>,
}

/// Distinguishes a present `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Provider source that walks directory trees for manifests.
pub struct DirectorySource {
    roots: Vec<PathBuf>,
    catalog: FactoryCatalog,
    options: ScanOptions,
}

impl DirectorySource {
    pub fn new<I>(roots: I, catalog: FactoryCatalog) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            roots: roots.into_iter().collect(),
            catalog,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    fn load(&self, path: &Path) -> Result<Provider, SourceError> {
        tracing::debug!(path = %path.display(), "Trying to add manifest");
        let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut provider = self
            .catalog
            .provider(&manifest.class)
            .ok_or_else(|| SourceError::UnknownFactory {
                path: path.to_path_buf(),
                class: manifest.class.clone(),
            })?;

        if let Some(values) = manifest.service_names {
            let names = values
                .into_iter()
                .map(|value| match value {
                    serde_json::Value::String(name) if !name.is_empty() => Some(name),
                    _ => None,
                })
                .collect::<Option<Vec<String>>>()
                .ok_or_else(|| SourceError::InvalidServiceNames {
                    path: path.to_path_buf(),
                    class: manifest.class.clone(),
                })?;
            provider = provider.with_service_names(names);
        }

        let depends = match manifest.depends {
            None => Depends::Undefined,
            Some(None) => Depends::Null,
            Some(Some(list)) => Depends::List(list),
        };
        Ok(provider.with_depends(depends))
    }
}

impl ProviderSource for DirectorySource {
    fn candidates(&self) -> Vec<Result<Provider, SourceError>> {
        let mut candidates = Vec::new();
        for root in &self.roots {
            let mut walker = WalkDir::new(root)
                .follow_links(self.options.follow_links)
                .sort_by_file_name();
            if let Some(depth) = self.options.max_depth {
                walker = walker.max_depth(depth);
            }

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && self.options.matches(entry.path()) => {
                        candidates.push(self.load(entry.path()));
                    }
                    Ok(_) => {}
                    Err(err) if err.depth() == 0 => candidates.push(Err(SourceError::UnreadableRoot {
                        path: root.clone(),
                        source: err,
                    })),
                    Err(err) => candidates.push(Err(err.into())),
                }
            }
        }
        candidates
    }
}
