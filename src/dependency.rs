//! Dependency declarations and their parsing.
//!
//! A provider declares the service names it needs as an ordered list. Each entry
//! is either a bare name, which means exactly one provider is expected, or an
//! explicit `(name, cardinality)` pair where the cardinality is the string
//! `"single"` or `"multiple"`. Entries with any other cardinality are dropped
//! during parsing and the rest of the declaration is kept.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "manifest")]
use serde::Deserialize;

use crate::error::DiError;

/// How many providers a dependency expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Exactly one provider must be registered under the name
    Single,
    /// Every provider registered under the name, in registration order
    Multiple,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Multiple => "multiple",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Cardinality::Single),
            "multiple" => Ok(Cardinality::Multiple),
            other => Err(DiError::InvalidCardinality(other.to_string())),
        }
    }
}

/// One unparsed entry of a dependency declaration.
///
/// ```rust
/// use simple_di::DependencySpec;
///
/// let bare: DependencySpec = "Clock".into();
/// let typed: DependencySpec = ("Plugin", "multiple").into();
/// assert_eq!(bare.name(), "Clock");
/// assert_eq!(typed.name(), "Plugin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "manifest", derive(Deserialize))]
#[cfg_attr(feature = "manifest", serde(untagged))]
pub enum DependencySpec {
    /// Bare service name, cardinality `single`
    Name(String),
    /// Service name with an explicit cardinality string
    Typed {
        name: String,
        #[cfg_attr(feature = "manifest", serde(rename = "type"))]
        cardinality: String,
    },
}

impl DependencySpec {
    pub fn name(&self) -> &str {
        match self {
            DependencySpec::Name(name) => name,
            DependencySpec::Typed { name, .. } => name,
        }
    }

    /// Shorthand for a `multiple` entry.
    pub fn multiple(name: impl Into<String>) -> Self {
        DependencySpec::Typed {
            name: name.into(),
            cardinality: Cardinality::Multiple.as_str().to_string(),
        }
    }
}

impl From<&str> for DependencySpec {
    fn from(name: &str) -> Self {
        DependencySpec::Name(name.to_string())
    }
}

impl From<String> for DependencySpec {
    fn from(name: String) -> Self {
        DependencySpec::Name(name)
    }
}

impl From<(&str, &str)> for DependencySpec {
    fn from((name, cardinality): (&str, &str)) -> Self {
        DependencySpec::Typed {
            name: name.to_string(),
            cardinality: cardinality.to_string(),
        }
    }
}

impl From<(&str, Cardinality)> for DependencySpec {
    fn from((name, cardinality): (&str, Cardinality)) -> Self {
        DependencySpec::Typed {
            name: name.to_string(),
            cardinality: cardinality.as_str().to_string(),
        }
    }
}

/// A validated dependency: service name plus cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyDefinition {
    pub name: String,
    pub cardinality: Cardinality,
}

impl DependencyDefinition {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::Single,
        }
    }

    pub fn multiple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::Multiple,
        }
    }
}

/// An entry dropped by [`parse_depends`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDependency {
    pub name: String,
    pub cardinality: String,
}

/// Validates a raw declaration.
///
/// Returns the accepted definitions in declared order together with the
/// entries whose cardinality was invalid.
///
/// ```rust
/// use simple_di::{parse_depends, Cardinality, DependencySpec};
///
/// let specs: Vec<DependencySpec> = vec!["Clock".into(), ("Plugin", "several").into()];
/// let (accepted, rejected) = parse_depends(&specs);
/// assert_eq!(accepted.len(), 1);
/// assert_eq!(accepted[0].cardinality, Cardinality::Single);
/// assert_eq!(rejected[0].name, "Plugin");
/// ```
pub fn parse_depends(specs: &[DependencySpec]) -> (Vec<DependencyDefinition>, Vec<RejectedDependency>) {
    let mut accepted = Vec::with_capacity(specs.len());
    let mut rejected = Vec::new();

    for spec in specs {
        match spec {
            DependencySpec::Name(name) => accepted.push(DependencyDefinition::single(name.clone())),
            DependencySpec::Typed { name, cardinality } => match cardinality.parse::<Cardinality>() {
                Ok(cardinality) => accepted.push(DependencyDefinition {
                    name: name.clone(),
                    cardinality,
                }),
                Err(_) => rejected.push(RejectedDependency {
                    name: name.clone(),
                    cardinality: cardinality.clone(),
                }),
            },
        }
    }

    (accepted, rejected)
}

/// Requested change to a provider's dependency declaration.
///
/// `Undefined` and `Null` are different requests: `Undefined` asks for no
/// change at all, `Null` declares the provider eligible with no dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Depends {
    #[default]
    Undefined,
    Null,
    List(Vec<DependencySpec>),
}

impl Depends {
    /// Builds a `List` from anything convertible into [`DependencySpec`].
    pub fn list<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DependencySpec>,
    {
        Depends::List(entries.into_iter().map(Into::into).collect())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Depends::Undefined)
    }
}

impl From<Vec<DependencySpec>> for Depends {
    fn from(entries: Vec<DependencySpec>) -> Self {
        Depends::List(entries)
    }
}

impl From<Option<Vec<DependencySpec>>> for Depends {
    fn from(entries: Option<Vec<DependencySpec>>) -> Self {
        entries.map_or(Depends::Null, Depends::List)
    }
}

/// Stored declaration state of a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum Declaration {
    #[default]
    Undeclared,
    Null,
    List(Vec<DependencyDefinition>),
}

impl Declaration {
    pub(crate) fn view(&self) -> DeclaredDependencies<'_> {
        match self {
            Declaration::Undeclared => DeclaredDependencies::Undeclared,
            Declaration::Null => DeclaredDependencies::Null,
            Declaration::List(list) => DeclaredDependencies::List(list),
        }
    }
}

/// Read-only view of a provider's declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredDependencies<'a> {
    /// No declaration exists; the provider is not eligible for construction
    Undeclared,
    /// Declared with no dependencies
    Null,
    /// Ordered positional dependencies
    List(&'a [DependencyDefinition]),
}

impl<'a> DeclaredDependencies<'a> {
    pub fn is_declared(&self) -> bool {
        !matches!(self, DeclaredDependencies::Undeclared)
    }

    /// Declared dependencies, empty for `Null` and `Undeclared`.
    pub fn definitions(&self) -> &'a [DependencyDefinition] {
        match self {
            DeclaredDependencies::List(list) => list,
            _ => &[],
        }
    }
}
