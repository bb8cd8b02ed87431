//! Error types for the dependency injection container.

use thiserror::Error;

use crate::key::ProviderId;

/// Dependency injection errors
///
/// Only the conditions a caller must act on are errors. Problems found while
/// building a graph (cycles, missing or ambiguous dependencies, ineligible
/// providers, failing constructors) are reported as diagnostics instead and
/// leave `None` in the resulting graph, the root included.
///
/// # Examples
///
/// ```rust
/// use simple_di::{DiError, ServiceCollection};
///
/// let provider = ServiceCollection::new().build();
/// match provider.construct_by_name::<String>("Clock") {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "Clock"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// No provider is registered under the requested name
    #[error("No providers registered with name {0}")]
    NotFound(String),
    /// More than one provider is registered under a name that must be unique
    #[error("More than one provider registered with name {name} ({count} found)")]
    Ambiguous { name: String, count: usize },
    /// A non-null dependency declaration was replaced by a different one
    #[error("Cannot redefine depends of {0}")]
    Redeclared(String),
    /// The handle does not belong to this registry
    #[error("Unknown provider handle {0}")]
    UnknownProvider(ProviderId),
    /// The constructed instance is not of the requested type
    #[error("Type mismatch for {provider}: expected {expected}")]
    TypeMismatch {
        provider: String,
        expected: &'static str,
    },
    /// Cardinality string other than `single` or `multiple`
    #[error("Invalid cardinality `{0}`, expected `single` or `multiple`")]
    InvalidCardinality(String),
    /// Malformed configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
