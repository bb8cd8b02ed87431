//! Core traits for the dependency injection container.

mod source;

pub use source::{ProviderSource, SourceError};
