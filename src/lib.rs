//! # simple-di
//!
//! Name-based dependency injection. Providers are registered under service
//! names, declare the names they depend on, and are constructed depth-first on
//! demand.
//!
//! ## Features
//!
//! - **Name-keyed registry**: one name may map to several providers, one provider to several names
//! - **Single and multiple dependencies**: inject exactly one implementation or all of them in order
//! - **Per-graph sharing**: a provider is constructed at most once per resolution
//! - **Circular dependency detection**: cycles are reported with the full resolution stack
//! - **Soft failures**: problems are reported to observers and leave `None` behind instead of panicking
//! - **Directory discovery**: JSON manifests bind compiled-in factories to names (feature `manifest`)
//!
//! ## Quick Start
//!
//! ```rust
//! use simple_di::{Depends, Provider, ServiceCollection};
//! use std::sync::Arc;
//!
//! struct Clock {
//!     i: String,
//! }
//!
//! struct MyClass {
//!     dependency: Option<Arc<Clock>>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_service(Provider::new("Clock", |_| Clock { i: "x".to_string() }));
//! services.add_service(
//!     Provider::new("MyClass", |args| MyClass { dependency: args.single::<Clock>(0) })
//!         .with_depends(Depends::list(["Clock"])),
//! );
//!
//! let provider = services.build();
//! let obj = provider.construct_by_name::<MyClass>("MyClass").unwrap().unwrap();
//! assert_eq!(obj.dependency.as_ref().unwrap().i, "x");
//! ```
//!
//! ## Multiple Implementations
//!
//! ```rust
//! use simple_di::{DependencySpec, Depends, Provider, ServiceCollection};
//!
//! struct Plugin(&'static str);
//! struct Host {
//!     plugins: Vec<&'static str>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_service(Provider::new("Csv", |_| Plugin("csv")).with_service_names(["Plugin"]));
//! services.add_service(Provider::new("Json", |_| Plugin("json")).with_service_names(["Plugin"]));
//! services.add_service(
//!     Provider::new("Host", |args| Host {
//!         plugins: args.multiple::<Plugin>(0).into_iter().flatten().map(|p| p.0).collect(),
//!     })
//!     .with_depends(Depends::List(vec![DependencySpec::multiple("Plugin")])),
//! );
//!
//! let host = services.build().construct_by_name::<Host>("Host").unwrap().unwrap();
//! assert_eq!(host.plugins, vec!["csv", "json"]);
//! ```
//!
//! ## Diagnostics
//!
//! Every problem is logged through `tracing` and handed to the registered
//! [`DiObserver`]s. [`DiagnosticLog`] collects them for inspection:
//!
//! ```rust
//! use simple_di::{DiagnosticKind, DiagnosticLog, Depends, Provider, ServiceCollection};
//! use std::sync::Arc;
//!
//! let log = Arc::new(DiagnosticLog::new());
//! let mut services = ServiceCollection::new();
//! services.add_observer(log.clone());
//! services.add_service(Provider::new("Alarm", |_| ()).with_depends(Depends::list(["Clock"])));
//!
//! services.build().construct_by_name::<()>("Alarm").unwrap().unwrap();
//! assert_eq!(log.kinds(), vec![DiagnosticKind::MissingDependency]);
//! ```

// Module declarations
pub mod collection;
pub mod config;
pub mod dependency;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod observer;
pub mod provider;
pub mod registration;
pub mod traits;

#[cfg(feature = "manifest")]
pub mod scan;

// Internal modules
mod internal;

// Re-export core types
pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceCollectionModuleExt, ServiceModule};
pub use config::ScanOptions;
pub use dependency::{
    parse_depends, Cardinality, DeclaredDependencies, DependencyDefinition, DependencySpec, Depends,
    RejectedDependency,
};
pub use descriptors::ServiceDescriptor;
pub use error::{DiError, DiResult};
pub use key::{ProviderId, StackFrame, ROOT_SERVICE_NAME};
pub use observer::{DiObserver, Diagnostic, DiagnosticKind, DiagnosticLog, Level};
pub use provider::ServiceProvider;
pub use registration::{AnyArc, Arguments, BoxError, Injected, Provider};
pub use traits::{ProviderSource, SourceError};

#[cfg(feature = "manifest")]
pub use scan::{DirectorySource, FactoryCatalog};
