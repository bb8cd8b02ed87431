//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type and related functionality
//! for registering providers and building service providers.

use std::sync::Arc;

use crate::dependency::{parse_depends, Declaration, DeclaredDependencies, Depends};
use crate::observer::{DiObserver, Diagnostic, DiagnosticKind, Level, Observers};
use crate::registration::{Provider, Registry};
use crate::traits::ProviderSource;
use crate::{DiError, DiResult, ProviderId, ServiceDescriptor, ServiceProvider};

pub mod module_system;
pub use module_system::*;

/// Mutable registry used while the application is being wired.
///
/// Registration problems never panic or abort: they are reported to the
/// observers (and `tracing`) and the offending registration is skipped. The
/// one exception is [`set_dependencies`](Self::set_dependencies), which fails
/// when an existing declaration would be replaced by a different one.
///
/// # Examples
///
/// ```rust
/// use simple_di::{Depends, Provider, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Clock { i: String }
/// struct MyClass { dependency: Option<Arc<Clock>> }
///
/// let mut services = ServiceCollection::new();
/// services.add_service(Provider::new("Clock", |_| Clock { i: "x".to_string() }));
/// let my_class = services.add_service(Provider::new("MyClass", |args| MyClass {
///     dependency: args.single::<Clock>(0),
/// }));
/// services.set_dependencies(my_class, Depends::list(["Clock"])).unwrap();
///
/// let provider = services.build();
/// let obj = provider.construct_by_name::<MyClass>("MyClass").unwrap().unwrap();
/// assert_eq!(obj.dependency.as_ref().unwrap().i, "x");
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    registry: Registry,
    observers: Observers,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            observers: Observers::new(),
        }
    }

    /// Adds an observer that receives every diagnostic from now on, including
    /// those raised while constructing from the built provider.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Places a provider in the registry without giving it any service name.
    pub fn add_provider(&mut self, provider: Provider) -> ProviderId {
        let id = self.registry.insert(provider);
        tracing::trace!(provider = self.registry.display_name(id), %id, "Added provider");
        id
    }

    /// Registers `id` under every name in `names`.
    ///
    /// Registering the same provider under the same name again is a no-op;
    /// existing registrations under other names are kept. An empty list, or a
    /// list holding an empty name, is reported and nothing is registered.
    pub fn register<S: AsRef<str>>(&mut self, id: ProviderId, names: &[S]) -> bool {
        if !self.check_known(id) {
            return false;
        }
        let display_name = self.registry.display_name(id).to_string();

        if names.is_empty() {
            self.observers.report(Diagnostic::new(
                Level::Error,
                DiagnosticKind::InvalidServiceNames,
                &display_name,
                format!(
                    "Cannot add {} to DI container. If provided, service names must not be empty",
                    display_name
                ),
            ));
            return false;
        }
        if names.iter().any(|n| n.as_ref().is_empty()) {
            self.observers.report(Diagnostic::new(
                Level::Error,
                DiagnosticKind::InvalidServiceNames,
                &display_name,
                format!(
                    "Cannot add {} to DI container. Every service name must be a non-empty string",
                    display_name
                ),
            ));
            return false;
        }

        for name in names {
            tracing::debug!(provider = %display_name, service = name.as_ref(), "Registering service name");
            self.registry.bind(name.as_ref(), id);
        }
        true
    }

    /// Registers `id` under its intrinsic name.
    ///
    /// Only providers that show they take part in DI qualify: they need an
    /// intrinsic name and a dependency declaration, either carried by the
    /// provider itself or set earlier through
    /// [`set_dependencies`](Self::set_dependencies). Declared-as-null counts.
    pub fn register_default(&mut self, id: ProviderId) -> bool {
        let Some(provider) = self.registry.provider(id) else {
            self.check_known(id);
            return false;
        };
        let display_name = provider.display_name().to_string();

        let Some(name) = provider.name().map(str::to_string) else {
            self.report_missing_name(&display_name);
            return false;
        };

        let declared = !provider.depends().is_undefined() || self.registry.dependencies(id).is_declared();
        if !declared {
            self.observers.report(Diagnostic::new(
                Level::Warning,
                DiagnosticKind::NotParticipating,
                &display_name,
                format!(
                    "Not adding {} to DI container as it does not specify a list of service names nor does it declare its dependencies",
                    display_name
                ),
            ));
            return false;
        }

        self.register(id, &[name])
    }

    /// Updates the dependency declaration of `id`.
    ///
    /// * `Undefined` changes nothing.
    /// * `Null` is stored only when nothing was declared before.
    /// * `List` replaces an undeclared or null declaration. Replacing an
    ///   existing list with an identical one is a no-op; replacing it with a
    ///   different one fails with [`DiError::Redeclared`].
    ///
    /// Entries with an invalid cardinality are reported and dropped before the
    /// comparison.
    pub fn set_dependencies(&mut self, id: ProviderId, depends: impl Into<Depends>) -> DiResult<()> {
        let depends = depends.into();
        let observers = &self.observers;
        let Some(entry) = self.registry.get_mut(id) else {
            return Err(DiError::UnknownProvider(id));
        };
        let display_name = entry.provider.display_name().to_string();

        let specs = match depends {
            Depends::Undefined => return Ok(()),
            Depends::Null => {
                if entry.declaration == Declaration::Undeclared {
                    tracing::debug!(provider = %display_name, "Declaring dependencies as null");
                    entry.declaration = Declaration::Null;
                } else {
                    tracing::debug!(provider = %display_name, "Declaration already set, ignoring null");
                }
                return Ok(());
            }
            Depends::List(specs) => specs,
        };

        let (parsed, rejected) = parse_depends(&specs);
        for bad in rejected {
            observers.report(Diagnostic::new(
                Level::Error,
                DiagnosticKind::InvalidCardinality,
                &display_name,
                format!("Invalid type for {}: {}", bad.name, bad.cardinality),
            ));
        }

        match &entry.declaration {
            Declaration::Undeclared => tracing::debug!(provider = %display_name, "Adding new depends"),
            Declaration::Null => tracing::debug!(provider = %display_name, "Redefining depends from null"),
            Declaration::List(current) if *current == parsed => {
                tracing::debug!(provider = %display_name, "Redefining to same value, skipping");
                return Ok(());
            }
            Declaration::List(_) => return Err(DiError::Redeclared(display_name)),
        }

        if parsed.is_empty() {
            tracing::debug!(provider = %display_name, "No depends added");
        } else {
            let listing = parsed
                .iter()
                .map(|d| format!("{}, type {}", d.name, d.cardinality))
                .collect::<Vec<_>>()
                .join("; ");
            tracing::debug!(provider = %display_name, depends = %listing, "Holds dependencies");
        }
        entry.declaration = Declaration::List(parsed);
        Ok(())
    }

    /// Adds and registers a provider the way a class declaration would.
    ///
    /// The provider is registered under its explicit service names, or its
    /// intrinsic name when it has none, and declared eligible with no
    /// dependencies. A provider with neither is reported as nameless and
    /// stays in the arena unregistered. Its intrinsic declaration, if any, is applied afterwards.
    pub fn add_service(&mut self, provider: Provider) -> ProviderId {
        let names = provider
            .service_names()
            .map(<[String]>::to_vec)
            .or_else(|| provider.name().map(|n| vec![n.to_string()]));
        let depends = provider.depends().clone();

        let id = self.add_provider(provider);
        match names {
            Some(names) => {
                self.register(id, &names);
            }
            None => self.report_missing_name(self.registry.display_name(id)),
        }
        self.apply_declaration(id, Depends::Null);
        self.apply_declaration(id, depends);
        id
    }

    /// Adds and registers a discovered provider.
    ///
    /// Uses the provider's explicit service names when present, otherwise
    /// falls back to [`register_default`](Self::register_default). When the
    /// provider is accepted its intrinsic declaration is applied, with a
    /// missing one treated as null. Rejected providers stay in the arena but
    /// are reachable under no name.
    pub fn add_class(&mut self, provider: Provider) -> ProviderId {
        let explicit = provider.service_names().map(<[String]>::to_vec);
        let depends = match provider.depends() {
            Depends::Undefined => Depends::Null,
            other => other.clone(),
        };

        let id = self.add_provider(provider);
        let accepted = match explicit {
            Some(names) => self.register(id, &names),
            None => self.register_default(id),
        };
        if accepted {
            self.apply_declaration(id, depends);
        }
        id
    }

    /// Registers every candidate a source yields through
    /// [`add_class`](Self::add_class).
    ///
    /// Candidates that fail to load are skipped: a source may legitimately
    /// contain entries that are not providers. Candidates with a malformed
    /// service name list are reported as errors, and a root that cannot be
    /// read at all as a warning.
    pub fn add_from_source<S: ProviderSource + ?Sized>(&mut self, source: &S) -> Vec<ProviderId> {
        let mut added = Vec::new();
        for candidate in source.candidates() {
            match candidate {
                Ok(provider) => added.push(self.add_class(provider)),
                Err(err) => match err.severity() {
                    Some((level, kind)) => self
                        .observers
                        .report(Diagnostic::new(level, kind, err.origin(), err.to_string())),
                    None => tracing::debug!(error = %err, "Skipping candidate"),
                },
            }
        }
        added
    }

    /// Walks `roots` for provider manifests and registers every one whose
    /// class is known to `catalog`.
    #[cfg(feature = "manifest")]
    pub fn scan<P: AsRef<std::path::Path>>(
        &mut self,
        roots: &[P],
        catalog: crate::scan::FactoryCatalog,
    ) -> Vec<ProviderId> {
        let source = crate::scan::DirectorySource::new(roots.iter().map(|p| p.as_ref().to_path_buf()), catalog);
        self.add_from_source(&source)
    }

    /// Providers registered under `name`, in registration order.
    pub fn lookup(&self, name: &str) -> Option<&[ProviderId]> {
        self.registry.lookup(name)
    }

    /// Current declaration of `id`.
    pub fn dependencies(&self, id: ProviderId) -> DeclaredDependencies<'_> {
        self.registry.dependencies(id)
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.registry.provider(id)
    }

    /// Number of providers in the arena, registered under a name or not.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Describes every provider in the arena.
    pub fn get_service_descriptors(&self) -> Vec<ServiceDescriptor> {
        ServiceDescriptor::collect(&self.registry)
    }

    /// Freezes the registry into a provider that can construct graphs.
    pub fn build(self) -> ServiceProvider {
        tracing::debug!(providers = self.registry.len(), "Building service provider");
        ServiceProvider::new(self.registry, self.observers)
    }

    /// Declaration updates made on behalf of registration helpers. A conflict
    /// here is a registration error, so it is reported instead of returned.
    fn apply_declaration(&mut self, id: ProviderId, depends: Depends) {
        if let Err(err) = self.set_dependencies(id, depends) {
            self.observers.report(Diagnostic::new(
                Level::Error,
                DiagnosticKind::ConflictingDeclaration,
                self.registry.display_name(id).to_string(),
                err.to_string(),
            ));
        }
    }

    fn report_missing_name(&self, display_name: &str) {
        self.observers.report(Diagnostic::new(
            Level::Error,
            DiagnosticKind::MissingName,
            display_name,
            format!(
                "Cannot add {} to DI container, and the provider doesn't have a name",
                display_name
            ),
        ));
    }

        fn check_known(&self, id: ProviderId) -> bool {
        if self.registry.get(id).is_some() {
            return true;
        }
        self.observers.report(Diagnostic::new(
            Level::Error,
            DiagnosticKind::UnknownProvider,
            id.to_string(),
            format!("Provider handle {} was not issued by this collection", id),
        ));
        false
    }
}
