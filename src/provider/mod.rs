//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type, the frozen registry that
//! constructs object graphs on demand.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::dependency::DeclaredDependencies;
use crate::key::ROOT_SERVICE_NAME;
use crate::observer::{Diagnostic, DiagnosticKind, Level, Observers};
use crate::registration::{AnyArc, Provider, Registry};
use crate::{DiError, DiResult, ProviderId, ServiceDescriptor};

mod context;
pub(crate) use context::ResolutionSession;

/// Frozen registry that builds object graphs.
///
/// Every `construct_*` call runs its own resolution session: instances are
/// shared inside one graph but never cached across calls. The provider is
/// cheap to clone and can be shared between threads; sessions never share
/// state.
///
/// # Examples
///
/// ```
/// use simple_di::{Depends, Provider, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { config: Option<Arc<Config>> }
///
/// let mut services = ServiceCollection::new();
/// services.add_service(Provider::new("Config", |_| Config { port: 8080 }));
/// services.add_service(
///     Provider::new("Server", |args| Server { config: args.single::<Config>(0) })
///         .with_depends(Depends::list(["Config"])),
/// );
///
/// let provider = services.build();
/// let server = provider.construct_by_name::<Server>("Server").unwrap().unwrap();
/// assert_eq!(server.config.as_ref().unwrap().port, 8080);
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    registry: Registry,
    observers: Observers,
}

impl ServiceProvider {
    pub(crate) fn new(registry: Registry, observers: Observers) -> Self {
        Self {
            inner: Arc::new(ProviderInner { registry, observers }),
        }
    }

    /// Constructs the single provider registered under `name`.
    ///
    /// Fails only when `name` has no provider or more than one, or when the
    /// instance is not a `T`. A root that is registered but cannot be built
    /// (undeclared, failing constructor) is reported to the observers and
    /// yields `Ok(None)`, just like problems deeper in the graph leave `None`
    /// in the affected fields.
    pub fn construct_by_name<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        let id = self.root_provider(name)?;
        self.construct_object_as::<T>(id)
    }

    /// Type-erased variant of [`construct_by_name`](Self::construct_by_name).
    pub fn construct_by_name_any(&self, name: &str) -> DiResult<Option<AnyArc>> {
        let id = self.root_provider(name)?;
        Ok(self.construct_object(id))
    }

    /// Constructs `id` and its dependencies.
    ///
    /// Never fails hard: an ineligible root or an unknown handle is reported
    /// and yields `None`.
    pub fn construct_object(&self, id: ProviderId) -> Option<AnyArc> {
        let inner = &*self.inner;
        if inner.registry.get(id).is_none() {
            inner.observers.report(Diagnostic::new(
                Level::Error,
                DiagnosticKind::UnknownProvider,
                id.to_string(),
                format!("Provider handle {} was not issued by this registry", id),
            ));
            return None;
        }
        ResolutionSession::new(&inner.registry, &inner.observers, id, ROOT_SERVICE_NAME).construct()
    }

    /// Constructs `id` and downcasts the instance to `T`.
    ///
    /// A handle from another registry and an instance of the wrong type are
    /// errors; a provider that could not be built is `Ok(None)`.
    pub fn construct_object_as<T: Any + Send + Sync>(&self, id: ProviderId) -> DiResult<Option<Arc<T>>> {
        let registry = &self.inner.registry;
        if registry.get(id).is_none() {
            return Err(DiError::UnknownProvider(id));
        }
        let Some(instance) = self.construct_object(id) else {
            return Ok(None);
        };
        instance.downcast::<T>().map(Some).map_err(|_| DiError::TypeMismatch {
            provider: registry.display_name(id).to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Providers registered under `name`, in registration order.
    pub fn lookup(&self, name: &str) -> Option<&[ProviderId]> {
        self.inner.registry.lookup(name)
    }

    pub fn dependencies(&self, id: ProviderId) -> DeclaredDependencies<'_> {
        self.inner.registry.dependencies(id)
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.inner.registry.provider(id)
    }

    pub fn get_service_descriptors(&self) -> Vec<ServiceDescriptor> {
        ServiceDescriptor::collect(&self.inner.registry)
    }

    fn root_provider(&self, name: &str) -> DiResult<ProviderId> {
        match self.inner.registry.lookup(name) {
            Some([id]) => Ok(*id),
            Some(ids) if ids.len() > 1 => Err(DiError::Ambiguous {
                name: name.to_string(),
                count: ids.len(),
            }),
            _ => Err(DiError::NotFound(name.to_string())),
        }
    }
}
