//! Service module system for modular registration.
//!
//! A module bundles the registrations of one part of an application so they
//! can be applied in a single call at program start.

use crate::{DiResult, ServiceCollection};

/// A module that can register providers with a ServiceCollection.
///
/// # Example
///
/// ```rust
/// use simple_di::{DiResult, Depends, Provider, ServiceCollection, ServiceCollectionExt, ServiceModule};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler { clock: Option<Arc<Clock>> }
///
/// struct TimeModule;
///
/// impl ServiceModule for TimeModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_service(Provider::new("Clock", |_| Clock));
///         let scheduler = services.add_service(Provider::new("Scheduler", |args| Scheduler {
///             clock: args.single::<Clock>(0),
///         }));
///         services.set_dependencies(scheduler, Depends::list(["Clock"]))
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let provider = ServiceCollection::new().add_module(TimeModule)?.build();
/// let scheduler = provider.construct_by_name::<Scheduler>("Scheduler")?;
/// assert!(scheduler.is_some_and(|s| s.clock.is_some()));
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Register this module's providers with the ServiceCollection.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Extension trait for ServiceCollection that provides module registration
/// by value, for builder-style chaining.
pub trait ServiceCollectionExt {
    /// Add a module to the service collection.
    fn add_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}

/// Module registration in place, matching the `&mut Self` pattern of the
/// other registration methods.
pub trait ServiceCollectionModuleExt {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ServiceCollectionModuleExt for ServiceCollection {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }
}
