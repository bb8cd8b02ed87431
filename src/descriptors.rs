//! Service descriptors for introspection and diagnostics.

use crate::dependency::{DeclaredDependencies, DependencyDefinition};
use crate::key::ProviderId;
use crate::registration::Registry;

/// Snapshot of one provider's registration.
///
/// # Use Cases
///
/// - **Debugging**: See which names a provider answers to and what it needs
/// - **Validation**: Find providers that were added but never made eligible
/// - **Documentation**: Draw the dependency graph
///
/// # Examples
///
/// ```rust
/// use simple_di::{Depends, DependencyDefinition, Provider, ServiceCollection};
///
/// let mut services = ServiceCollection::new();
/// services.add_service(Provider::new("Clock", |_| 0u64));
/// services.add_service(
///     Provider::new("Alarm", |_| ()).with_depends(Depends::list(["Clock"])),
/// );
/// services.add_provider(Provider::new("Unused", |_| ()));
///
/// let descriptors = services.get_service_descriptors();
/// let alarm = descriptors.iter().find(|d| d.display_name == "Alarm").unwrap();
/// assert_eq!(alarm.service_names, vec!["Alarm".to_string()]);
/// assert_eq!(alarm.dependencies, vec![DependencyDefinition::single("Clock")]);
///
/// let unused = descriptors.iter().find(|d| d.display_name == "Unused").unwrap();
/// assert!(!unused.eligible);
/// assert!(!unused.is_registered());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub id: ProviderId,
    /// Intrinsic name, or `anonymous provider`
    pub display_name: String,
    /// Names the provider is registered under, in first-registration order
    pub service_names: Vec<String>,
    /// Whether the provider has declared its dependencies (possibly as none)
    pub eligible: bool,
    pub dependencies: Vec<DependencyDefinition>,
}

impl ServiceDescriptor {
    pub(crate) fn collect(registry: &Registry) -> Vec<Self> {
        registry
            .ids()
            .map(|id| {
                let declared = registry.dependencies(id);
                Self {
                    id,
                    display_name: registry.display_name(id).to_string(),
                    service_names: registry.names_of(id),
                    eligible: declared.is_declared(),
                    dependencies: match declared {
                        DeclaredDependencies::List(list) => list.to_vec(),
                        _ => Vec::new(),
                    },
                }
            })
            .collect()
    }

    /// Whether the provider is reachable under at least one service name.
    pub fn is_registered(&self) -> bool {
        !self.service_names.is_empty()
    }
}
