//! Provider handles and resolution stack frames.

use std::fmt;

/// Opaque handle identifying a provider inside one registry.
///
/// Handles are assigned in insertion order by
/// [`ServiceCollection::add_provider`](crate::ServiceCollection::add_provider)
/// and are only meaningful for the registry that issued them: a handle from
/// another collection is rejected even when its index is in range. Two
/// providers registered under the same service name always have different
/// handles.
///
/// ```rust
/// use simple_di::{Provider, ServiceCollection};
///
/// let mut services = ServiceCollection::new();
/// let a = services.add_provider(Provider::new("Clock", |_| 1u8));
/// let b = services.add_provider(Provider::new("Clock", |_| 2u8));
/// assert_ne!(a, b);
/// assert_eq!(a.index(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId {
    registry: u64,
    index: usize,
}

impl ProviderId {
    #[inline]
    pub(crate) fn new(registry: u64, index: usize) -> Self {
        Self { registry, index }
    }

    /// Position of the provider in the registry arena.
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }

    /// Tag of the registry that issued the handle.
    #[inline]
    pub(crate) fn registry(self) -> u64 {
        self.registry
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Service name used for the first frame of every resolution stack.
pub const ROOT_SERVICE_NAME: &str = "root";

/// One entry of the resolution stack: the service name a provider was
/// requested as, and the provider that answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub service_name: String,
    pub provider: ProviderId,
}

impl StackFrame {
    pub(crate) fn new(service_name: impl Into<String>, provider: ProviderId) -> Self {
        Self {
            service_name: service_name.into(),
            provider,
        }
    }

    /// Renders the frame as `Display (as service-name)`, dropping the suffix
    /// when the service name equals the display name.
    pub fn describe(&self, display_name: &str) -> String {
        if display_name == self.service_name {
            display_name.to_string()
        } else {
            format!("{} (as {})", display_name, self.service_name)
        }
    }
}
