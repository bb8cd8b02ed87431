//! Providers and the registry that maps service names to them.

use std::any::Any;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::dependency::{Declaration, DeclaredDependencies, Depends};
use crate::key::ProviderId;

/// Type-erased instance produced by a constructor.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Error a fallible constructor may return.
pub type BoxError = Box<dyn StdError + Send + Sync>;

pub(crate) type Constructor = Arc<dyn Fn(&Arguments) -> Result<AnyArc, BoxError> + Send + Sync>;

const ANONYMOUS: &str = "anonymous provider";

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(1);

/// Value injected for one declared dependency.
#[derive(Clone)]
pub enum Injected {
    /// The dependency could not be satisfied at all: its name has no
    /// provider, or a `single` name has several
    Null,
    /// Result of a `single` dependency, `None` when it could not be built
    Single(Option<AnyArc>),
    /// Results of a `multiple` dependency in registration order.
    /// Entries that could not be built stay in place as `None`.
    Multiple(Vec<Option<AnyArc>>),
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Injected::Null => f.write_str("Null"),
            Injected::Single(v) => f.debug_tuple("Single").field(&v.is_some()).finish(),
            Injected::Multiple(v) => f
                .debug_tuple("Multiple")
                .field(&v.iter().map(Option::is_some).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Positional constructor arguments, one per declared dependency.
///
/// Typed accessors downcast the injected instances. A slot that is missing,
/// was not built, or holds another type reads as `None`.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<Injected>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Injected>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Injected> {
        self.values.get(index)
    }

    /// Whether the argument at `index` is [`Injected::Null`].
    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(Injected::Null))
    }

    /// The `single` dependency at `index`, downcast to `T`.
    pub fn single<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        match self.values.get(index)? {
            Injected::Single(Some(value)) => value.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// The `multiple` dependency at `index`, each entry downcast to `T`.
    /// Empty when the dependency was null.
    pub fn multiple<T: Any + Send + Sync>(&self, index: usize) -> Vec<Option<Arc<T>>> {
        match self.values.get(index) {
            Some(Injected::Multiple(values)) => values
                .iter()
                .map(|v| v.clone().and_then(|v| v.downcast::<T>().ok()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A constructible unit.
///
/// A provider pairs a constructor with an optional intrinsic name. The
/// service names it answers to and the dependencies it needs are supplied at
/// registration time, or carried as intrinsic metadata for the discovery path
/// ([`ServiceCollection::add_class`](crate::ServiceCollection::add_class)).
///
/// ```rust
/// use simple_di::{Depends, Provider};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Alarm { clock: Option<Arc<Clock>> }
///
/// let alarm = Provider::new("Alarm", |args| Alarm { clock: args.single::<Clock>(0) })
///     .with_depends(Depends::list(["Clock"]));
/// assert_eq!(alarm.display_name(), "Alarm");
/// ```
#[derive(Clone)]
pub struct Provider {
    name: Option<String>,
    service_names: Option<Vec<String>>,
    depends: Depends,
    ctor: Constructor,
}

impl Provider {
    /// Creates a named provider from an infallible constructor.
    pub fn new<T, F>(name: impl Into<String>, ctor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> T + Send + Sync + 'static,
    {
        Self::from_constructor(Some(name.into()), wrap(ctor))
    }

    /// Creates a provider without an intrinsic name.
    pub fn anonymous<T, F>(ctor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> T + Send + Sync + 'static,
    {
        Self::from_constructor(None, wrap(ctor))
    }

    /// Creates a named provider whose constructor may fail.
    pub fn try_new<T, F>(name: impl Into<String>, ctor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let ctor: Constructor = Arc::new(move |args: &Arguments| -> Result<AnyArc, BoxError> {
            Ok(Arc::new(ctor(args)?))
        });
        Self::from_constructor(Some(name.into()), ctor)
    }

    pub(crate) fn from_constructor(name: Option<String>, ctor: Constructor) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            service_names: None,
            depends: Depends::Undefined,
            ctor,
        }
    }

    /// Explicit service names used instead of the intrinsic name.
    pub fn with_service_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Intrinsic dependency declaration.
    pub fn with_depends(mut self, depends: impl Into<Depends>) -> Self {
        self.depends = depends.into();
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Intrinsic name, or `anonymous provider`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS)
    }

    pub fn service_names(&self) -> Option<&[String]> {
        self.service_names.as_deref()
    }

    pub fn depends(&self) -> &Depends {
        &self.depends
    }

    pub(crate) fn construct(&self, args: &Arguments) -> Result<AnyArc, BoxError> {
        (self.ctor)(args)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.display_name())
            .field("service_names", &self.service_names)
            .field("depends", &self.depends)
            .finish_non_exhaustive()
    }
}

fn wrap<T, F>(ctor: F) -> Constructor
where
    T: Any + Send + Sync,
    F: Fn(&Arguments) -> T + Send + Sync + 'static,
{
    Arc::new(move |args: &Arguments| -> Result<AnyArc, BoxError> { Ok(Arc::new(ctor(args))) })
}

/// Provider plus its stored declaration.
pub(crate) struct Registration {
    pub(crate) provider: Provider,
    pub(crate) declaration: Declaration,
}

/// Service registry: provider arena, name index and declarations.
pub(crate) struct Registry {
    /// Process-unique tag stamped into every handle this registry issues
    tag: u64,
    entries: Vec<Registration>,
    by_name: HashMap<String, Vec<ProviderId>>,
    /// Names in first-registration order, for introspection
    names: Vec<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            tag: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            entries: Vec::new(),
            by_name: HashMap::new(),
            names: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, provider: Provider) -> ProviderId {
        let id = ProviderId::new(self.tag, self.entries.len());
        self.entries.push(Registration {
            provider,
            declaration: Declaration::Undeclared,
        });
        id
    }

    #[inline]
    pub(crate) fn get(&self, id: ProviderId) -> Option<&Registration> {
        if id.registry() != self.tag {
            return None;
        }
        self.entries.get(id.index())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ProviderId) -> Option<&mut Registration> {
        if id.registry() != self.tag {
            return None;
        }
        self.entries.get_mut(id.index())
    }

    pub(crate) fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.get(id).map(|r| &r.provider)
    }

    pub(crate) fn display_name(&self, id: ProviderId) -> &str {
        self.provider(id).map_or(ANONYMOUS, Provider::display_name)
    }

    /// Appends `id` under `name` unless it is already there.
    pub(crate) fn bind(&mut self, name: &str, id: ProviderId) {
        if !self.by_name.contains_key(name) {
            self.names.push(name.to_string());
        }
        let list = self.by_name.entry(name.to_string()).or_default();
        if !list.contains(&id) {
            list.push(id);
        }
    }

    #[inline]
    pub(crate) fn lookup(&self, name: &str) -> Option<&[ProviderId]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    pub(crate) fn dependencies(&self, id: ProviderId) -> DeclaredDependencies<'_> {
        self.get(id)
            .map_or(DeclaredDependencies::Undeclared, |r| r.declaration.view())
    }

    /// Service names `id` is registered under, in first-registration order.
    pub(crate) fn names_of(&self, id: ProviderId) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| self.by_name.get(*name).is_some_and(|ids| ids.contains(&id)))
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ProviderId> {
        let tag = self.tag;
        (0..self.entries.len()).map(move |index| ProviderId::new(tag, index))
    }
}
