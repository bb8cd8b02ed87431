//! Diagnostic observers for dependency injection traceability.
//!
//! Registration and construction never abort on bad data. Every recoverable
//! problem is turned into a [`Diagnostic`], emitted as a `tracing` event at the
//! matching level, and handed to each registered [`DiObserver`]. Observers also
//! see `constructing`/`constructed` events with timing information.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
        })
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Explicit service name list was empty or held an empty name
    InvalidServiceNames,
    /// Default registration attempted for a provider without an intrinsic name
    MissingName,
    /// Default registration attempted for a provider without any declaration
    NotParticipating,
    /// Dependency entry with a cardinality other than `single`/`multiple`
    InvalidCardinality,
    /// Registration helper tried to replace an existing declaration
    ConflictingDeclaration,
    /// Provider revisited while still under construction
    Cycle,
    /// Dependency name with no registered provider
    MissingDependency,
    /// `single` dependency whose name has zero or several providers
    CardinalityMismatch,
    /// Provider without a dependency declaration reached by construction
    NotEligible,
    /// Fallible constructor returned an error
    ConstructorFailed,
    /// Handle not issued by this registry
    UnknownProvider,
    /// Discovery root that is missing or cannot be listed
    UnreadableRoot,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::InvalidServiceNames => "invalid_service_names",
            DiagnosticKind::MissingName => "missing_name",
            DiagnosticKind::NotParticipating => "not_participating",
            DiagnosticKind::InvalidCardinality => "invalid_cardinality",
            DiagnosticKind::ConflictingDeclaration => "conflicting_declaration",
            DiagnosticKind::Cycle => "cycle",
            DiagnosticKind::MissingDependency => "missing_dependency",
            DiagnosticKind::CardinalityMismatch => "cardinality_mismatch",
            DiagnosticKind::NotEligible => "not_eligible",
            DiagnosticKind::ConstructorFailed => "constructor_failed",
            DiagnosticKind::UnknownProvider => "unknown_provider",
            DiagnosticKind::UnreadableRoot => "unreadable_root",
        }
    }
}

/// A single non-fatal condition found during registration or construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub kind: DiagnosticKind,
    /// Display name of the affected provider
    pub provider: String,
    /// Human readable description
    pub message: String,
    /// Resolution stack, root first, rendered as `Display (as name)`.
    /// Empty for registration diagnostics.
    pub stack: Vec<String>,
}

impl Diagnostic {
    pub(crate) fn new(
        level: Level,
        kind: DiagnosticKind,
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            kind,
            provider: provider.into(),
            message: message.into(),
            stack: Vec::new(),
        }
    }

    pub(crate) fn with_stack(mut self, stack: Vec<String>) -> Self {
        self.stack = stack;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Observer trait for dependency injection events.
///
/// Observer calls are made synchronously while the graph is being built, so
/// implementations should stay cheap.
///
/// # Examples
///
/// ```
/// use simple_di::{DiObserver, Diagnostic, ServiceCollection};
/// use std::sync::Arc;
///
/// struct PrintObserver;
///
/// impl DiObserver for PrintObserver {
///     fn diagnostic(&self, diagnostic: &Diagnostic) {
///         eprintln!("[{}] {}", diagnostic.provider, diagnostic.message);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(PrintObserver));
/// ```
pub trait DiObserver: Send + Sync {
    /// Called for every reported condition.
    fn diagnostic(&self, diagnostic: &Diagnostic);

    /// Called before a provider's constructor runs.
    fn constructing(&self, _provider: &str) {}

    /// Called after a provider's constructor returned an instance.
    fn constructed(&self, _provider: &str, _duration: Duration) {}
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    /// Logs the diagnostic and forwards it to every observer.
    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        let kind = diagnostic.kind.as_str();
        let provider = diagnostic.provider.as_str();
        match diagnostic.level {
            Level::Error => error!(kind, provider, "{}", diagnostic.message),
            Level::Warning => warn!(kind, provider, "{}", diagnostic.message),
            Level::Info => info!(kind, provider, "{}", diagnostic.message),
        }
        for observer in &self.observers {
            observer.diagnostic(&diagnostic);
        }
    }

    #[inline]
    pub(crate) fn constructing(&self, provider: &str) {
        trace!(provider, "Calling constructor");
        for observer in &self.observers {
            observer.constructing(provider);
        }
    }

    #[inline]
    pub(crate) fn constructed(&self, provider: &str, duration: Duration) {
        debug!(provider, ?duration, "Constructed");
        for observer in &self.observers {
            observer.constructed(provider, duration);
        }
    }
}

/// Built-in observer that keeps every diagnostic it receives.
///
/// Useful for inspecting why parts of a graph came back as `None`.
///
/// ```
/// use simple_di::{DiagnosticLog, DiagnosticKind, Provider, ServiceCollection};
/// use std::sync::Arc;
///
/// let log = Arc::new(DiagnosticLog::new());
/// let mut services = ServiceCollection::new();
/// services.add_observer(log.clone());
///
/// let id = services.add_provider(Provider::new("Clock", |_| ()));
/// services.register::<&str>(id, &[]);
///
/// assert_eq!(log.kinds(), vec![DiagnosticKind::InvalidServiceNames]);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.entries().iter().map(|d| d.kind).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// A panic elsewhere never leaves the entries half-written, so a
    /// poisoned lock still holds a usable log.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiObserver for DiagnosticLog {
    fn diagnostic(&self, diagnostic: &Diagnostic) {
        self.lock().push(diagnostic.clone());
    }
}
