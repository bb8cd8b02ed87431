//! Resolution session: depth-first construction of one object graph.
//!
//! A session is scoped to one root provider and one frozen registry. Every
//! provider is constructed at most once per session, so two dependents that
//! need the same provider share one instance. Problems are reported through
//! the observers and turn the affected branch into `None`; sibling branches
//! carry on.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

use crate::dependency::{Cardinality, DeclaredDependencies, DependencyDefinition};
use crate::internal::{ResolutionStack, SlotState};
use crate::key::{ProviderId, StackFrame};
use crate::observer::{Diagnostic, DiagnosticKind, Level, Observers};
use crate::registration::{AnyArc, Arguments, Injected, Registry};

/// Outcome of visiting a provider.
enum Visit<'r> {
    /// Settled without running a constructor: shared, failed or cut
    Done(Option<AnyArc>),
    /// Its arguments have to be gathered first
    Descend(Task<'r>),
}

/// A provider whose constructor arguments are being gathered.
struct Task<'r> {
    id: ProviderId,
    display_name: &'r str,
    definitions: &'r [DependencyDefinition],
    /// Next definition to look up
    next: usize,
    args: Vec<Injected>,
    /// Dependency whose providers are being visited
    gathering: Option<Gathering<'r>>,
}

impl Task<'_> {
    fn deliver(&mut self, instance: Option<AnyArc>) {
        if let Some(gathering) = self.gathering.as_mut() {
            gathering.instances.push(instance);
        }
    }
}

/// Providers of one dependency, visited in registration order.
struct Gathering<'r> {
    name: &'r str,
    cardinality: Cardinality,
    providers: &'r [ProviderId],
    next: usize,
    instances: Vec<Option<AnyArc>>,
}

impl Gathering<'_> {
    fn into_injected(self) -> Injected {
        match self.cardinality {
            Cardinality::Single => Injected::Single(self.instances.into_iter().next().flatten()),
            Cardinality::Multiple => Injected::Multiple(self.instances),
        }
    }
}

pub(crate) struct ResolutionSession<'r> {
    registry: &'r Registry,
    observers: &'r Observers,
    root: ProviderId,
    states: RefCell<HashMap<ProviderId, SlotState>>,
    stack: ResolutionStack,
}

impl<'r> ResolutionSession<'r> {
    pub(crate) fn new(
        registry: &'r Registry,
        observers: &'r Observers,
        root: ProviderId,
        root_service_name: &str,
    ) -> Self {
        Self {
            registry,
            observers,
            root,
            states: RefCell::new(HashMap::new()),
            stack: ResolutionStack::new(StackFrame::new(root_service_name, root)),
        }
    }

    /// Builds the root provider and everything it depends on.
    ///
    /// The walk keeps its own stack of providers whose arguments are still
    /// being gathered, so graph depth is bounded by memory rather than by the
    /// thread's call stack.
    pub(crate) fn construct(&self) -> Option<AnyArc> {
        let mut pending = match self.enter(self.root) {
            Visit::Done(instance) => return instance,
            Visit::Descend(task) => vec![task],
        };

        loop {
            let top = pending.last_mut()?;
            if let Some(child) = self.advance(top) {
                pending.push(child);
                continue;
            }

            let task = pending.pop()?;
            let instance = self.finish(task);
            match pending.last_mut() {
                Some(parent) => {
                    self.stack.pop();
                    parent.deliver(instance);
                }
                None => return instance,
            }
        }
    }

    /// First look at a provider: either settles it at once or returns the
    /// task that gathers its arguments.
    fn enter(&self, id: ProviderId) -> Visit<'r> {
        let state = self.states.borrow().get(&id).cloned();
        match state {
            Some(SlotState::Resolved(instance)) => return Visit::Done(Some(instance)),
            Some(SlotState::Pending) => {
                self.report_cycle();
                return Visit::Done(None);
            }
            Some(SlotState::Failed) => {
                tracing::trace!(provider = self.registry.display_name(id), "Already failed in this session");
                return Visit::Done(None);
            }
            None => {}
        }
        self.set_state(id, SlotState::Pending);

        let registry = self.registry;
        let display_name = registry.display_name(id);
        let definitions = match registry.dependencies(id) {
            DeclaredDependencies::Undeclared => {
                self.report(
                    Level::Error,
                    DiagnosticKind::NotEligible,
                    display_name,
                    format!(
                        "Can't use DI to construct {} as it does not declare its dependencies",
                        display_name
                    ),
                );
                self.set_state(id, SlotState::Failed);
                return Visit::Done(None);
            }
            declared => declared.definitions(),
        };

        tracing::debug!(
            provider = display_name,
            "Constructing dependencies to prepare to call constructor"
        );
        Visit::Descend(Task {
            id,
            display_name,
            definitions,
            next: 0,
            args: Vec::with_capacity(definitions.len()),
            gathering: None,
        })
    }

    /// Moves `task` forward until it needs a provider that is not settled
    /// yet, returned as a child task, or until all its arguments are ready.
    fn advance(&self, task: &mut Task<'r>) -> Option<Task<'r>> {
        loop {
            if let Some(gathering) = task.gathering.as_mut() {
                if let Some(&provider) = gathering.providers.get(gathering.next) {
                    gathering.next += 1;
                    self.stack.push(StackFrame::new(gathering.name, provider));
                    match self.enter(provider) {
                        Visit::Done(instance) => {
                            self.stack.pop();
                            gathering.instances.push(instance);
                        }
                        Visit::Descend(child) => return Some(child),
                    }
                    continue;
                }
                if let Some(gathering) = task.gathering.take() {
                    task.args.push(gathering.into_injected());
                }
                continue;
            }

            let definitions = task.definitions;
            let definition = definitions.get(task.next)?;
            task.next += 1;
            match self.find_dependency(task.display_name, definition) {
                Ok(gathering) => task.gathering = Some(gathering),
                Err(injected) => task.args.push(injected),
            }
        }
    }

    /// Calls the constructor of a task whose arguments are all gathered.
    fn finish(&self, task: Task<'r>) -> Option<AnyArc> {
        let Task {
            id, display_name, args, ..
        } = task;
        let args = Arguments::new(args);
        tracing::trace!(provider = display_name, ?args, "Constructor arguments");

        // Only reachable for handles from this registry: `dependencies` reports
        // unknown handles as undeclared.
        let provider = self.registry.provider(id)?;
        let started = self.observers.has_observers().then(Instant::now);
        self.observers.constructing(display_name);

        match provider.construct(&args) {
            Ok(instance) => {
                if let Some(started) = started {
                    self.observers.constructed(display_name, started.elapsed());
                }
                self.set_state(id, SlotState::Resolved(instance.clone()));
                Some(instance)
            }
            Err(err) => {
                self.report(
                    Level::Error,
                    DiagnosticKind::ConstructorFailed,
                    display_name,
                    format!("Constructor of {} failed: {}", display_name, err),
                );
                self.set_state(id, SlotState::Failed);
                None
            }
        }
    }

    /// Looks up the providers for one declared dependency. Dependencies that
    /// cannot be satisfied at all come back as the value to inject.
    fn find_dependency(
        &self,
        owner: &str,
        definition: &'r DependencyDefinition,
    ) -> Result<Gathering<'r>, Injected> {
        let DependencyDefinition { name, cardinality } = definition;
        tracing::trace!(
            provider = owner,
            dependency = %name,
            %cardinality,
            depth = self.stack.depth(),
            "Resolving dependency"
        );

        let registry = self.registry;
        let providers = match registry.lookup(name) {
            Some(providers) if !providers.is_empty() => providers,
            _ => {
                self.report(
                    Level::Error,
                    DiagnosticKind::MissingDependency,
                    owner,
                    format!("Can't construct {} because it needs {}", owner, name),
                );
                return Err(Injected::Null);
            }
        };

        if *cardinality == Cardinality::Single && providers.len() != 1 {
            self.report(
                Level::Error,
                DiagnosticKind::CardinalityMismatch,
                owner,
                format!(
                    "Can't construct {} because its dependency {} does not have exactly one implementation",
                    owner, name
                ),
            );
            return Err(Injected::Null);
        }

        Ok(Gathering {
            name: name.as_str(),
            cardinality: *cardinality,
            providers,
            next: 0,
            instances: Vec::with_capacity(providers.len()),
        })
    }

    fn report_cycle(&self) {
        let current = self.stack.current();
        let parent = self.stack.parent();
        let stack: Vec<String> = self
            .stack
            .snapshot()
            .iter()
            .map(|frame| self.describe(frame))
            .collect();

        let current_desc = current.as_ref().map(|f| self.describe(f)).unwrap_or_default();
        let parent_desc = parent.as_ref().map(|f| self.describe(f)).unwrap_or_default();
        let provider = current
            .map(|f| self.registry.display_name(f.provider).to_string())
            .unwrap_or_default();

        let message = format!(
            "Problem constructing {}. Cyclic dependency trying to construct {}. The current dependency resolution stack is {}",
            parent_desc,
            current_desc,
            stack.join(" => ")
        );
        self.observers
            .report(Diagnostic::new(Level::Error, DiagnosticKind::Cycle, provider, message).with_stack(stack));
    }

    fn report(&self, level: Level, kind: DiagnosticKind, provider: &str, message: String) {
        let stack = self
            .stack
            .snapshot()
            .iter()
            .map(|frame| self.describe(frame))
            .collect();
        self.observers
            .report(Diagnostic::new(level, kind, provider, message).with_stack(stack));
    }

    fn describe(&self, frame: &StackFrame) -> String {
        frame.describe(self.registry.display_name(frame.provider))
    }

    fn set_state(&self, id: ProviderId, state: SlotState) {
        self.states.borrow_mut().insert(id, state);
    }
}
