//! Lifecycle hooks discovered on a suite by reserved method names.
//!
//! [`Hooks`] stores the optional callbacks a suite declares: `before` and
//! `after` wrap the whole scenario, `before_step` and `after_step` wrap every
//! step. Hooks receive special arguments like steps do but never take
//! parameters derived from step text. [`Phase`] tracks where a scenario is in
//! its lifecycle.

use std::fmt;

use serde::Serialize;

use crate::{
    definition::shape,
    error::DefinitionError,
    handler::Handler,
    special::{SpecialArgSpec, SpecialArgs},
    suite::MethodTable,
};

/// The four lifecycle hook kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// Runs once before the first step of a scenario.
    Before,
    /// Runs once after the scenario, regardless of step outcomes.
    After,
    /// Runs before each step.
    BeforeStep,
    /// Runs after each step, regardless of the step's outcome.
    AfterStep,
}

impl HookKind {
    /// Every hook kind.
    pub const ALL: [Self; 4] = [Self::Before, Self::After, Self::BeforeStep, Self::AfterStep];

    /// Reserved suite method name for this hook.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::BeforeStep => "before_step",
            Self::AfterStep => "after_step",
        }
    }

    /// Whether `name` is reserved for a hook and so never a step.
    #[must_use]
    pub fn is_reserved(name: &str) -> bool { Self::ALL.iter().any(|k| k.method_name() == name) }

    const fn index(self) -> usize {
        match self {
            Self::Before => 0,
            Self::After => 1,
            Self::BeforeStep => 2,
            Self::AfterStep => 3,
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.method_name()) }
}

/// A validated hook callable.
pub struct Hook<S> {
    kind: HookKind,
    specials: Vec<SpecialArgSpec>,
    handler: Handler<S>,
    location: String,
}

impl<S> Hook<S> {
    /// Which hook this is.
    #[must_use]
    pub fn kind(&self) -> HookKind { self.kind }

    /// Special arguments in declaration order.
    #[must_use]
    pub fn specials(&self) -> &[SpecialArgSpec] { &self.specials }

    /// Type-erased callable.
    #[must_use]
    pub fn handler(&self) -> &Handler<S> { &self.handler }

    /// Where the hook was declared.
    #[must_use]
    pub fn location(&self) -> &str { &self.location }
}

/// The hooks a suite declares.
pub struct Hooks<S> {
    hooks: [Option<Hook<S>>; 4],
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self {
            hooks: [None, None, None, None],
        }
    }
}

impl<S: 'static> Hooks<S> {
    /// Look up and validate the hooks in `methods`.
    ///
    /// A missing hook is simply absent.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::HookParameters`] if a hook declares text
    /// parameters, or any other [`DefinitionError`] for a malformed
    /// signature.
    pub fn discover(
        methods: &MethodTable<S>,
        specials: &SpecialArgs,
    ) -> Result<Self, DefinitionError> {
        let mut hooks = Self::default();
        for kind in HookKind::ALL {
            let Some(method) = methods.get(kind.method_name()) else {
                continue;
            };
            let shape = shape(method.signature(), method.location(), specials)?;
            if !shape.params.is_empty() {
                return Err(DefinitionError::HookParameters {
                    location: method.location().to_owned(),
                    hook: kind.method_name(),
                });
            }
            hooks.hooks[kind.index()] = Some(Hook {
                kind,
                specials: shape.specials,
                handler: method.handler().clone(),
                location: method.location().to_owned(),
            });
        }
        Ok(hooks)
    }

    /// The hook of `kind`, if declared.
    #[must_use]
    pub fn get(&self, kind: HookKind) -> Option<&Hook<S>> { self.hooks[kind.index()].as_ref() }

    /// Number of declared hooks.
    #[must_use]
    pub fn len(&self) -> usize { self.hooks.iter().flatten().count() }

    /// Whether the suite declares no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<S> fmt::Debug for Hooks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().flatten().map(|h| h.kind))
            .finish()
    }
}

/// Lifecycle position of a scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has run.
    #[default]
    NotStarted,
    /// The `before` hook has been dispatched.
    BeforeRan,
    /// A step, with its surrounding step hooks, is running.
    StepRunning,
    /// The `after` hook has been dispatched.
    AfterRan,
    /// The scenario is finished.
    Done,
}

impl Phase {
    /// Whether a scenario in this phase may move to `next`.
    ///
    /// A scenario whose steps could not all be resolved goes straight from
    /// [`Phase::NotStarted`] to [`Phase::Done`] without running any hook.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::BeforeRan | Self::Done)
                | (Self::BeforeRan | Self::StepRunning, Self::StepRunning | Self::AfterRan)
                | (Self::AfterRan, Self::Done)
        )
    }
}

/// Tracks a scenario's [`Phase`], asserting legal transitions in debug
/// builds.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    phase: Phase,
}

impl Lifecycle {
    pub(crate) fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal lifecycle transition {:?} -> {next:?}",
            self.phase
        );
        self.phase = next;
    }

    pub(crate) fn phase(&self) -> Phase { self.phase }
}
