//! Animation binding descriptors.
//!
//! A binding associates one owning element with a property transition and,
//! optionally, a scroll trigger. Bindings are built once, submitted to the
//! lifecycle manager and never changed afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use folio_core::{ElementId, TriggerSpec, TweenVars};

use crate::engine::UpdateFn;

/// Unique identifier of a submitted binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u64);

impl BindingId {
    /// Generate a new unique binding ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable animation descriptor.
#[derive(Clone)]
pub struct AnimationBinding {
    owner: ElementId,
    targets: Vec<ElementId>,
    vars: TweenVars,
    trigger: Option<TriggerSpec>,
    on_update: Option<UpdateFn>,
    label: &'static str,
}

impl AnimationBinding {
    /// Start building a binding owned by `owner`. By default the owner is
    /// also the only target.
    pub fn builder(owner: ElementId, vars: TweenVars) -> BindingBuilder {
        BindingBuilder {
            owner,
            targets: None,
            vars,
            trigger: None,
            on_update: None,
            label: "custom",
        }
    }

    /// The element that rendered this binding's targets.
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    pub fn vars(&self) -> &TweenVars {
        &self.vars
    }

    pub fn trigger(&self) -> Option<&TriggerSpec> {
        self.trigger.as_ref()
    }

    pub fn on_update(&self) -> Option<&UpdateFn> {
        self.on_update.as_ref()
    }

    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the animation progress follows scroll position.
    pub fn is_scrubbed(&self) -> bool {
        self.trigger.is_some_and(|t| t.scrub.is_scrubbed())
    }
}

impl std::fmt::Debug for AnimationBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationBinding")
            .field("label", &self.label)
            .field("owner", &self.owner)
            .field("targets", &self.targets.len())
            .field("trigger", &self.trigger)
            .finish()
    }
}

/// Builder for `AnimationBinding`.
pub struct BindingBuilder {
    owner: ElementId,
    targets: Option<Vec<ElementId>>,
    vars: TweenVars,
    trigger: Option<TriggerSpec>,
    on_update: Option<UpdateFn>,
    label: &'static str,
}

impl BindingBuilder {
    /// Animate these elements instead of the owner.
    pub fn targets(mut self, targets: Vec<ElementId>) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn on_update(mut self, f: impl Fn(f32) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn build(self) -> AnimationBinding {
        AnimationBinding {
            owner: self.owner,
            targets: self.targets.unwrap_or_else(|| vec![self.owner]),
            vars: self.vars,
            trigger: self.trigger,
            on_update: self.on_update,
            label: self.label,
        }
    }
}
