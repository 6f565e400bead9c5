//! Process-wide table of live scroll-linked bindings.
//!
//! Entries are keyed by scope. Each scope owns its bindings exclusively;
//! releasing a scope removes exactly that scope's entries and flips its
//! liveness flag so wrapped callbacks become inert.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use folio_core::{ElementId, Layout, Rect, Scrub, TriggerSpec, TriggerTarget};

use crate::binding::BindingId;
use crate::engine::TweenId;

/// Identifier of one registration scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u64);

impl ScopeId {
    /// Generate a new unique scope ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope:{}", self.0)
    }
}

/// Trigger offsets in document pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTrigger {
    pub start: f32,
    pub end: f32,
}

impl ResolvedTrigger {
    pub fn resolve(spec: &TriggerSpec, layout: &dyn Layout) -> Self {
        let bounds = match spec.target {
            TriggerTarget::Element(el) => layout.bounds(el).unwrap_or_default(),
            TriggerTarget::Document => Rect::new(0.0, layout.document_height()),
        };
        let (start, end) = spec.resolve(bounds, layout.viewport_height());
        Self { start, end }
    }

    /// Progress through the region at scroll position `y`, in [0, 1].
    pub fn progress(&self, y: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            return if y >= self.start { 1.0 } else { 0.0 };
        }
        ((y - self.start) / span).clamp(0.0, 1.0)
    }
}

/// What the manager should tell the engine after a scroll sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    Seek { tween: TweenId, progress: f32 },
    Play { tween: TweenId },
}

/// A registered binding.
#[derive(Debug)]
pub(crate) struct LiveBinding {
    pub id: BindingId,
    pub owner: ElementId,
    pub tween: TweenId,
    pub trigger: Option<LiveTrigger>,
}

#[derive(Debug)]
pub(crate) struct LiveTrigger {
    pub spec: TriggerSpec,
    pub resolved: ResolvedTrigger,
    /// Time-based tween already started by crossing its start offset.
    pub started: bool,
    /// Last progress sent to the engine for scrubbed tweens.
    pub last_progress: Option<f32>,
}

impl LiveTrigger {
    pub fn new(spec: TriggerSpec, layout: &dyn Layout) -> Self {
        Self {
            resolved: ResolvedTrigger::resolve(&spec, layout),
            spec,
            started: false,
            last_progress: None,
        }
    }

    fn sample(&mut self, tween: TweenId, y: f32) -> Option<ScrollAction> {
        match self.spec.scrub {
            Scrub::Off => {
                if !self.started && y >= self.resolved.start {
                    self.started = true;
                    Some(ScrollAction::Play { tween })
                } else {
                    None
                }
            }
            Scrub::Locked | Scrub::Smoothed(_) => {
                let progress = self.resolved.progress(y);
                if self.last_progress == Some(progress) {
                    return None;
                }
                self.last_progress = Some(progress);
                Some(ScrollAction::Seek { tween, progress })
            }
        }
    }
}

/// All bindings of one scope plus its liveness flag.
#[derive(Debug)]
pub(crate) struct ScopeEntry {
    pub alive: Arc<AtomicBool>,
    pub bindings: Vec<LiveBinding>,
}

/// Process-wide scope table.
pub struct ScopeRegistry {
    scopes: RwLock<HashMap<ScopeId, ScopeEntry>>,
}

impl ScopeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn insert(&self, id: ScopeId, entry: ScopeEntry) {
        let mut scopes = self.scopes.write();
        scopes.insert(id, entry);
    }

    /// Remove a scope and mark it dead. Returns its bindings, or `None` if
    /// the scope was already gone.
    pub(crate) fn remove(&self, id: ScopeId) -> Option<Vec<LiveBinding>> {
        let entry = self.scopes.write().remove(&id)?;
        entry.alive.store(false, Ordering::Release);
        Some(entry.bindings)
    }

    /// Recompute every trigger against the current layout.
    pub(crate) fn refresh(&self, layout: &dyn Layout) -> usize {
        let mut scopes = self.scopes.write();
        let mut count = 0;
        for entry in scopes.values_mut() {
            for binding in entry.bindings.iter_mut() {
                if let Some(trigger) = binding.trigger.as_mut() {
                    trigger.resolved = ResolvedTrigger::resolve(&trigger.spec, layout);
                    count += 1;
                }
            }
        }
        count
    }

    /// Sample every live trigger at scroll position `y`.
    pub(crate) fn sample(&self, y: f32) -> Vec<ScrollAction> {
        let mut scopes = self.scopes.write();
        let mut actions = Vec::new();
        for entry in scopes.values_mut() {
            for binding in entry.bindings.iter_mut() {
                let tween = binding.tween;
                if let Some(action) = binding.trigger.as_mut().and_then(|t| t.sample(tween, y)) {
                    actions.push(action);
                }
            }
        }
        actions
    }

    /// Whether a scope is registered.
    pub fn contains(&self, id: ScopeId) -> bool {
        self.scopes.read().contains_key(&id)
    }

    /// Number of registered scopes.
    pub fn scope_count(&self) -> usize {
        self.scopes.read().len()
    }

    /// Number of bindings in one scope (0 for unknown scopes).
    pub fn binding_count(&self, id: ScopeId) -> usize {
        self.scopes
            .read()
            .get(&id)
            .map(|e| e.bindings.len())
            .unwrap_or(0)
    }

    /// Number of bindings across all scopes.
    pub fn total_bindings(&self) -> usize {
        self.scopes.read().values().map(|e| e.bindings.len()).sum()
    }

    /// Owners of the bindings in one scope, in registration order.
    pub fn owners(&self, id: ScopeId) -> Vec<ElementId> {
        self.scopes
            .read()
            .get(&id)
            .map(|e| e.bindings.iter().map(|b| b.owner).collect())
            .unwrap_or_default()
    }

    /// Resolved trigger offsets of one scope, by binding.
    pub fn triggers(&self, id: ScopeId) -> Vec<(BindingId, ResolvedTrigger)> {
        self.scopes
            .read()
            .get(&id)
            .map(|e| {
                e.bindings
                    .iter()
                    .filter_map(|b| b.trigger.as_ref().map(|t| (b.id, t.resolved)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
