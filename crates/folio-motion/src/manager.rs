//! Scroll-animation lifecycle manager.
//!
//! Regions hand their rendered elements to `register`, which creates one
//! engine tween per element and returns a `ScopeHandle`. Releasing the
//! handle (explicitly or by dropping it) kills every tween of the scope and
//! removes its triggers before returning, so nothing attributed to the
//! region runs afterwards.
//!
//! ## Flow
//!
//! ```text
//! mount ──► register(plan) ──► engine.tween() per binding
//!                  │                 │
//!                  ▼                 ▼
//!            ScopeRegistry ◄── on_scroll(y) ──► seek / play
//!                  │
//! unmount ──► release(scope) ──► engine.kill() per binding
//! ```

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use folio_core::{Layout, Region, Scrub};

use crate::binding::{AnimationBinding, BindingId};
use crate::engine::{MotionEngine, Playback, TweenRequest, UpdateFn};
use crate::recipe::Recipe;
use crate::registry::{LiveBinding, LiveTrigger, ScopeEntry, ScopeId, ScopeRegistry, ScrollAction};

// =============================================================================
// Shared State
// =============================================================================

struct Shared {
    engine: Arc<dyn MotionEngine>,
    layout: Arc<dyn Layout>,
    registry: ScopeRegistry,
    /// Most recent scroll position, used to place new bindings.
    last_scroll: Mutex<f32>,
}

impl Shared {
    fn release(&self, id: ScopeId) -> usize {
        let Some(bindings) = self.registry.remove(id) else {
            tracing::trace!("{} already released", id);
            return 0;
        };
        for binding in &bindings {
            self.engine.kill(binding.tween);
        }
        tracing::debug!("Released {} ({} bindings)", id, bindings.len());
        bindings.len()
    }

    fn apply(&self, actions: Vec<ScrollAction>) {
        for action in actions {
            match action {
                ScrollAction::Seek { tween, progress } => self.engine.seek(tween, progress),
                ScrollAction::Play { tween } => self.engine.play(tween),
            }
        }
    }
}

// =============================================================================
// Lifecycle Manager
// =============================================================================

/// Registers animation bindings per scope and guarantees their release.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct LifecycleManager {
    shared: Arc<Shared>,
}

impl LifecycleManager {
    /// Create a manager on top of an engine and a layout source.
    pub fn new(engine: Arc<dyn MotionEngine>, layout: Arc<dyn Layout>) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine,
                layout,
                registry: ScopeRegistry::new(),
                last_scroll: Mutex::new(0.0),
            }),
        }
    }

    /// Register one binding per present region, each built from its recipe.
    ///
    /// Absent regions are skipped: they stand for children a component chose
    /// not to render. All bindings share the returned scope.
    pub fn register<I>(&self, plan: I) -> ScopeHandle
    where
        I: IntoIterator<Item = (Option<Region>, Recipe)>,
    {
        let bindings = plan
            .into_iter()
            .filter_map(|(region, recipe)| {
                let region = region?;
                let binding = recipe.binding(&region);
                if binding.is_none() {
                    tracing::debug!("{} has nothing to animate, skipped", recipe.label());
                }
                binding
            })
            .collect();
        self.register_bindings(bindings)
    }

    /// Register prebuilt bindings under a new scope.
    ///
    /// A binding whose owner is already bound in this call is skipped, so a
    /// scope never holds more bindings than distinct rendered elements.
    pub fn register_bindings(&self, bindings: Vec<AnimationBinding>) -> ScopeHandle {
        let id = ScopeId::new();
        let alive = Arc::new(AtomicBool::new(true));
        let layout = self.shared.layout.as_ref();

        let mut owners = HashSet::new();
        let mut live = Vec::with_capacity(bindings.len());
        for binding in bindings {
            if !owners.insert(binding.owner()) {
                tracing::debug!(
                    "{} already bound in {}, skipping {}",
                    binding.owner(),
                    id,
                    binding.label()
                );
                continue;
            }

            let playback = match binding.trigger().map(|t| t.scrub) {
                None => Playback::Immediate,
                Some(Scrub::Off) => Playback::Paused,
                Some(Scrub::Locked) => Playback::Scrubbed { smoothing: None },
                Some(Scrub::Smoothed(d)) => Playback::Scrubbed { smoothing: Some(d) },
            };
            let mut request = TweenRequest::new(binding.targets().to_vec(), binding.vars().clone())
                .playback(playback);
            if let Some(f) = binding.on_update() {
                request = request.on_update(guard(f.clone(), alive.clone()));
            }

            let tween = self.shared.engine.tween(request);
            tracing::debug!("{}: {} on {} -> {:?}", id, binding.label(), binding.owner(), tween);

            live.push(LiveBinding {
                id: BindingId::new(),
                owner: binding.owner(),
                tween,
                trigger: binding.trigger().map(|spec| LiveTrigger::new(*spec, layout)),
            });
        }

        let count = live.len();
        self.shared.registry.insert(
            id,
            ScopeEntry {
                alive,
                bindings: live,
            },
        );
        tracing::debug!("Registered {} with {} bindings", id, count);

        // Place new scroll-linked bindings at the current scroll position.
        let y = *self.shared.last_scroll.lock();
        self.shared.apply(self.shared.registry.sample(y));

        ScopeHandle {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Release every binding of a scope. Idempotent.
    ///
    /// Returns the number of bindings released; 0 if the scope was already
    /// released.
    pub fn release(&self, id: ScopeId) -> usize {
        self.shared.release(id)
    }

    /// Recompute all trigger offsets against the current layout, then
    /// re-sample at the last known scroll position.
    pub fn refresh(&self) {
        let count = self.shared.registry.refresh(self.shared.layout.as_ref());
        tracing::debug!("Refreshed {} triggers", count);
        let y = *self.shared.last_scroll.lock();
        self.shared.apply(self.shared.registry.sample(y));
    }

    /// Push a new scroll position to every live trigger.
    pub fn on_scroll(&self, y: f32) {
        *self.shared.last_scroll.lock() = y;
        self.shared.apply(self.shared.registry.sample(y));
    }

    /// The scope table, for inspection.
    pub fn registry(&self) -> &ScopeRegistry {
        &self.shared.registry
    }
}

/// Wrap a callback so it does nothing once its scope is released.
fn guard(f: UpdateFn, alive: Arc<AtomicBool>) -> UpdateFn {
    Arc::new(move |progress| {
        if alive.load(Ordering::Acquire) {
            f(progress);
        }
    })
}

// =============================================================================
// Scope Handle
// =============================================================================

/// Disposal handle for one registration scope.
///
/// Dropping the handle releases the scope. Explicit `release` does the same
/// and may be called before the drop.
#[must_use = "dropping a ScopeHandle releases its animations immediately"]
pub struct ScopeHandle {
    id: ScopeId,
    shared: Weak<Shared>,
}

impl ScopeHandle {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Release the scope now. Returns the number of bindings released.
    pub fn release(&self) -> usize {
        self.shared.upgrade().map(|s| s.release(self.id)).unwrap_or(0)
    }

    /// Whether the scope still has live bindings registered.
    pub fn is_live(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|s| s.registry.contains(self.id))
    }
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeHandle").field("id", &self.id).finish()
    }
}
