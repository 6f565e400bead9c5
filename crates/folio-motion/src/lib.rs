//! Scroll-animation lifecycle for folio.
//!
//! This crate provides the animation side of the page:
//! - The `MotionEngine` seam to the tweening engine
//! - Immutable animation bindings and the fixed recipes that build them
//! - A scope registry of live scroll triggers
//! - The lifecycle manager with scope handles released on drop
//! - A frame driver feeding smooth-scroll positions to triggers
//! - Headless engines for simulation and tests

pub mod binding;
pub mod engine;
pub mod frame;
pub mod headless;
pub mod manager;
pub mod recipe;
pub mod registry;

// Re-export commonly used types
pub use binding::{AnimationBinding, BindingBuilder, BindingId};
pub use engine::{CompleteFn, MotionEngine, Playback, TweenId, TweenRequest, UpdateFn};
pub use frame::{FrameDriver, SmoothScroll};
pub use headless::{HeadlessEngine, HeadlessScroll};
pub use manager::{LifecycleManager, ScopeHandle};
pub use recipe::{Direction, Recipe};
pub use registry::{ResolvedTrigger, ScopeId, ScopeRegistry, ScrollAction};
