//! Page controllers for folio.
//!
//! This crate provides the stateful front of the page including:
//! - Preloader progress and exit sequence with a scoped scroll lock
//! - Loading host that reveals the page after the preloader
//! - Navigation menu state machine
//! - Custom cursor
//! - Page regions and their animation plan
//! - Effect runtime with deterministic timers
//! - Headless document, layout and a simulated page load

pub mod app;
pub mod cursor;
pub mod effect;
pub mod host;
pub mod menu;
pub mod page;
pub mod preloader;
pub mod scheduler;
pub mod sim;

// Re-export commonly used types
pub use app::{App, AppEvent, AppStatus};
pub use cursor::{Bounds, Cursor, CursorElements, CursorState, PointerEvent};
pub use effect::{Effect, FrameEvent};
pub use host::{HostEvent, HostPhase, LoadingHost};
pub use menu::{Menu, MenuElements, MenuEvent, MenuState};
pub use page::{home_plan, PageRegions, RegionMount, REGION_NAMES};
pub use preloader::{
    BarElements, Preloader, PreloaderElements, PreloaderEvent, PreloaderPhase, ScrollLockGuard,
};
pub use scheduler::Scheduler;
pub use sim::{HeadlessDocument, HeadlessLayout, SimOptions, SimReport, Simulation};
