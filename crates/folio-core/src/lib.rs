//! Core types for the folio motion controllers.
//!
//! This crate contains shared data structures that are used across all folio crates:
//! - Element handles and environment traits (document readiness, layout)
//! - Easing curves
//! - Tween and timeline descriptors
//! - Scroll trigger offsets
//! - Configuration types
//! - Error types

mod config;
mod ease;
mod element;
mod env;
mod error;
mod trigger;
mod tween;

pub use config::{
    config_dir, config_path, CursorConfig, HostConfig, MotionConfig, PreloaderConfig,
    ScrollConfig,
};
pub use ease::Ease;
pub use element::{ElementId, ImageId, Region};
pub use env::{Document, ImageStatus, Layout, ReadyState, Rect};
pub use error::{ConfigError, OffsetParseError};
pub use trigger::{EdgeOffset, Scrub, TriggerEnd, TriggerSpec, TriggerTarget};
pub use tween::{span, Origin, Position, Property, Props, Timeline, TimelineStep, TweenVars, MAX_SECS};
