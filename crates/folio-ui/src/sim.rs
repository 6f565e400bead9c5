//! Headless page environment and a simulated page load.
//!
//! `HeadlessDocument` and `HeadlessLayout` stand in for the browser. The
//! `Simulation` wires them to the headless engines and an `App`, then plays
//! a scripted load: images finish one after another, the window load event
//! follows the last image, and the page is wheel-scrolled once it is ready.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use folio_core::{
    Document, ElementId, ImageId, ImageStatus, Layout, MotionConfig, ReadyState, Rect, Region,
};
use folio_motion::{HeadlessEngine, HeadlessScroll};

use crate::app::{App, AppStatus};
use crate::host::HostPhase;
use crate::page::PageRegions;

// =============================================================================
// Headless Document
// =============================================================================

pub struct HeadlessDocument {
    state: RwLock<ReadyState>,
    images: RwLock<Vec<ImageStatus>>,
    scroll_locked: AtomicBool,
}

impl HeadlessDocument {
    /// A document with `images` tracked images, none loaded yet.
    pub fn new(images: u32) -> Self {
        Self {
            state: RwLock::new(ReadyState::Loading),
            images: RwLock::new(
                (0..images)
                    .map(|i| ImageStatus {
                        id: ImageId(i),
                        complete: false,
                    })
                    .collect(),
            ),
            scroll_locked: AtomicBool::new(false),
        }
    }

    /// A document that finished loading before anything looked at it.
    pub fn loaded(images: u32) -> Self {
        let doc = Self::new(images);
        for image in doc.images.write().iter_mut() {
            image.complete = true;
        }
        *doc.state.write() = ReadyState::Complete;
        doc
    }

    /// Mark one image loaded. Returns false if it is unknown or already loaded.
    pub fn load_image(&self, id: ImageId) -> bool {
        let mut images = self.images.write();
        match images.iter_mut().find(|i| i.id == id) {
            Some(image) if !image.complete => {
                image.complete = true;
                true
            }
            _ => false,
        }
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        *self.state.write() = state;
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked.load(Ordering::SeqCst)
    }
}

impl Document for HeadlessDocument {
    fn ready_state(&self) -> ReadyState {
        *self.state.read()
    }

    fn images(&self) -> Vec<ImageStatus> {
        self.images.read().clone()
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locked.store(locked, Ordering::SeqCst);
    }
}

// =============================================================================
// Headless Layout
// =============================================================================

/// Elements stacked top to bottom in a single column.
pub struct HeadlessLayout {
    bounds: RwLock<HashMap<ElementId, Rect>>,
    viewport: RwLock<f32>,
    bottom: RwLock<f32>,
}

impl HeadlessLayout {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            bounds: RwLock::new(HashMap::new()),
            viewport: RwLock::new(viewport_height),
            bottom: RwLock::new(0.0),
        }
    }

    /// Append an element below everything placed so far.
    pub fn stack(&self, element: ElementId, height: f32) -> Rect {
        let rect = {
            let mut bottom = self.bottom.write();
            let rect = Rect::new(*bottom, height);
            *bottom += height;
            rect
        };
        self.bounds.write().insert(element, rect);
        rect
    }

    /// Change an element's height, shifting everything below it.
    pub fn resize_element(&self, element: ElementId, height: f32) {
        let mut bounds = self.bounds.write();
        let Some(rect) = bounds.get(&element).copied() else {
            return;
        };
        let shift = height - rect.height;
        for other in bounds.values_mut() {
            if other.top > rect.top {
                other.top += shift;
            }
        }
        bounds.insert(element, Rect::new(rect.top, height));
        *self.bottom.write() += shift;
    }

    pub fn set_viewport_height(&self, height: f32) {
        *self.viewport.write() = height;
    }

    /// Largest scroll position.
    pub fn scroll_limit(&self) -> f32 {
        (self.document_height() - self.viewport_height()).max(0.0)
    }
}

impl Layout for HeadlessLayout {
    fn bounds(&self, element: ElementId) -> Option<Rect> {
        self.bounds.read().get(&element).copied()
    }

    fn viewport_height(&self) -> f32 {
        *self.viewport.read()
    }

    fn document_height(&self) -> f32 {
        *self.bottom.read()
    }
}

// =============================================================================
// Simulation
// =============================================================================

#[derive(Debug, Clone)]
pub struct SimOptions {
    pub images: u32,
    pub already_loaded: bool,
    pub frame: Duration,
    /// Time between image loads.
    pub image_interval: Duration,
    /// Wheel distance applied once the page is ready.
    pub scroll_to: f32,
    /// Give up after this much simulated time.
    pub limit: Duration,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            images: 4,
            already_loaded: false,
            frame: Duration::from_millis(16),
            image_interval: Duration::from_millis(120),
            scroll_to: 1500.0,
            limit: Duration::from_secs(20),
        }
    }
}

/// What a simulated page load did.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub ready: bool,
    pub elapsed_ms: u64,
    pub window_loaded_at_ms: Option<u64>,
    pub revealed_at_ms: Option<u64>,
    pub scroll_locked: bool,
    pub status: AppStatus,
}

pub struct Simulation {
    options: SimOptions,
    engine: Arc<HeadlessEngine>,
    document: Arc<HeadlessDocument>,
    layout: Arc<HeadlessLayout>,
    app: App<HeadlessScroll>,
    elapsed: Duration,
    next_image: u32,
    window_loaded_at: Option<Duration>,
    revealed_at: Option<Duration>,
    scrolled: bool,
}

impl Simulation {
    pub fn new(options: SimOptions, config: MotionConfig) -> Self {
        let engine = Arc::new(HeadlessEngine::new());
        let document = Arc::new(if options.already_loaded {
            HeadlessDocument::loaded(options.images)
        } else {
            HeadlessDocument::new(options.images)
        });
        let layout = Arc::new(HeadlessLayout::new(900.0));
        let regions = home_page(&layout);
        let scroll = HeadlessScroll::new(&config.scroll, layout.scroll_limit());

        let app = App::new(
            engine.clone(),
            document.clone(),
            layout.clone(),
            scroll,
            config,
            regions,
        );

        Self {
            next_image: if options.already_loaded { options.images } else { 0 },
            options,
            engine,
            document,
            layout,
            app,
            elapsed: Duration::ZERO,
            window_loaded_at: None,
            revealed_at: None,
            scrolled: false,
        }
    }

    pub fn app(&self) -> &App<HeadlessScroll> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App<HeadlessScroll> {
        &mut self.app
    }

    pub fn engine(&self) -> &HeadlessEngine {
        &self.engine
    }

    pub fn document(&self) -> &HeadlessDocument {
        &self.document
    }

    pub fn layout(&self) -> &HeadlessLayout {
        &self.layout
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn start(&mut self) {
        self.app.start();
    }

    /// Advance the environment, the engine and the app by one frame.
    pub fn step(&mut self) {
        let dt = self.options.frame;
        self.elapsed += dt;
        self.drive_environment();
        self.engine.advance(dt);
        self.app.frame(dt);

        if self.revealed_at.is_none() && self.app.host_phase() == HostPhase::Ready {
            self.revealed_at = Some(self.elapsed);
        }
        if self.revealed_at.is_some() && !self.scrolled {
            self.scrolled = true;
            self.app.scroll_mut().wheel(self.options.scroll_to);
        }
    }

    fn drive_environment(&mut self) {
        if self.window_loaded_at.is_some() {
            return;
        }
        while self.next_image < self.options.images {
            let due = self.options.image_interval * (self.next_image + 1);
            if self.elapsed < due {
                return;
            }
            let id = ImageId(self.next_image);
            self.next_image += 1;
            if self.document.load_image(id) {
                self.app.image_loaded(id);
            }
        }
        if self.options.already_loaded {
            // The document was complete at start; the settle delay drives it.
            self.window_loaded_at = Some(Duration::ZERO);
            return;
        }
        self.document.set_ready_state(ReadyState::Complete);
        self.window_loaded_at = Some(self.elapsed);
        self.app.window_loaded();
    }

    /// Step until the page is revealed and scrolled into place, or the limit.
    pub fn run(&mut self) -> SimReport {
        self.start();
        while !self.is_finished() {
            self.step();
        }
        self.report()
    }

    /// The page is revealed and scrolled into place, or time ran out.
    pub fn is_finished(&self) -> bool {
        let settled =
            self.scrolled && self.app.scroll().is_settled() && self.app.pending_timers() == 0;
        settled || self.elapsed >= self.options.limit
    }

    pub fn report(&self) -> SimReport {
        SimReport {
            ready: self.app.host_phase() == HostPhase::Ready,
            elapsed_ms: self.elapsed.as_millis() as u64,
            window_loaded_at_ms: self.window_loaded_at.map(|d| d.as_millis() as u64),
            revealed_at_ms: self.revealed_at.map(|d| d.as_millis() as u64),
            scroll_locked: self.document.is_scroll_locked(),
            status: self.app.status(),
        }
    }
}

/// Lay out and describe the home page.
fn home_page(layout: &HeadlessLayout) -> PageRegions {
    let mut regions = PageRegions::new();

    let hero = layout_region(layout, 900.0, 3);
    let stagger = layout_region(layout, 700.0, 4);
    regions.hero = Some(hero);
    regions.stagger = Some(stagger);
    for slot in regions.images.iter_mut() {
        *slot = Some(layout_region(layout, 500.0, 0));
    }
    regions.marquee = Some(layout_region(layout, 200.0, 1));
    regions.signature = Some(layout_region(layout, 300.0, 3));
    regions.circular = Some(layout_region(layout, 240.0, 0));
    layout_region(layout, 600.0, 0);

    // The progress bar is fixed to the viewport; it does not take up space.
    regions.progress = Some(Region::new(ElementId::new()));
    regions
}

fn layout_region(layout: &HeadlessLayout, height: f32, children: usize) -> Region {
    let element = ElementId::new();
    layout.stack(element, height);
    let children = (0..children).map(|_| ElementId::new()).collect();
    Region::with_children(element, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_image_loading() {
        let doc = HeadlessDocument::new(2);
        assert!(doc.load_image(ImageId(1)));
        assert!(!doc.load_image(ImageId(1)));
        assert!(!doc.load_image(ImageId(7)));
        let loaded: Vec<bool> = doc.images().iter().map(|i| i.complete).collect();
        assert_eq!(loaded, vec![false, true]);
    }

    #[test]
    fn test_loaded_document() {
        let doc = HeadlessDocument::loaded(3);
        assert!(doc.ready_state().is_complete());
        assert!(doc.images().iter().all(|i| i.complete));
    }

    #[test]
    fn test_layout_stacks_and_resizes() {
        let layout = HeadlessLayout::new(800.0);
        let a = ElementId::new();
        let b = ElementId::new();
        layout.stack(a, 500.0);
        layout.stack(b, 300.0);
        assert_eq!(layout.bounds(b), Some(Rect::new(500.0, 300.0)));
        assert_eq!(layout.document_height(), 800.0);
        assert_eq!(layout.scroll_limit(), 0.0);

        layout.resize_element(a, 900.0);
        assert_eq!(layout.bounds(b), Some(Rect::new(900.0, 300.0)));
        assert_eq!(layout.document_height(), 1200.0);
        assert_eq!(layout.scroll_limit(), 400.0);
    }
}
