//! Runtime that executes controller effects.
//!
//! The app owns every controller plus the timer queue and the frame driver.
//! Engine callbacks never call back into controllers directly: they send
//! events into an unbounded channel that is drained on every frame, after
//! due timers and after the scroll position for the frame is known.
//!
//! ## Frame
//!
//! ```text
//! frame(dt) ──► scheduler.advance(dt) ──► dispatch(due timers)
//!           ──► driver.tick(now)      ──► manager.on_scroll(y)
//!           ──► drain(channel)        ──► dispatch(engine callbacks)
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use folio_core::{Document, ElementId, ImageId, Layout, MotionConfig};
use folio_motion::{
    CompleteFn, FrameDriver, LifecycleManager, MotionEngine, SmoothScroll, TweenRequest,
};

use crate::cursor::{Cursor, CursorElements, PointerEvent};
use crate::effect::Effect;
use crate::host::{HostEvent, HostPhase, LoadingHost};
use crate::menu::{Menu, MenuElements, MenuEvent, MenuState};
use crate::page::{PageRegions, RegionMount};
use crate::preloader::{PreloaderElements, PreloaderEvent, PreloaderPhase};
use crate::scheduler::Scheduler;

/// Number of menu entries: four links and the footer block.
const MENU_ITEMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    Host(HostEvent),
    Menu(MenuEvent),
}

/// Snapshot of the runtime for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct AppStatus {
    pub host: &'static str,
    pub progress: u8,
    pub progress_history: Vec<u8>,
    pub preloader_phases: Vec<&'static str>,
    pub menu: &'static str,
    pub scroll_y: f32,
    pub scopes: usize,
    pub bindings: usize,
    pub frames: u64,
}

pub struct App<S: SmoothScroll> {
    engine: Arc<dyn MotionEngine>,
    document: Arc<dyn Document>,
    scheduler: Scheduler<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    host: LoadingHost,
    menu: Menu,
    cursor: Cursor,
    regions: PageRegions,
    mount: RegionMount,
    driver: FrameDriver<S>,
    progress: Option<watch::Receiver<u8>>,
    progress_history: Vec<u8>,
    preloader_phases: Vec<PreloaderPhase>,
}

impl<S: SmoothScroll> App<S> {
    pub fn new(
        engine: Arc<dyn MotionEngine>,
        document: Arc<dyn Document>,
        layout: Arc<dyn Layout>,
        scroll: S,
        config: MotionConfig,
        regions: PageRegions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = LifecycleManager::new(engine.clone(), layout);

        let notify = tx.clone();
        let host = LoadingHost::new(
            PreloaderElements::new(config.preloader.show_progress_bar),
            ElementId::new(),
            config.preloader.clone(),
            config.host.clone(),
            move || {
                if notify.send(AppEvent::Host(HostEvent::LoadComplete)).is_err() {
                    tracing::warn!("Load complete signal dropped: runtime is gone");
                }
            },
        );

        Self {
            engine,
            document,
            scheduler: Scheduler::new(),
            tx,
            rx,
            host,
            menu: Menu::new(MenuElements::new(MENU_ITEMS)),
            cursor: Cursor::new(CursorElements::new(), config.cursor.clone()),
            regions,
            mount: RegionMount::new(manager.clone()),
            driver: FrameDriver::new(scroll, manager),
            progress: None,
            progress_history: Vec::new(),
            preloader_phases: Vec::new(),
        }
    }

    /// Mount the preloader and place the cursor.
    pub fn start(&mut self) {
        self.progress = self.host.subscribe_progress();
        let effects = self.host.start(self.document.clone());
        self.execute_all(effects.into_iter().map(|e| e.map(AppEvent::Host)));
        let effects = self.cursor.init();
        self.execute_all(effects.into_iter().map(Effect::widen));
        self.observe();
    }

    /// Run one frame of `dt`.
    pub fn frame(&mut self, dt: Duration) {
        for event in self.scheduler.advance(dt) {
            self.dispatch(event);
        }
        let now = self.scheduler.now();
        self.driver.tick(now);
        self.drain();
    }

    /// A tracked image finished loading. Layout may have moved.
    pub fn image_loaded(&mut self, id: ImageId) {
        self.dispatch(AppEvent::Host(HostEvent::Preloader(PreloaderEvent::ImageLoaded(id))));
        self.driver.resize();
    }

    /// The window load event fired.
    pub fn window_loaded(&mut self) {
        self.dispatch(AppEvent::Host(HostEvent::Preloader(PreloaderEvent::WindowLoaded)));
    }

    /// The viewport changed size.
    pub fn resize(&mut self) {
        self.driver.resize();
    }

    pub fn toggle_menu(&mut self) {
        let effects = self.menu.toggle();
        self.execute_all(effects.into_iter().map(|e| e.map(AppEvent::Menu)));
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        let effects = self.cursor.handle(event);
        self.execute_all(effects.into_iter().map(Effect::widen));
    }

    fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: AppEvent) {
        let effects: Vec<Effect<AppEvent>> = match event {
            AppEvent::Host(event) => self
                .host
                .handle(event)
                .into_iter()
                .map(|e| e.map(AppEvent::Host))
                .collect(),
            AppEvent::Menu(event) => self
                .menu
                .handle(event)
                .into_iter()
                .map(|e| e.map(AppEvent::Menu))
                .collect(),
        };
        self.execute_all(effects);
        self.observe();

        if self.host.phase() == HostPhase::Ready && !self.mount.is_mounted() {
            self.mount.mount(&self.regions);
        }
    }

    /// Record progress and preloader phases while the preloader exists.
    fn observe(&mut self) {
        if let Some(rx) = self.progress.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                self.progress_history.push(*rx.borrow_and_update());
            }
        }
        if let Some(preloader) = self.host.preloader() {
            self.preloader_phases = preloader.visited().to_vec();
        }
    }

    fn execute_all(&mut self, effects: impl IntoIterator<Item = Effect<AppEvent>>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect<AppEvent>) {
        match effect {
            Effect::Tween {
                targets,
                vars,
                on_update,
                on_complete,
            } => {
                let mut request = TweenRequest::new(targets, vars);
                if let Some(frame) = on_update {
                    let tx = self.tx.clone();
                    request = request.on_update(Arc::new(move |p| {
                        let _ = tx.send(frame(p));
                    }));
                }
                if let Some(event) = on_complete {
                    let tx = self.tx.clone();
                    request = request.on_complete(Box::new(move || {
                        let _ = tx.send(event);
                    }));
                }
                self.engine.tween(request);
            }
            Effect::Timeline {
                timeline,
                on_complete,
            } => {
                let done = on_complete.map(|event| {
                    let tx = self.tx.clone();
                    Box::new(move || {
                        let _ = tx.send(event);
                    }) as CompleteFn
                });
                self.engine.timeline(timeline, done);
            }
            Effect::After { delay, event } => {
                self.scheduler.schedule(delay, event);
            }
        }
    }

    pub fn host_phase(&self) -> HostPhase {
        self.host.phase()
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Last published progress, also after the preloader is gone.
    pub fn progress(&self) -> u8 {
        self.progress.as_ref().map(|rx| *rx.borrow()).unwrap_or(0)
    }

    pub fn progress_history(&self) -> &[u8] {
        &self.progress_history
    }

    pub fn preloader_phases(&self) -> &[PreloaderPhase] {
        &self.preloader_phases
    }

    pub fn manager(&self) -> &LifecycleManager {
        self.mount.manager()
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn scroll(&self) -> &S {
        self.driver.scroll()
    }

    pub fn scroll_mut(&mut self) -> &mut S {
        self.driver.scroll_mut()
    }

    pub fn scroll_position(&self) -> f32 {
        self.driver.scroll().position()
    }

    pub fn status(&self) -> AppStatus {
        let registry = self.manager().registry();
        AppStatus {
            host: match self.host.phase() {
                HostPhase::Loading => "loading",
                HostPhase::Revealing => "revealing",
                HostPhase::Ready => "ready",
            },
            progress: self.progress(),
            progress_history: self.progress_history.clone(),
            preloader_phases: self.preloader_phases.iter().map(|p| phase_name(*p)).collect(),
            menu: match self.menu.state() {
                MenuState::Closed => "closed",
                MenuState::Opening => "opening",
                MenuState::Open => "open",
                MenuState::Closing => "closing",
            },
            scroll_y: self.scroll_position(),
            scopes: registry.scope_count(),
            bindings: registry.total_bindings(),
            frames: self.driver.frames(),
        }
    }
}

fn phase_name(phase: PreloaderPhase) -> &'static str {
    match phase {
        PreloaderPhase::Polling => "polling",
        PreloaderPhase::Ramping => "ramping",
        PreloaderPhase::Exiting => "exiting",
        PreloaderPhase::Done => "done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{HeadlessDocument, HeadlessLayout};
    use folio_motion::{HeadlessEngine, HeadlessScroll};

    fn app(doc: Arc<HeadlessDocument>) -> (App<HeadlessScroll>, Arc<HeadlessEngine>) {
        let engine = Arc::new(HeadlessEngine::new());
        let layout = Arc::new(HeadlessLayout::new(800.0));
        let config = MotionConfig::default();
        let scroll = HeadlessScroll::new(&config.scroll, 0.0);
        let app = App::new(
            engine.clone(),
            doc,
            layout,
            scroll,
            config,
            PageRegions::new(),
        );
        (app, engine)
    }

    fn run(app: &mut App<HeadlessScroll>, engine: &HeadlessEngine, frames: usize) {
        let dt = Duration::from_millis(16);
        for _ in 0..frames {
            engine.advance(dt);
            app.frame(dt);
        }
    }

    #[test]
    fn test_loaded_document_reaches_ready() {
        let doc = Arc::new(HeadlessDocument::loaded(0));
        let (mut app, engine) = app(doc.clone());
        app.start();
        assert!(doc.is_scroll_locked());
        assert_eq!(app.progress(), 70);

        // Settle, ramp, pause, exit and two host delays fit in three seconds.
        run(&mut app, &engine, 200);

        assert_eq!(app.host_phase(), HostPhase::Ready);
        assert!(!doc.is_scroll_locked());
        assert_eq!(app.progress(), 100);
        assert_eq!(
            app.preloader_phases(),
            &[
                PreloaderPhase::Polling,
                PreloaderPhase::Ramping,
                PreloaderPhase::Exiting,
                PreloaderPhase::Done
            ]
        );
        let history = app.progress_history();
        assert_eq!(history.first(), Some(&70));
        assert_eq!(history.last(), Some(&100));
        assert!(history.windows(2).all(|w| w[0] < w[1]));
        assert!(app.is_mounted());
    }

    #[test]
    fn test_waits_for_window_load() {
        let doc = Arc::new(HeadlessDocument::new(2));
        let (mut app, engine) = app(doc.clone());
        app.start();
        assert_eq!(app.progress(), 50);

        doc.load_image(ImageId(0));
        app.image_loaded(ImageId(0));
        assert_eq!(app.progress(), 65);
        run(&mut app, &engine, 100);
        assert_eq!(app.host_phase(), HostPhase::Loading);
        assert!(doc.is_scroll_locked());

        app.window_loaded();
        assert_eq!(app.progress(), 90);
        run(&mut app, &engine, 200);
        assert_eq!(app.host_phase(), HostPhase::Ready);
        assert!(!doc.is_scroll_locked());
    }

    #[test]
    fn test_menu_round_trip_through_engine() {
        let doc = Arc::new(HeadlessDocument::loaded(0));
        let (mut app, engine) = app(doc);
        app.start();

        app.toggle_menu();
        assert_eq!(app.menu_state(), MenuState::Opening);
        app.toggle_menu();
        assert_eq!(app.menu_state(), MenuState::Opening);
        run(&mut app, &engine, 100);
        assert_eq!(app.menu_state(), MenuState::Open);

        app.toggle_menu();
        assert_eq!(app.menu_state(), MenuState::Closing);
        run(&mut app, &engine, 100);
        assert_eq!(app.menu_state(), MenuState::Closed);
    }
}
