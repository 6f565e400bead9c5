//! Loading host: owns the preloader and reveals the page after it.
//!
//! ```text
//! Loading ──(load complete + 100ms)──► Revealing ──(+100ms)──► Ready
//!   preloader mounted                  preloader dropped       content fades in,
//!   scroll locked                      scroll unlocked         regions mount
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use folio_core::{Document, Ease, ElementId, HostConfig, PreloaderConfig, Property, Props, TweenVars};

use crate::effect::Effect;
use crate::preloader::{Preloader, PreloaderElements, PreloaderEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPhase {
    Loading,
    Revealing,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Preloader(PreloaderEvent),
    /// The preloader signalled completion.
    LoadComplete,
    HidePreloader,
    RevealContent,
}

pub struct LoadingHost {
    phase: HostPhase,
    preloader: Option<Preloader>,
    content: ElementId,
    config: HostConfig,
}

impl LoadingHost {
    /// `on_load_complete` is handed to the preloader; the runtime is expected
    /// to turn it into `HostEvent::LoadComplete`.
    pub fn new(
        elements: PreloaderElements,
        content: ElementId,
        preloader: PreloaderConfig,
        config: HostConfig,
        on_load_complete: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            phase: HostPhase::Loading,
            preloader: Some(Preloader::new(elements, preloader, on_load_complete)),
            content,
            config,
        }
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    pub fn preloader(&self) -> Option<&Preloader> {
        self.preloader.as_ref()
    }

    pub fn content(&self) -> ElementId {
        self.content
    }

    /// Progress of the mounted preloader.
    pub fn subscribe_progress(&self) -> Option<watch::Receiver<u8>> {
        self.preloader.as_ref().map(Preloader::subscribe)
    }

    pub fn start(&mut self, document: Arc<dyn Document>) -> Vec<Effect<HostEvent>> {
        match self.preloader.as_mut() {
            Some(preloader) => wrap(preloader.start(document)),
            None => Vec::new(),
        }
    }

    pub fn handle(&mut self, event: HostEvent) -> Vec<Effect<HostEvent>> {
        match (self.phase, event) {
            (_, HostEvent::Preloader(event)) => match self.preloader.as_mut() {
                Some(preloader) => wrap(preloader.handle(event)),
                None => Vec::new(),
            },

            (HostPhase::Loading, HostEvent::LoadComplete) => {
                vec![Effect::after(self.config.hide_delay(), HostEvent::HidePreloader)]
            }

            (HostPhase::Loading, HostEvent::HidePreloader) => {
                // Dropping the preloader releases its scroll lock.
                self.preloader = None;
                self.phase = HostPhase::Revealing;
                tracing::debug!("Preloader unmounted");
                vec![Effect::after(self.config.reveal_delay(), HostEvent::RevealContent)]
            }

            (HostPhase::Revealing, HostEvent::RevealContent) => {
                self.phase = HostPhase::Ready;
                tracing::info!("Content revealed");
                let fade = TweenVars::from_to(
                    Props::new().with(Property::Opacity, 0.0).with(Property::Y, 20.0),
                    Props::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
                )
                .duration(self.config.content_fade_secs)
                .ease(Ease::Power2Out);
                vec![Effect::animate(vec![self.content], fade)]
            }

            (phase, event) => {
                tracing::trace!("Host ignoring {:?} in {:?}", event, phase);
                Vec::new()
            }
        }
    }
}

fn wrap(effects: Vec<Effect<PreloaderEvent>>) -> Vec<Effect<HostEvent>> {
    effects.into_iter().map(|e| e.map(HostEvent::Preloader)).collect()
}
