//! Declarative front for [`Adapter`]: diff props, issue the imperative calls.

use crate::adapter::{Adapter, StateObserver};
use crate::config::{AttachOptions, LoopSetting};
use crate::engine::PlayerEngine;
use crate::payload::PayloadIdentity;
use crate::state::{Direction, PlaybackState};

/// Everything a host renders the player with.
#[derive(Clone, Debug)]
pub struct PlayerProps<P> {
    pub payload: P,
    pub options: AttachOptions,
    /// Overrides `options.looping` when set.
    pub looping: Option<LoopSetting>,
    /// Overrides `options.autoplay` when set.
    pub autoplay: Option<bool>,
    pub is_playing: bool,
    pub is_paused: bool,
    /// When set, wins over the playing/paused flags.
    pub current_frame: Option<f64>,
    pub speed: Option<f64>,
    pub direction: Option<Direction>,
}

impl<P> PlayerProps<P> {
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            options: AttachOptions::default(),
            looping: None,
            autoplay: None,
            is_playing: false,
            is_paused: false,
            current_frame: None,
            speed: None,
            direction: None,
        }
    }

    #[inline]
    pub fn effective_loop(&self) -> LoopSetting {
        self.looping.unwrap_or(self.options.looping)
    }

    #[inline]
    pub fn effective_autoplay(&self) -> bool {
        self.autoplay.unwrap_or(self.options.autoplay)
    }

    /// `options` with the prop-level loop/autoplay folded in.
    pub fn effective_options(&self) -> AttachOptions {
        AttachOptions {
            looping: self.effective_loop(),
            autoplay: self.effective_autoplay(),
            ..self.options.clone()
        }
    }

    fn playback_changed(&self, prev: &Self) -> bool {
        self.current_frame != prev.current_frame
            || self.is_playing != prev.is_playing
            || self.is_paused != prev.is_paused
    }
}

/// Keeps an [`Adapter`] in line with the latest [`PlayerProps`].
pub struct Controller<E: PlayerEngine> {
    adapter: Adapter<E>,
    last: Option<PlayerProps<E::Payload>>,
}

impl<E: PlayerEngine> Controller<E> {
    pub fn new(engine: E) -> Self {
        Self {
            adapter: Adapter::new(engine),
            last: None,
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.adapter.state()
    }

    #[inline]
    pub fn adapter(&self) -> &Adapter<E> {
        &self.adapter
    }

    #[inline]
    pub fn adapter_mut(&mut self) -> &mut Adapter<E> {
        &mut self.adapter
    }

    pub fn set_observer(&mut self, observer: Option<StateObserver>) {
        self.adapter.set_observer(observer);
    }

    /// Reconcile against the previous props. A new payload identity replaces
    /// the engine instance; everything else is applied to the live one.
    /// On attach failure the props are not remembered, so the next call retries.
    pub fn update(
        &mut self,
        target: &E::Target,
        props: PlayerProps<E::Payload>,
    ) -> Result<(), E::Error> {
        let prev = match self.last.take() {
            Some(prev)
                if self.adapter.is_attached() && prev.payload.same_payload(&props.payload) =>
            {
                Some(prev)
            }
            _ => None,
        };

        match &prev {
            None => {
                self.adapter
                    .attach(target, props.payload.clone(), &props.effective_options())?;
            }
            Some(prev) => {
                if props.effective_loop() != prev.effective_loop() {
                    self.adapter.set_loop(props.effective_loop());
                }
                if props.effective_autoplay() != prev.effective_autoplay() {
                    self.adapter.set_autoplay(props.effective_autoplay());
                }
            }
        }

        if let Some(speed) = props.speed {
            if prev.as_ref().map_or(true, |p| p.speed != props.speed) {
                self.adapter.set_speed(speed);
            }
        }
        if let Some(direction) = props.direction {
            if prev.as_ref().map_or(true, |p| p.direction != props.direction) {
                self.adapter.set_direction(direction);
            }
        }

        if prev.as_ref().map_or(true, |p| props.playback_changed(p)) {
            match props.current_frame {
                Some(frame) => self.adapter.seek_to_frame(frame),
                None if props.is_paused => self.adapter.pause(),
                None if props.is_playing => self.adapter.play(),
                None => self.adapter.stop(),
            }
        }

        self.last = Some(props);
        Ok(())
    }

    /// Tear down the instance and forget the props.
    pub fn unmount(&mut self) {
        self.last = None;
        self.adapter.detach();
    }
}
