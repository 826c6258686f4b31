//! Adapter: owns one engine instance and mirrors it into [`PlaybackState`].
//!
//! Methods:
//! - attach / detach (dispose-then-create, idempotent teardown)
//! - play, pause, stop, seek_to_frame, seek_to_time, set_speed, set_direction
//! - set_loop, set_autoplay (live option changes, no re-attach)
//!
//! State is shared with the engine listeners through `Rc<RefCell<_>>`. The
//! adapter never keeps that borrow alive across an engine call, because engines
//! are allowed to fire events synchronously from inside `play`, `seek_*`, etc.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

use crate::config::{AttachOptions, LoopSetting};
use crate::engine::{
    EngineEvent, EngineInstance, EventKind, InstanceProbe, Listener, LoadRequest, PlayerEngine,
};
use crate::ids::{AttachId, IdAllocator, ListenerId};
use crate::state::{frame_index, seconds, Direction, PlaybackMode, PlaybackState};

/// Called with the new snapshot after every state change.
pub type StateObserver = Rc<dyn Fn(&PlaybackState)>;

#[derive(Default)]
struct Shared {
    state: PlaybackState,
    /// Attachment whose listeners are allowed to write.
    live: Option<AttachId>,
    revision: u64,
    observer: Option<StateObserver>,
}

/// Apply `f` to the shared state; bump the revision and notify the observer
/// (after releasing the borrow) if anything changed.
fn update_state(shared: &RefCell<Shared>, f: impl FnOnce(&mut PlaybackState)) {
    let (snapshot, observer) = {
        let mut s = shared.borrow_mut();
        let before = s.state;
        f(&mut s.state);
        if s.state == before {
            return;
        }
        s.revision = s.revision.wrapping_add(1);
        (s.state, s.observer.clone())
    };
    if let Some(observer) = observer {
        observer(&snapshot);
    }
}

fn on_enter_frame(shared: &RefCell<Shared>, current_time: f64, probe: &dyn InstanceProbe) {
    let frame_rate = probe.frame_rate();
    let current_frame = frame_index(probe.current_frame());
    let direction = probe.play_direction();
    let current_time = if frame_rate > 0.0 {
        seconds(current_time / frame_rate)
    } else {
        0.0
    };
    update_state(shared, |s| {
        s.current_frame = current_frame;
        s.direction = direction;
        s.current_time = current_time;
    });
}

fn on_loop_complete(shared: &RefCell<Shared>, current_loop: u32, direction: Direction) {
    update_state(shared, |s| {
        s.current_loop = current_loop;
        s.direction = direction;
    });
}

/// Natural end of a non-looping run. The engine holds the last frame, so the
/// animation is reported as paused there rather than stopped (which would
/// imply a rewind).
fn on_complete(shared: &RefCell<Shared>, direction: Direction, probe: &dyn InstanceProbe) {
    let duration = seconds(probe.duration());
    update_state(shared, |s| {
        s.direction = direction;
        s.current_time = duration;
        s.mode = PlaybackMode::Paused;
    });
}

fn on_segment_start(shared: &RefCell<Shared>, probe: &dyn InstanceProbe) {
    let duration = seconds(probe.duration());
    update_state(shared, |s| {
        s.current_time = duration;
    });
}

/// Build the listener registered for every event kind of attachment `id`.
fn event_listener(shared: Weak<RefCell<Shared>>, id: AttachId) -> Listener {
    Rc::new(move |event: &EngineEvent, probe: &dyn InstanceProbe| {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        if shared.borrow().live != Some(id) {
            trace!("dropping stale {} event for {:?}", event.kind().name(), id);
            return;
        }
        match *event {
            EngineEvent::EnterFrame { current_time, .. } => {
                on_enter_frame(&shared, current_time, probe)
            }
            EngineEvent::LoopComplete {
                current_loop,
                direction,
            } => on_loop_complete(&shared, current_loop, direction),
            EngineEvent::Complete { direction } => on_complete(&shared, direction, probe),
            EngineEvent::SegmentStart { .. } => on_segment_start(&shared, probe),
        }
    })
}

/// The live engine instance plus the subscriptions registered on it.
struct Attachment<I, P> {
    id: AttachId,
    instance: I,
    payload: P,
    listeners: Vec<(EventKind, ListenerId)>,
}

/// Binds one payload to one render target at a time.
pub struct Adapter<E: PlayerEngine> {
    engine: E,
    slot: Option<Attachment<E::Instance, E::Payload>>,
    shared: Rc<RefCell<Shared>>,
    ids: IdAllocator,
}

impl<E: PlayerEngine> Adapter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            slot: None,
            shared: Rc::new(RefCell::new(Shared::default())),
            ids: IdAllocator::new(),
        }
    }

    /// Current snapshot.
    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.shared.borrow().state
    }

    /// Incremented on every state change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.shared.borrow().revision
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.slot.is_some()
    }

    /// Id of the live attachment, if any.
    #[inline]
    pub fn current(&self) -> Option<AttachId> {
        self.slot.as_ref().map(|a| a.id)
    }

    /// Payload of the live attachment, if any.
    #[inline]
    pub fn attached_payload(&self) -> Option<&E::Payload> {
        self.slot.as_ref().map(|a| &a.payload)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn set_observer(&mut self, observer: Option<StateObserver>) {
        self.shared.borrow_mut().observer = observer;
    }

    /// Create an engine instance for `payload` on `target`, replacing any
    /// instance that is already attached. Engine errors are returned as-is;
    /// the previous instance is gone either way.
    pub fn attach(
        &mut self,
        target: &E::Target,
        payload: E::Payload,
        options: &AttachOptions,
    ) -> Result<AttachId, E::Error> {
        self.detach();

        let mut instance = self.engine.load(LoadRequest {
            target,
            payload: &payload,
            renderer: options.renderer,
            looping: options.looping,
            autoplay: options.autoplay,
            renderer_settings: &options.renderer_settings,
        })?;

        let id = self.ids.alloc_attach();
        let initial = PlaybackState {
            duration: seconds(instance.duration()),
            total_frames: frame_index(instance.total_frames()),
            play_speed: instance.play_speed(),
            is_loaded: true,
            mode: if options.autoplay {
                PlaybackMode::Playing
            } else {
                PlaybackMode::Stopped
            },
            ..PlaybackState::default()
        };
        self.shared.borrow_mut().live = Some(id);
        update_state(&self.shared, |s| *s = initial);

        let listener = event_listener(Rc::downgrade(&self.shared), id);
        let listeners = EventKind::ALL
            .iter()
            .map(|&kind| (kind, instance.add_event_listener(kind, listener.clone())))
            .collect();

        instance.set_subframe(options.subframe);
        if !options.segments.is_empty() {
            // Forced segments start playback even without autoplay.
            instance.play_segments(&options.segments, true);
            update_state(&self.shared, |s| s.mode = PlaybackMode::Playing);
        }

        debug!(
            "attach: {:?} ({} frames, {:.3}s, renderer={})",
            id,
            initial.total_frames,
            initial.duration,
            options.renderer.name()
        );
        self.slot = Some(Attachment {
            id,
            instance,
            payload,
            listeners,
        });
        Ok(id)
    }

    /// Unsubscribe, dispose and reset. Does nothing when nothing is attached.
    pub fn detach(&mut self) {
        let Some(mut attachment) = self.slot.take() else {
            return;
        };
        self.shared.borrow_mut().live = None;
        for (kind, listener) in attachment.listeners.drain(..) {
            attachment.instance.remove_event_listener(kind, listener);
        }
        attachment.instance.dispose();
        update_state(&self.shared, PlaybackState::reset);
        debug!("detach: {:?}", attachment.id);
    }

    #[inline]
    fn instance_mut(&mut self) -> Option<&mut E::Instance> {
        self.slot.as_mut().map(|a| &mut a.instance)
    }

    fn set_mode(&self, mode: PlaybackMode) {
        update_state(&self.shared, |s| s.mode = mode);
    }

    pub fn play(&mut self) {
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.play();
        self.set_mode(PlaybackMode::Playing);
    }

    pub fn pause(&mut self) {
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.pause();
        self.set_mode(PlaybackMode::Paused);
    }

    pub fn stop(&mut self) {
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.stop();
        self.set_mode(PlaybackMode::Stopped);
    }

    /// Jump to `frame`. Playing animations keep playing from there; paused or
    /// stopped ones stay put on the new frame.
    pub fn seek_to_frame(&mut self, frame: f64) {
        if !frame.is_finite() {
            warn!("seek_to_frame: ignoring non-finite frame {frame}");
            return;
        }
        let resume = self.state().is_playing();
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.seek_frame(frame, resume);
        let current_frame = frame_index(instance.current_frame());
        let frame_rate = instance.frame_rate();
        update_state(&self.shared, |s| {
            s.current_frame = current_frame;
            if frame_rate > 0.0 {
                s.current_time = seconds(current_frame as f64 / frame_rate);
            }
        });
    }

    /// Jump to `secs` seconds; same resume rule as [`Adapter::seek_to_frame`].
    /// `current_time` follows the engine's landing position, so seeks past
    /// the end report at most `duration`.
    pub fn seek_to_time(&mut self, secs: f64) {
        if !secs.is_finite() {
            warn!("seek_to_time: ignoring non-finite time {secs}");
            return;
        }
        let resume = self.state().is_playing();
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.seek_time(secs * 1000.0, resume);
        // The engine clamps out-of-range seeks; report where it actually landed.
        let position = instance.current_frame();
        let current_frame = frame_index(position);
        let frame_rate = instance.frame_rate();
        let duration = seconds(instance.duration());
        update_state(&self.shared, |s| {
            s.current_frame = current_frame;
            if frame_rate > 0.0 {
                s.current_time = seconds(position / frame_rate).min(duration);
            }
        });
    }

    /// Forward a speed multiplier; the state records whatever the engine
    /// settled on, which may be clamped.
    pub fn set_speed(&mut self, multiplier: f64) {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            warn!("set_speed: ignoring non-positive multiplier {multiplier}");
            return;
        }
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.set_speed(multiplier);
        let effective = instance.play_speed();
        update_state(&self.shared, |s| s.play_speed = effective);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        let Some(instance) = self.instance_mut() else {
            return;
        };
        instance.set_direction(direction);
        let effective = instance.play_direction();
        update_state(&self.shared, |s| s.direction = effective);
    }

    pub fn set_loop(&mut self, looping: LoopSetting) {
        if let Some(instance) = self.instance_mut() {
            instance.set_loop(looping);
        }
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        if let Some(instance) = self.instance_mut() {
            instance.set_autoplay(autoplay);
        }
    }
}

impl<E: PlayerEngine> Drop for Adapter<E> {
    fn drop(&mut self) {
        self.detach();
    }
}
