//! Contract of the external player engine.
//!
//! The adapter never renders or times frames itself. It drives an engine
//! through [`PlayerEngine`] / [`EngineInstance`] and listens to the lifecycle
//! events the instance emits.

use std::rc::Rc;

use crate::config::{LoopSetting, Renderer, RendererSettings, Segment};
use crate::ids::ListenerId;
use crate::payload::PayloadIdentity;
use crate::state::Direction;

/// Lifecycle events the adapter subscribes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    EnterFrame,
    LoopComplete,
    Complete,
    SegmentStart,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::EnterFrame,
        EventKind::LoopComplete,
        EventKind::Complete,
        EventKind::SegmentStart,
    ];

    /// Event name as the engine spells it.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnterFrame => "enterFrame",
            Self::LoopComplete => "loopComplete",
            Self::Complete => "complete",
            Self::SegmentStart => "segmentStart",
        }
    }
}

/// Event payloads as reported by the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// `current_time` and `total_time` are in frames.
    EnterFrame {
        current_time: f64,
        total_time: f64,
        direction: Direction,
    },
    LoopComplete {
        current_loop: u32,
        direction: Direction,
    },
    Complete {
        direction: Direction,
    },
    SegmentStart {
        first_frame: f64,
        total_frames: f64,
    },
}

impl EngineEvent {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::EnterFrame { .. } => EventKind::EnterFrame,
            Self::LoopComplete { .. } => EventKind::LoopComplete,
            Self::Complete { .. } => EventKind::Complete,
            Self::SegmentStart { .. } => EventKind::SegmentStart,
        }
    }
}

/// Read-only view of an instance, handed to listeners alongside each event.
pub trait InstanceProbe {
    /// Seconds.
    fn duration(&self) -> f64;
    /// Fractional frame position.
    fn current_frame(&self) -> f64;
    fn play_direction(&self) -> Direction;
    fn frame_rate(&self) -> f64;
    fn total_frames(&self) -> f64;
    fn play_speed(&self) -> f64;
}

/// Event callback. Engines may invoke it from inside any instance call
/// (a seek usually renders a frame synchronously) or later from their own
/// timer, always on the owning thread.
pub type Listener = Rc<dyn Fn(&EngineEvent, &dyn InstanceProbe)>;

/// One loaded animation bound to one render target.
pub trait EngineInstance: InstanceProbe {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_speed(&mut self, speed: f64);
    fn set_direction(&mut self, direction: Direction);
    fn set_subframe(&mut self, enabled: bool);
    fn set_loop(&mut self, looping: LoopSetting);
    fn set_autoplay(&mut self, autoplay: bool);
    /// Jump to `frame`; keep playing afterwards when `resume` is set.
    fn seek_frame(&mut self, frame: f64, resume: bool);
    /// Jump to `millis`; keep playing afterwards when `resume` is set.
    fn seek_time(&mut self, millis: f64, resume: bool);
    fn play_segments(&mut self, segments: &[Segment], force: bool);
    /// Release the instance and everything it rendered.
    fn dispose(&mut self);

    fn add_event_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId;
    fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId);
}

/// Everything the engine needs to construct an instance.
#[derive(Debug)]
pub struct LoadRequest<'a, T, P> {
    pub target: &'a T,
    pub payload: &'a P,
    pub renderer: Renderer,
    pub looping: LoopSetting,
    pub autoplay: bool,
    pub renderer_settings: &'a RendererSettings,
}

/// Factory for engine instances.
pub trait PlayerEngine {
    /// Render surface handle (DOM element, canvas, offscreen surface...).
    type Target;
    type Payload: PayloadIdentity + Clone;
    type Instance: EngineInstance;
    type Error: std::error::Error;

    fn load(
        &mut self,
        request: LoadRequest<'_, Self::Target, Self::Payload>,
    ) -> Result<Self::Instance, Self::Error>;
}
