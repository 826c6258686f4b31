#![allow(dead_code)]
//! In-memory engine that behaves like lottie-web closely enough for adapter tests:
//! seeks render (and emit `enterFrame`) synchronously, speed is clamped,
//! `stop` rewinds to the first frame.

use std::cell::RefCell;
use std::rc::Rc;

use vizij_lottie_core::{
    AnimationPayload, Direction, EngineError, EngineEvent, EngineInstance, EventKind,
    IdAllocator, InstanceProbe, Listener, ListenerId, LoadRequest, LoopSetting, PayloadHeader,
    PlayerEngine, Renderer, Segment,
};
use vizij_test_fixtures::animations;

/// Stand-in render surface.
#[derive(Clone, Debug)]
pub struct MountPoint {
    pub mounted: bool,
}

impl MountPoint {
    pub fn mounted() -> Self {
        Self { mounted: true }
    }
}

pub fn payload(name: &str) -> AnimationPayload {
    let json = animations::json(name).expect("fixture");
    AnimationPayload::from_json_str(&json).expect("fixture parses")
}

/// Mutable state of one scripted instance.
pub struct InstanceCore {
    pub header: PayloadHeader,
    pub renderer: Renderer,
    pub frame: f64,
    pub direction: Direction,
    pub speed: f64,
    pub playing: bool,
    pub looping: LoopSetting,
    pub autoplay: bool,
    pub subframe: bool,
    pub disposed: bool,
    pub listeners: Vec<(ListenerId, EventKind, Listener)>,
    pub calls: Vec<String>,
}

/// Copy of an instance's readable fields, handed to listeners.
#[derive(Clone, Copy, Debug)]
pub struct ProbeSnapshot {
    duration: f64,
    frame: f64,
    direction: Direction,
    frame_rate: f64,
    total_frames: f64,
    speed: f64,
}

impl InstanceProbe for ProbeSnapshot {
    fn duration(&self) -> f64 {
        self.duration
    }
    fn current_frame(&self) -> f64 {
        self.frame
    }
    fn play_direction(&self) -> Direction {
        self.direction
    }
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
    fn total_frames(&self) -> f64 {
        self.total_frames
    }
    fn play_speed(&self) -> f64 {
        self.speed
    }
}

impl InstanceCore {
    fn probe(&self) -> ProbeSnapshot {
        ProbeSnapshot {
            duration: self.header.duration(),
            frame: self.frame,
            direction: self.direction,
            frame_rate: self.header.frame_rate,
            total_frames: self.header.total_frames(),
            speed: self.speed,
        }
    }
}

/// Deliver `event` to the listeners currently registered on `core`.
fn dispatch(core: &RefCell<InstanceCore>, event: &EngineEvent) {
    let (listeners, probe) = {
        let c = core.borrow();
        let listeners: Vec<Listener> = c
            .listeners
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind())
            .map(|(_, _, l)| l.clone())
            .collect();
        (listeners, c.probe())
    };
    for listener in listeners {
        listener(event, &probe);
    }
}

#[derive(Default)]
pub struct EngineLog {
    pub loads: usize,
    pub instances: Vec<Rc<RefCell<InstanceCore>>>,
    /// Every listener ever registered, kept alive to replay in-flight callbacks.
    pub every_listener: Vec<(EventKind, Listener)>,
}

/// Test-side view of everything the engine created.
#[derive(Clone, Default)]
pub struct EngineHandle(Rc<RefCell<EngineLog>>);

impl EngineHandle {
    pub fn loads(&self) -> usize {
        self.0.borrow().loads
    }

    pub fn live_instances(&self) -> usize {
        self.0
            .borrow()
            .instances
            .iter()
            .filter(|c| !c.borrow().disposed)
            .count()
    }

    /// Subscriptions still registered across all instances, disposed or not.
    pub fn registered_listeners(&self) -> usize {
        self.0
            .borrow()
            .instances
            .iter()
            .map(|c| c.borrow().listeners.len())
            .sum()
    }

    pub fn instance(&self, index: usize) -> Rc<RefCell<InstanceCore>> {
        self.0.borrow().instances[index].clone()
    }

    pub fn latest(&self) -> Rc<RefCell<InstanceCore>> {
        self.0
            .borrow()
            .instances
            .last()
            .cloned()
            .expect("no instance loaded")
    }

    pub fn calls(&self) -> Vec<String> {
        self.latest().borrow().calls.clone()
    }

    /// Emit on the most recent instance.
    pub fn emit(&self, event: EngineEvent) {
        let core = self.latest();
        dispatch(&core, &event);
    }

    /// Move the latest instance's playhead, then emit `enterFrame` for it.
    pub fn tick_to(&self, frame: f64) {
        let core = self.latest();
        let direction = {
            let mut c = core.borrow_mut();
            c.frame = frame;
            c.direction
        };
        let total_time = core.borrow().header.total_frames();
        dispatch(
            &core,
            &EngineEvent::EnterFrame {
                current_time: frame,
                total_time,
                direction,
            },
        );
    }

    /// Run the latest instance to its natural end.
    pub fn finish(&self) {
        let core = self.latest();
        let direction = {
            let mut c = core.borrow_mut();
            c.playing = false;
            c.frame = c.header.total_frames();
            c.direction
        };
        dispatch(&core, &EngineEvent::Complete { direction });
    }

    /// Fire `event` at every listener ever registered, as if notifications
    /// queued before a teardown were still being delivered.
    pub fn replay_everywhere(&self, event: EngineEvent, probe_from: usize) {
        let probe = self.instance(probe_from).borrow().probe();
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .every_listener
            .iter()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&event, &probe);
        }
    }
}

pub struct ScriptedEngine {
    pub handle: EngineHandle,
    /// Engine-side clamp applied by `set_speed`.
    pub max_speed: f64,
}

impl ScriptedEngine {
    pub fn new() -> (Self, EngineHandle) {
        let handle = EngineHandle::default();
        (
            Self {
                handle: handle.clone(),
                max_speed: 4.0,
            },
            handle,
        )
    }
}

pub struct ScriptedInstance {
    core: Rc<RefCell<InstanceCore>>,
    log: EngineHandle,
    ids: IdAllocator,
    max_speed: f64,
}

impl ScriptedInstance {
    fn record(&self, call: String) {
        self.core.borrow_mut().calls.push(call);
    }

    fn land(&mut self, frame: f64, resume: bool) {
        let (direction, total_time) = {
            let mut c = self.core.borrow_mut();
            c.frame = frame.clamp(0.0, c.header.total_frames());
            c.playing = resume;
            (c.direction, c.header.total_frames())
        };
        let current_time = self.core.borrow().frame;
        dispatch(
            &self.core,
            &EngineEvent::EnterFrame {
                current_time,
                total_time,
                direction,
            },
        );
    }
}

impl InstanceProbe for ScriptedInstance {
    fn duration(&self) -> f64 {
        self.core.borrow().header.duration()
    }
    fn current_frame(&self) -> f64 {
        self.core.borrow().frame
    }
    fn play_direction(&self) -> Direction {
        self.core.borrow().direction
    }
    fn frame_rate(&self) -> f64 {
        self.core.borrow().header.frame_rate
    }
    fn total_frames(&self) -> f64 {
        self.core.borrow().header.total_frames()
    }
    fn play_speed(&self) -> f64 {
        self.core.borrow().speed
    }
}

impl EngineInstance for ScriptedInstance {
    fn play(&mut self) {
        self.record("play".into());
        self.core.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.record("pause".into());
        self.core.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        self.record("stop".into());
        let mut c = self.core.borrow_mut();
        c.playing = false;
        c.frame = 0.0;
    }

    fn set_speed(&mut self, speed: f64) {
        self.record(format!("set_speed {speed}"));
        self.core.borrow_mut().speed = speed.min(self.max_speed);
    }

    fn set_direction(&mut self, direction: Direction) {
        self.record(format!("set_direction {}", direction.sign()));
        self.core.borrow_mut().direction = direction;
    }

    fn set_subframe(&mut self, enabled: bool) {
        self.record(format!("set_subframe {enabled}"));
        self.core.borrow_mut().subframe = enabled;
    }

    fn set_loop(&mut self, looping: LoopSetting) {
        self.record(format!("set_loop {looping:?}"));
        self.core.borrow_mut().looping = looping;
    }

    fn set_autoplay(&mut self, autoplay: bool) {
        self.record(format!("set_autoplay {autoplay}"));
        self.core.borrow_mut().autoplay = autoplay;
    }

    fn seek_frame(&mut self, frame: f64, resume: bool) {
        self.record(format!("seek_frame {frame} {resume}"));
        self.land(frame, resume);
    }

    fn seek_time(&mut self, millis: f64, resume: bool) {
        self.record(format!("seek_time {millis} {resume}"));
        let frame = millis / 1000.0 * self.core.borrow().header.frame_rate;
        self.land(frame, resume);
    }

    fn play_segments(&mut self, segments: &[Segment], force: bool) {
        self.record(format!("play_segments {} {force}", segments.len()));
        if let Some(first) = segments.first() {
            let total_frames = {
                let mut c = self.core.borrow_mut();
                c.frame = 0.0;
                c.playing = true;
                first.1 - first.0
            };
            dispatch(
                &self.core,
                &EngineEvent::SegmentStart {
                    first_frame: first.0,
                    total_frames,
                },
            );
        }
    }

    fn dispose(&mut self) {
        self.record("dispose".into());
        let mut c = self.core.borrow_mut();
        c.disposed = true;
        c.playing = false;
    }

    fn add_event_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = self.ids.alloc_listener();
        self.log
            .0
            .borrow_mut()
            .every_listener
            .push((kind, listener.clone()));
        self.core.borrow_mut().listeners.push((id, kind, listener));
        id
    }

    fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId) {
        self.core
            .borrow_mut()
            .listeners
            .retain(|(lid, k, _)| !(*lid == id && *k == kind));
    }
}

impl PlayerEngine for ScriptedEngine {
    type Target = MountPoint;
    type Payload = AnimationPayload;
    type Instance = ScriptedInstance;
    type Error = EngineError;

    fn load(
        &mut self,
        request: LoadRequest<'_, MountPoint, AnimationPayload>,
    ) -> Result<ScriptedInstance, EngineError> {
        if !request.target.mounted {
            return Err(EngineError::MissingTarget {
                reason: "container is not mounted".to_string(),
            });
        }
        let header = request
            .payload
            .header()
            .map_err(|e| EngineError::InvalidPayload {
                reason: e.to_string(),
            })?;

        let core = Rc::new(RefCell::new(InstanceCore {
            header,
            renderer: request.renderer,
            frame: 0.0,
            direction: Direction::Forward,
            speed: 1.0,
            playing: request.autoplay,
            looping: request.looping,
            autoplay: request.autoplay,
            subframe: false,
            disposed: false,
            listeners: Vec::new(),
            calls: Vec::new(),
        }));
        {
            let mut log = self.handle.0.borrow_mut();
            log.loads += 1;
            log.instances.push(core.clone());
        }
        Ok(ScriptedInstance {
            core,
            log: self.handle.clone(),
            ids: IdAllocator::new(),
            max_speed: self.max_speed,
        })
    }
}
