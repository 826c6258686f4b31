//! lottie-web as a [`PlayerEngine`].
//!
//! The host hands over its `lottie` module object; instances are created with
//! `lottie.loadAnimation(params)` and driven through the `AnimationItem` API.

use std::collections::HashMap;

use js_sys::{Array, Function, Object, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use vizij_lottie_core::{
    Direction, EngineError, EngineEvent, EngineInstance, EventKind, IdAllocator, InstanceProbe,
    Listener, ListenerId, LoadRequest, LoopSetting, PayloadIdentity, PlayerEngine, Segment,
};

#[wasm_bindgen]
extern "C" {
    /// The `lottie` default export.
    #[derive(Clone, Debug)]
    pub type LottieModule;

    #[wasm_bindgen(method, catch, js_name = loadAnimation)]
    fn load_animation(this: &LottieModule, params: &JsValue) -> Result<AnimationItem, JsValue>;

    /// A loaded lottie-web animation.
    #[derive(Clone, Debug)]
    pub type AnimationItem;

    #[wasm_bindgen(method)]
    fn play(this: &AnimationItem);

    #[wasm_bindgen(method)]
    fn pause(this: &AnimationItem);

    #[wasm_bindgen(method)]
    fn stop(this: &AnimationItem);

    #[wasm_bindgen(method)]
    fn destroy(this: &AnimationItem);

    #[wasm_bindgen(method, js_name = setSpeed)]
    fn set_speed(this: &AnimationItem, speed: f64);

    #[wasm_bindgen(method, js_name = setDirection)]
    fn set_direction(this: &AnimationItem, direction: f64);

    #[wasm_bindgen(method, js_name = setSubframe)]
    fn set_subframe(this: &AnimationItem, flag: bool);

    #[wasm_bindgen(method, js_name = goToAndPlay)]
    fn go_to_and_play(this: &AnimationItem, value: f64, is_frame: bool);

    #[wasm_bindgen(method, js_name = goToAndStop)]
    fn go_to_and_stop(this: &AnimationItem, value: f64, is_frame: bool);

    #[wasm_bindgen(method, js_name = playSegments)]
    fn play_segments(this: &AnimationItem, segments: &JsValue, force: bool);

    #[wasm_bindgen(method, js_name = getDuration)]
    fn get_duration(this: &AnimationItem, in_frames: bool) -> Option<f64>;

    #[wasm_bindgen(method, getter, js_name = currentFrame)]
    fn current_frame(this: &AnimationItem) -> Option<f64>;

    #[wasm_bindgen(method, getter, js_name = playDirection)]
    fn play_direction(this: &AnimationItem) -> Option<f64>;

    #[wasm_bindgen(method, getter, js_name = frameRate)]
    fn frame_rate(this: &AnimationItem) -> Option<f64>;

    #[wasm_bindgen(method, getter, js_name = totalFrames)]
    fn total_frames(this: &AnimationItem) -> Option<f64>;

    #[wasm_bindgen(method, getter, js_name = playSpeed)]
    fn play_speed(this: &AnimationItem) -> Option<f64>;

    #[wasm_bindgen(method, js_name = addEventListener)]
    fn add_event_listener(this: &AnimationItem, name: &str, callback: &Function);

    #[wasm_bindgen(method, js_name = removeEventListener)]
    fn remove_event_listener(this: &AnimationItem, name: &str, callback: &Function);
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), EngineError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| EngineError::new(format!("failed to set '{key}': {}", describe(&e))))
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, EngineError> {
    swb::to_value(value).map_err(|e| EngineError::Serialization {
        reason: e.to_string(),
    })
}

fn number(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
}

/// Turn a raw lottie event object into an [`EngineEvent`].
fn decode_event(kind: EventKind, raw: &JsValue) -> EngineEvent {
    let direction = Direction::from_sign(number(raw, "direction").unwrap_or(1.0));
    match kind {
        EventKind::EnterFrame => EngineEvent::EnterFrame {
            current_time: number(raw, "currentTime").unwrap_or(0.0),
            total_time: number(raw, "totalTime").unwrap_or(0.0),
            direction,
        },
        EventKind::LoopComplete => EngineEvent::LoopComplete {
            current_loop: number(raw, "currentLoop").map_or(0, |v| v.max(0.0) as u32),
            direction,
        },
        EventKind::Complete => EngineEvent::Complete { direction },
        EventKind::SegmentStart => EngineEvent::SegmentStart {
            first_frame: number(raw, "firstFrame").unwrap_or(0.0),
            total_frames: number(raw, "totalFrames").unwrap_or(0.0),
        },
    }
}

/// Animation document as a JS value. Identity is JS object identity.
#[derive(Clone, Debug)]
pub struct JsPayload(pub JsValue);

impl PayloadIdentity for JsPayload {
    fn same_payload(&self, other: &Self) -> bool {
        Object::is(&self.0, &other.0)
    }
}

impl InstanceProbe for AnimationItem {
    fn duration(&self) -> f64 {
        self.get_duration(false).unwrap_or(0.0)
    }
    fn current_frame(&self) -> f64 {
        AnimationItem::current_frame(self).unwrap_or(0.0)
    }
    fn play_direction(&self) -> Direction {
        Direction::from_sign(AnimationItem::play_direction(self).unwrap_or(1.0))
    }
    fn frame_rate(&self) -> f64 {
        AnimationItem::frame_rate(self).unwrap_or(0.0)
    }
    fn total_frames(&self) -> f64 {
        AnimationItem::total_frames(self).unwrap_or(0.0)
    }
    fn play_speed(&self) -> f64 {
        AnimationItem::play_speed(self).unwrap_or(1.0)
    }
}

/// One `AnimationItem` plus the JS closures registered on it.
pub struct LottieInstance {
    item: AnimationItem,
    ids: IdAllocator,
    listeners: HashMap<ListenerId, (EventKind, Closure<dyn FnMut(JsValue)>)>,
}

impl InstanceProbe for LottieInstance {
    fn duration(&self) -> f64 {
        self.item.duration()
    }
    fn current_frame(&self) -> f64 {
        InstanceProbe::current_frame(&self.item)
    }
    fn play_direction(&self) -> Direction {
        InstanceProbe::play_direction(&self.item)
    }
    fn frame_rate(&self) -> f64 {
        InstanceProbe::frame_rate(&self.item)
    }
    fn total_frames(&self) -> f64 {
        InstanceProbe::total_frames(&self.item)
    }
    fn play_speed(&self) -> f64 {
        InstanceProbe::play_speed(&self.item)
    }
}

impl EngineInstance for LottieInstance {
    fn play(&mut self) {
        self.item.play();
    }

    fn pause(&mut self) {
        self.item.pause();
    }

    fn stop(&mut self) {
        self.item.stop();
    }

    fn set_speed(&mut self, speed: f64) {
        AnimationItem::set_speed(&self.item, speed);
    }

    fn set_direction(&mut self, direction: Direction) {
        AnimationItem::set_direction(&self.item, f64::from(direction.sign()));
    }

    fn set_subframe(&mut self, enabled: bool) {
        AnimationItem::set_subframe(&self.item, enabled);
    }

    fn set_loop(&mut self, looping: LoopSetting) {
        let value = match looping {
            LoopSetting::Flag(flag) => JsValue::from_bool(flag),
            LoopSetting::Count(count) => JsValue::from_f64(f64::from(count)),
        };
        if let Err(e) = Reflect::set(&self.item, &JsValue::from_str("loop"), &value) {
            log::warn!("set_loop failed: {}", describe(&e));
        }
    }

    fn set_autoplay(&mut self, autoplay: bool) {
        let value = JsValue::from_bool(autoplay);
        if let Err(e) = Reflect::set(&self.item, &JsValue::from_str("autoplay"), &value) {
            log::warn!("set_autoplay failed: {}", describe(&e));
        }
    }

    fn seek_frame(&mut self, frame: f64, resume: bool) {
        if resume {
            self.item.go_to_and_play(frame, true);
        } else {
            self.item.go_to_and_stop(frame, true);
        }
    }

    fn seek_time(&mut self, millis: f64, resume: bool) {
        if resume {
            self.item.go_to_and_play(millis, false);
        } else {
            self.item.go_to_and_stop(millis, false);
        }
    }

    fn play_segments(&mut self, segments: &[Segment], force: bool) {
        let list: Array = segments
            .iter()
            .map(|s| {
                let pair = Array::new();
                pair.push(&JsValue::from_f64(s.0));
                pair.push(&JsValue::from_f64(s.1));
                JsValue::from(pair)
            })
            .collect();
        AnimationItem::play_segments(&self.item, &list, force);
    }

    fn dispose(&mut self) {
        for (_, (kind, closure)) in self.listeners.drain() {
            self.item
                .remove_event_listener(kind.name(), closure.as_ref().unchecked_ref());
        }
        self.item.destroy();
    }

    fn add_event_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = self.ids.alloc_listener();
        let probe = self.item.clone();
        let closure = Closure::wrap(Box::new(move |raw: JsValue| {
            let event = decode_event(kind, &raw);
            listener(&event, &probe);
        }) as Box<dyn FnMut(JsValue)>);
        self.item
            .add_event_listener(kind.name(), closure.as_ref().unchecked_ref());
        self.listeners.insert(id, (kind, closure));
        id
    }

    fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId) {
        if let Some((registered, closure)) = self.listeners.remove(&id) {
            debug_assert_eq!(registered, kind);
            self.item
                .remove_event_listener(registered.name(), closure.as_ref().unchecked_ref());
        }
    }
}

/// Loads animations through a host-supplied lottie-web module.
pub struct LottieWebEngine {
    module: LottieModule,
}

impl LottieWebEngine {
    pub fn new(module: LottieModule) -> Self {
        Self { module }
    }
}

impl PlayerEngine for LottieWebEngine {
    type Target = web_sys::Element;
    type Payload = JsPayload;
    type Instance = LottieInstance;
    type Error = EngineError;

    fn load(
        &mut self,
        request: LoadRequest<'_, web_sys::Element, JsPayload>,
    ) -> Result<LottieInstance, EngineError> {
        if jsvalue_is_undefined_or_null(&request.payload.0) {
            return Err(EngineError::InvalidPayload {
                reason: "animationData is null/undefined".to_string(),
            });
        }
        if !request.target.is_connected() {
            return Err(EngineError::MissingTarget {
                reason: "container is not attached to the document".to_string(),
            });
        }

        let params = Object::new();
        set(&params, "container", &JsValue::from(request.target.clone()))?;
        set(&params, "renderer", &JsValue::from_str(request.renderer.name()))?;
        set(&params, "loop", &to_js(&request.looping)?)?;
        set(&params, "autoplay", &JsValue::from_bool(request.autoplay))?;
        set(&params, "animationData", &request.payload.0)?;
        set(
            &params,
            "rendererSettings",
            &to_js(request.renderer_settings)?,
        )?;

        let item = self
            .module
            .load_animation(&params)
            .map_err(|e| EngineError::InvalidPayload {
                reason: describe(&e),
            })?;
        Ok(LottieInstance {
            item,
            ids: IdAllocator::new(),
            listeners: HashMap::new(),
        })
    }
}
