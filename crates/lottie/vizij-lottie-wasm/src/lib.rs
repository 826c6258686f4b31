//! wasm-bindgen surface for driving lottie-web players from Rust-side state.
//!
//! - `LottiePlayer`: imperative handle (attach, play/pause/stop, seek, speed...)
//! - `LottieComponent`: declarative handle fed with props on every render

use std::rc::Rc;

use js_sys::{Function, Reflect};
use serde::Deserialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use vizij_lottie_core::{
    Adapter, AttachOptions, Controller, Direction, LoopSetting, PlaybackSnapshot, PlaybackState,
    PlayerProps, StateObserver,
};

pub mod engine;

pub use engine::{JsPayload, LottieModule, LottieWebEngine};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn read_options(options: JsValue) -> Result<AttachOptions, JsError> {
    if jsvalue_is_undefined_or_null(&options) {
        Ok(AttachOptions::default())
    } else {
        swb::from_value(options).map_err(|e| JsError::new(&format!("options error: {e}")))
    }
}

fn module_from(lottie: JsValue) -> Result<LottieModule, JsError> {
    if jsvalue_is_undefined_or_null(&lottie) {
        return Err(JsError::new("lottie module is null/undefined"));
    }
    Ok(lottie.unchecked_into())
}

fn snapshot_to_js(state: &PlaybackState) -> Result<JsValue, JsError> {
    swb::to_value(&PlaybackSnapshot::from(*state))
        .map_err(|e| JsError::new(&format!("state error: {e}")))
}

/// Wrap a JS callback as a state observer. Callback failures are reported to
/// the console and otherwise ignored.
fn js_observer(callback: Function) -> StateObserver {
    Rc::new(move |state: &PlaybackState| {
        let arg = match swb::to_value(&PlaybackSnapshot::from(*state)) {
            Ok(v) => v,
            Err(e) => {
                web_sys::console::error_1(&JsValue::from_str(&format!("state error: {e}")));
                return;
            }
        };
        if let Err(e) = callback.call1(&JsValue::UNDEFINED, &arg) {
            web_sys::console::error_1(&e);
        }
    })
}

fn direction_from(sign: i32) -> Result<Direction, JsError> {
    i8::try_from(sign)
        .map_err(|_| JsError::new("direction must be 1 or -1"))
        .and_then(|s| Direction::try_from(s).map_err(|e| JsError::new(&e)))
}

/// Imperative player bound to one container at a time.
#[wasm_bindgen]
pub struct LottiePlayer {
    adapter: Adapter<LottieWebEngine>,
}

#[wasm_bindgen]
impl LottiePlayer {
    /// Create a player around the host's lottie module.
    /// Example:
    ///   import lottie from "lottie-web";
    ///   const player = new LottiePlayer(lottie);
    #[wasm_bindgen(constructor)]
    pub fn new(lottie: JsValue) -> Result<LottiePlayer, JsError> {
        console_error_panic_hook::set_once();
        Ok(LottiePlayer {
            adapter: Adapter::new(LottieWebEngine::new(module_from(lottie)?)),
        })
    }

    /// Load `animation_data` into `container`, replacing any current animation.
    /// `options` is optional JSON matching AttachOptions. Returns the attach id.
    #[wasm_bindgen]
    pub fn attach(
        &mut self,
        container: web_sys::Element,
        animation_data: JsValue,
        options: JsValue,
    ) -> Result<u32, JsError> {
        let opts = read_options(options)?;
        let id = self
            .adapter
            .attach(&container, JsPayload(animation_data), &opts)
            .map_err(|e| JsError::new(&format!("attach error: {e}")))?;
        Ok(id.0)
    }

    #[wasm_bindgen]
    pub fn detach(&mut self) {
        self.adapter.detach();
    }

    #[wasm_bindgen(js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.adapter.is_attached()
    }

    #[wasm_bindgen]
    pub fn play(&mut self) {
        self.adapter.play();
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.adapter.pause();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.adapter.stop();
    }

    #[wasm_bindgen(js_name = setFrame)]
    pub fn set_frame(&mut self, frame: f64) {
        self.adapter.seek_to_frame(frame);
    }

    /// Seek to `seconds`.
    #[wasm_bindgen(js_name = setTime)]
    pub fn set_time(&mut self, seconds: f64) {
        self.adapter.seek_to_time(seconds);
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: f64) {
        self.adapter.set_speed(speed);
    }

    /// `direction` must be 1 or -1.
    #[wasm_bindgen(js_name = setDirection)]
    pub fn set_direction(&mut self, direction: i32) -> Result<(), JsError> {
        self.adapter.set_direction(direction_from(direction)?);
        Ok(())
    }

    /// `true`, `false` or a loop count.
    #[wasm_bindgen(js_name = setLoop)]
    pub fn set_loop(&mut self, looping: JsValue) -> Result<(), JsError> {
        let looping: LoopSetting =
            swb::from_value(looping).map_err(|e| JsError::new(&format!("loop error: {e}")))?;
        self.adapter.set_loop(looping);
        Ok(())
    }

    #[wasm_bindgen(js_name = setAutoplay)]
    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.adapter.set_autoplay(autoplay);
    }

    /// Current PlaybackState as a plain object.
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        snapshot_to_js(&self.adapter.state())
    }

    #[wasm_bindgen]
    pub fn revision(&self) -> f64 {
        self.adapter.revision() as f64
    }

    /// Register `callback(state)` for every state change; pass null/undefined to clear.
    ///
    /// The callback runs synchronously, often while a player method is still
    /// executing (seeks render a frame immediately). It must not call back into
    /// this player: wasm-bindgen rejects the nested call, and the error only
    /// reaches the console. Read the `state` argument instead, and schedule
    /// follow-up control calls (e.g. `queueMicrotask`).
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Option<Function>) {
        self.adapter.set_observer(callback.map(js_observer));
    }
}

/// Props accepted by `LottieComponent.update`, minus the animation data.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PropsInput {
    options: AttachOptions,
    #[serde(rename = "loop")]
    looping: Option<LoopSetting>,
    autoplay: Option<bool>,
    is_playing: bool,
    is_paused: bool,
    current_frame: Option<f64>,
    speed: Option<f64>,
    direction: Option<Direction>,
}

/// Declarative player: call `update` with the latest props on every render.
#[wasm_bindgen]
pub struct LottieComponent {
    controller: Controller<LottieWebEngine>,
}

#[wasm_bindgen]
impl LottieComponent {
    #[wasm_bindgen(constructor)]
    pub fn new(lottie: JsValue) -> Result<LottieComponent, JsError> {
        console_error_panic_hook::set_once();
        Ok(LottieComponent {
            controller: Controller::new(LottieWebEngine::new(module_from(lottie)?)),
        })
    }

    /// `props` shape: `{ options: { animationData, renderer, ... }, loop, autoplay,
    /// isPlaying, isPaused, currentFrame, speed, direction }`.
    /// A new `animationData` object (by identity) reloads the animation.
    #[wasm_bindgen]
    pub fn update(&mut self, container: web_sys::Element, props: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&props) {
            return Err(JsError::new("update: props is null/undefined"));
        }
        let options = Reflect::get(&props, &JsValue::from_str("options"))
            .map_err(|_| JsError::new("update: unreadable props.options"))?;
        let animation_data = if jsvalue_is_undefined_or_null(&options) {
            JsValue::UNDEFINED
        } else {
            Reflect::get(&options, &JsValue::from_str("animationData"))
                .map_err(|_| JsError::new("update: unreadable options.animationData"))?
        };
        let input: PropsInput =
            swb::from_value(props).map_err(|e| JsError::new(&format!("props error: {e}")))?;

        let props = PlayerProps {
            payload: JsPayload(animation_data),
            options: input.options,
            looping: input.looping,
            autoplay: input.autoplay,
            is_playing: input.is_playing,
            is_paused: input.is_paused,
            current_frame: input.current_frame,
            speed: input.speed,
            direction: input.direction,
        };
        self.controller
            .update(&container, props)
            .map_err(|e| JsError::new(&format!("update error: {e}")))
    }

    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        self.controller.unmount();
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        snapshot_to_js(&self.controller.state())
    }

    /// Same contract as `LottiePlayer.onChange`: the callback must not call
    /// back into this component synchronously.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Option<Function>) {
        self.controller.set_observer(callback.map(js_observer));
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
