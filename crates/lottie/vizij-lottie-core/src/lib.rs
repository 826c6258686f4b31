//! Vizij Lottie Core (engine-agnostic)
//!
//! Binds an external vector-animation player (lottie-web or any engine that
//! implements [`PlayerEngine`]) to a render-driven UI layer. The [`Adapter`]
//! owns one engine instance at a time and mirrors its status into an
//! observable [`PlaybackState`]; the [`Controller`] turns declarative
//! [`PlayerProps`] into adapter calls.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod ids;
pub mod payload;
pub mod state;

// Re-exports for consumers (bindings)
pub use adapter::{Adapter, StateObserver};
pub use config::{AttachOptions, LoopSetting, Renderer, RendererSettings, Segment};
pub use controller::{Controller, PlayerProps};
pub use engine::{
    EngineEvent, EngineInstance, EventKind, InstanceProbe, Listener, LoadRequest, PlayerEngine,
};
pub use error::EngineError;
pub use ids::{AttachId, IdAllocator, ListenerId};
pub use payload::{AnimationPayload, PayloadHeader, PayloadIdentity};
pub use state::{Direction, PlaybackMode, PlaybackSnapshot, PlaybackState};
