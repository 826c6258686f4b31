//! Attach options handed to the engine when an instance is created.

use serde::{Deserialize, Serialize};

/// Output backend the engine renders with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    #[default]
    Svg,
    Canvas,
    Html,
}

impl Renderer {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Canvas => "canvas",
            Self::Html => "html",
        }
    }
}

/// Loop behaviour: endless (`true`), once (`false`) or a fixed number of extra loops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoopSetting {
    Flag(bool),
    Count(u32),
}

impl Default for LoopSetting {
    fn default() -> Self {
        Self::Flag(true)
    }
}

impl From<bool> for LoopSetting {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// A `[from, to]` frame range.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment(pub f64, pub f64);

/// Renderer-specific tuning passed through to the engine untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_canvas: Option<bool>,
    /// SVG renderer only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progressive_load: Option<bool>,
    /// SVG renderer only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_on_transparent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Options for `Adapter::attach`. Every field has a default so hosts can pass
/// partial JSON (or nothing at all).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachOptions {
    pub renderer: Renderer,
    #[serde(rename = "loop")]
    pub looping: LoopSetting,
    pub autoplay: bool,
    /// Render every display frame instead of the document's native frame rate.
    pub subframe: bool,
    /// Segments to queue right after load (forced).
    pub segments: Vec<Segment>,
    pub renderer_settings: RendererSettings,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            renderer: Renderer::Svg,
            looping: LoopSetting::Flag(true),
            autoplay: true,
            subframe: true,
            segments: Vec::new(),
            renderer_settings: RendererSettings::default(),
        }
    }
}

impl AttachOptions {
    pub fn with_loop(mut self, looping: impl Into<LoopSetting>) -> Self {
        self.looping = looping.into();
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }
}
