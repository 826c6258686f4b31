//! Animation payloads and identity.
//!
//! Re-attachment is driven by payload identity, not content: handing the same
//! document back keeps the running instance, handing a new one (even an equal
//! copy) replaces it.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// Identity comparison for engine payloads.
pub trait PayloadIdentity {
    fn same_payload(&self, other: &Self) -> bool;
}

/// Shared, immutable Bodymovin JSON document. Clones share identity.
#[derive(Clone, Debug)]
pub struct AnimationPayload {
    doc: Rc<Value>,
}

impl AnimationPayload {
    pub fn new(doc: Value) -> Self {
        Self { doc: Rc::new(doc) }
    }

    /// Parse a JSON export. Only JSON syntax and a top-level object are
    /// checked here; whether the document animates is the engine's call.
    pub fn from_json_str(s: &str) -> Result<Self, EngineError> {
        let doc: Value = serde_json::from_str(s)?;
        if !doc.is_object() {
            return Err(EngineError::InvalidPayload {
                reason: "animation document must be a JSON object".to_string(),
            });
        }
        Ok(Self::new(doc))
    }

    #[inline]
    pub fn document(&self) -> &Value {
        &self.doc
    }

    /// Read the document header (`v`, `nm`, `fr`, `ip`, `op`, `w`, `h`).
    pub fn header(&self) -> Result<PayloadHeader, EngineError> {
        PayloadHeader::deserialize(self.doc.as_ref()).map_err(EngineError::from)
    }
}

impl PayloadIdentity for AnimationPayload {
    #[inline]
    fn same_payload(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc)
    }
}

impl From<Value> for AnimationPayload {
    fn from(doc: Value) -> Self {
        Self::new(doc)
    }
}

/// Timing and size header of a Bodymovin export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayloadHeader {
    /// Exporter version.
    #[serde(rename = "v", default)]
    pub version: Option<String>,
    #[serde(rename = "nm", default)]
    pub name: Option<String>,
    /// Frames per second.
    #[serde(rename = "fr")]
    pub frame_rate: f64,
    /// In point (first frame).
    #[serde(rename = "ip")]
    pub in_point: f64,
    /// Out point (one past the last frame).
    #[serde(rename = "op")]
    pub out_point: f64,
    #[serde(rename = "w", default)]
    pub width: u32,
    #[serde(rename = "h", default)]
    pub height: u32,
}

impl PayloadHeader {
    #[inline]
    pub fn total_frames(&self) -> f64 {
        (self.out_point - self.in_point).max(0.0)
    }

    /// Seconds; 0 when the frame rate is unusable.
    #[inline]
    pub fn duration(&self) -> f64 {
        if self.frame_rate > 0.0 {
            self.total_frames() / self.frame_rate
        } else {
            0.0
        }
    }
}
