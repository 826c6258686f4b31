//! Observable playback state mirrored from the engine.

use serde::{Deserialize, Serialize};

/// Play direction. Engines speak in signed numbers (+1 / -1).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }

    /// Read an engine-reported direction. Anything negative is reverse.
    #[inline]
    pub fn from_sign(value: f64) -> Self {
        if value < 0.0 {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

impl From<Direction> for i8 {
    fn from(d: Direction) -> Self {
        d.sign()
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

/// Which of playing / paused / stopped the adapter believes is active.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackMode {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

/// Snapshot of the attached animation's playback status.
///
/// The playing/paused/stopped flags are derived from a single [`PlaybackMode`],
/// so exactly one of them is set at any time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "PlaybackSnapshot", try_from = "PlaybackSnapshot")]
pub struct PlaybackState {
    /// Seconds.
    pub duration: f64,
    pub current_frame: u32,
    /// Seconds.
    pub current_time: f64,
    pub total_frames: u32,
    pub direction: Direction,
    pub play_speed: f64,
    pub current_loop: u32,
    pub is_loaded: bool,
    pub mode: PlaybackMode,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            duration: 0.0,
            current_frame: 0,
            current_time: 0.0,
            total_frames: 0,
            direction: Direction::Forward,
            play_speed: 1.0,
            current_loop: 0,
            is_loaded: false,
            mode: PlaybackMode::Stopped,
        }
    }
}

impl PlaybackState {
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.mode == PlaybackMode::Paused
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.mode == PlaybackMode::Stopped
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Truncate an engine frame position to a whole frame index.
/// Negative and non-finite positions map to 0.
#[inline]
pub fn frame_index(position: f64) -> u32 {
    if position.is_finite() && position > 0.0 {
        position.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Clamp a seconds value to a finite, non-negative number.
#[inline]
pub(crate) fn seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Flat wire shape of [`PlaybackState`] (camelCase, explicit mode flags).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub duration: f64,
    pub current_frame: u32,
    pub current_time: f64,
    pub total_frames: u32,
    pub direction: Direction,
    pub play_speed: f64,
    pub current_loop: u32,
    pub is_loaded: bool,
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_stopped: bool,
}

impl From<PlaybackState> for PlaybackSnapshot {
    fn from(s: PlaybackState) -> Self {
        Self {
            duration: s.duration,
            current_frame: s.current_frame,
            current_time: s.current_time,
            total_frames: s.total_frames,
            direction: s.direction,
            play_speed: s.play_speed,
            current_loop: s.current_loop,
            is_loaded: s.is_loaded,
            is_playing: s.is_playing(),
            is_paused: s.is_paused(),
            is_stopped: s.is_stopped(),
        }
    }
}

impl TryFrom<PlaybackSnapshot> for PlaybackState {
    type Error = String;

    fn try_from(s: PlaybackSnapshot) -> Result<Self, Self::Error> {
        let mode = match (s.is_playing, s.is_paused, s.is_stopped) {
            (true, false, false) => PlaybackMode::Playing,
            (false, true, false) => PlaybackMode::Paused,
            (false, false, true) => PlaybackMode::Stopped,
            (p, pa, st) => {
                return Err(format!(
                    "exactly one of isPlaying/isPaused/isStopped must be set (got {p}/{pa}/{st})"
                ))
            }
        };
        Ok(Self {
            duration: s.duration,
            current_frame: s.current_frame,
            current_time: s.current_time,
            total_frames: s.total_frames,
            direction: s.direction,
            play_speed: s.play_speed,
            current_loop: s.current_loop,
            is_loaded: s.is_loaded,
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_stopped_forward_unit_speed() {
        let s = PlaybackState::default();
        assert!(s.is_stopped());
        assert!(!s.is_playing() && !s.is_paused());
        assert_eq!(s.direction, Direction::Forward);
        assert_eq!(s.play_speed, 1.0);
        assert!(!s.is_loaded);
    }

    #[test]
    fn serializes_flat_flags() {
        let s = PlaybackState {
            mode: PlaybackMode::Paused,
            direction: Direction::Reverse,
            current_frame: 12,
            ..Default::default()
        };
        let v = serde_json::to_value(s).unwrap();
        assert_eq!(v["isPaused"], json!(true));
        assert_eq!(v["isPlaying"], json!(false));
        assert_eq!(v["isStopped"], json!(false));
        assert_eq!(v["direction"], json!(-1));
        assert_eq!(v["currentFrame"], json!(12));
        assert!(v.get("mode").is_none());
    }

    #[test]
    fn rejects_ambiguous_flags() {
        let v = json!({
            "duration": 2.0, "currentFrame": 0, "currentTime": 0.0, "totalFrames": 60,
            "direction": 1, "playSpeed": 1.0, "currentLoop": 0, "isLoaded": true,
            "isPlaying": false, "isPaused": false, "isStopped": false
        });
        assert!(serde_json::from_value::<PlaybackState>(v).is_err());
    }

    #[test]
    fn direction_signs() {
        assert_eq!(Direction::from_sign(-1.0), Direction::Reverse);
        assert_eq!(Direction::from_sign(1.0), Direction::Forward);
        assert_eq!(Direction::Reverse.reversed(), Direction::Forward);
        assert!(Direction::try_from(0i8).is_err());
        assert!(serde_json::from_value::<Direction>(json!(2)).is_err());
    }

    #[test]
    fn frame_index_truncates() {
        assert_eq!(frame_index(10.9), 10);
        assert_eq!(frame_index(-3.0), 0);
        assert_eq!(frame_index(f64::NAN), 0);
    }
}
