//! Easing curves and loop modes for keyframe animation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SpriteKeyError;

// ── Easing curves ───────────────────────────────────────────────

/// Reparameterization of blend progress. All curves map 0 → 0 and 1 → 1
/// and are monotonic on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingCurve {
    #[default]
    Linear,
    /// Quadratic, slow start.
    EaseIn,
    /// Quadratic, slow end.
    EaseOut,
    /// Quadratic, slow start and end.
    EaseInOut,
}

impl EasingCurve {
    /// Evaluate the curve. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let eased = match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        };
        eased.clamp(0.0, 1.0)
    }

    pub const ALL: [Self; 4] = [Self::Linear, Self::EaseIn, Self::EaseOut, Self::EaseInOut];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
        }
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EasingCurve {
    type Err = SpriteKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| SpriteKeyError::InvalidParameter(format!("unknown easing {s:?}")))
    }
}

// ── Loop modes ──────────────────────────────────────────────────

/// How an animation sequence closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Blend the last keyframe back into the first.
    Loop,
    /// Play forward, then the interior frames backward.
    PingPong,
    /// Open sequence.
    #[default]
    None,
}

impl FromStr for LoopMode {
    type Err = SpriteKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loop" => Ok(Self::Loop),
            "pingpong" | "ping-pong" => Ok(Self::PingPong),
            "none" => Ok(Self::None),
            _ => Err(SpriteKeyError::InvalidParameter(format!(
                "unknown loop mode {s:?}"
            ))),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
