use std::time::Duration;

use crate::foundation::error::{TypingError, TypingResult};

pub use kurbo::{Point, Rect, Size};

/// 0-based index of a frame in output order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> TypingResult<Self> {
        if den == 0 {
            return Err(TypingError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TypingError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert a duration to a tick count using round-half-up semantics.
    pub fn duration_to_ticks_round(self, d: Duration) -> u64 {
        (d.as_secs_f64() * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Smallest canvas with even dimensions that covers `size`.
    ///
    /// yuv420p MP4 output rejects odd dimensions, so every canvas we produce is even.
    pub fn covering_even(size: Size) -> Self {
        fn even(v: f64) -> u32 {
            let px = v.ceil().max(2.0) as u32;
            px + (px % 2)
        }

        Self {
            width: even(size.width),
            height: even(size.height),
        }
    }

    /// Canvas size as a float `Size`.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
