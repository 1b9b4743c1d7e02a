//! The animation data model.
//!
//! An [`Animation`] is the demuxer's output: per-frame standalone PNG byte
//! sequences paired with the composition metadata the player needs to apply
//! APNG dispose/blend rules.

use serde::{Deserialize, Serialize};

/// A rectangular destination region on the full canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// X offset in pixels.
    pub x: u32,
    /// Y offset in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Create a new region.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region spanning a full canvas of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Check whether this region lies fully within a canvas of the given
    /// size.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Post-draw canvas treatment for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisposeOp {
    /// Leave the canvas as drawn.
    #[default]
    None,
    /// Clear the frame's region to fully transparent.
    Background,
    /// Restore the frame's region to its pre-draw state.
    Previous,
}

impl DisposeOp {
    /// Parse from the fcTL dispose byte. Out-of-range values act as `None`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => DisposeOp::Background,
            2 => DisposeOp::Previous,
            _ => DisposeOp::None,
        }
    }

    /// Numeric wire value.
    pub fn as_u8(self) -> u8 {
        match self {
            DisposeOp::None => 0,
            DisposeOp::Background => 1,
            DisposeOp::Previous => 2,
        }
    }
}

/// How a frame's raster combines with the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendOp {
    /// Source copy: the destination region is cleared before the draw.
    #[default]
    Source,
    /// Alpha compositing over the existing canvas contents.
    Over,
}

impl BlendOp {
    /// Parse from the fcTL blend byte. Out-of-range values act as `Source`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => BlendOp::Over,
            _ => BlendOp::Source,
        }
    }

    /// Numeric wire value.
    pub fn as_u8(self) -> u8 {
        match self {
            BlendOp::Source => 0,
            BlendOp::Over => 1,
        }
    }
}

/// Per-frame composition record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Destination region on the full canvas.
    pub region: Region,
    /// Presentation delay in milliseconds.
    pub delay_ms: f64,
    /// Post-draw canvas treatment.
    pub dispose: DisposeOp,
    /// Blend mode for the draw.
    pub blend: BlendOp,
}

impl FrameInfo {
    /// The record used for a non-animated source: full-canvas region, a
    /// sentinel delay of `-1`, background dispose, source blend.
    pub fn single(width: u32, height: u32) -> Self {
        Self {
            region: Region::full(width, height),
            delay_ms: -1.0,
            dispose: DisposeOp::Background,
            blend: BlendOp::Source,
        }
    }
}

/// One demuxed frame: an owned, standalone PNG byte sequence.
///
/// Decoded raster handles are paired externally and owned by the player, so
/// the animation stays decoder-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Standalone PNG bytes for this frame.
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Wrap an owned PNG byte sequence.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The PNG bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte length of the PNG.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A demuxed animation: per-frame PNGs paired with composition metadata.
///
/// `frames[i]` and `frame_info[i]` describe the same frame. The animation is
/// immutable after demuxing except for the retiming utilities, which rewrite
/// the per-frame delays and recompute the total duration.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Full canvas width in pixels.
    pub width: u32,
    /// Full canvas height in pixels.
    pub height: u32,
    /// Declared iteration count; 0 means loop forever.
    pub iterations: u32,
    /// Total duration in milliseconds (sum of the per-frame delays).
    pub duration_ms: f64,
    /// Whether the source carried an acTL chunk.
    pub is_apng: bool,
    /// Standalone per-frame PNG byte sequences.
    pub frames: Vec<RawFrame>,
    /// Per-frame composition records, paired with `frames`.
    pub frame_info: Vec<FrameInfo>,
}

impl Animation {
    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Multiply every frame delay by `k` and recompute the total duration.
    pub fn scale_delays(&mut self, k: f64) {
        for info in &mut self.frame_info {
            info.delay_ms *= k;
        }
        self.recompute_duration();
    }

    /// Rescale all delays so the total duration becomes `duration_ms`.
    pub fn set_total_duration(&mut self, duration_ms: f64) {
        let k = duration_ms / self.duration_ms;
        self.scale_delays(k);
    }

    /// Set every frame delay to `delay_ms` and recompute the total duration.
    pub fn set_uniform_delay(&mut self, delay_ms: f64) {
        for info in &mut self.frame_info {
            info.delay_ms = delay_ms;
        }
        self.recompute_duration();
    }

    fn recompute_duration(&mut self) {
        self.duration_ms = self.frame_info.iter().map(|i| i.delay_ms).sum();
    }
}
