//! Traits for the two external collaborators: the PNG pixel decoder and the
//! 2-D drawing surface used for composition.
//!
//! The engine never touches pixels itself; it drives a [`DrawSurface`] with
//! rectangle clears, raw region copies, and alpha-over raster draws, and
//! obtains rasters through a [`RasterDecoder`]. Hosts supply both; the
//! in-memory [`Pixmap`](crate::pixmap::Pixmap) implements the surface side
//! for tests and surface-less hosts.

use crate::animation::Region;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a color from components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Decodes a standalone PNG byte sequence into a drawable raster.
///
/// This is the external PNG pixel decoder; the engine hands it the
/// standalone per-frame PNGs it synthesizes and stores the returned handles
/// opaquely.
pub trait RasterDecoder {
    /// The opaque raster handle produced by this decoder.
    type Raster;

    /// Decode one standalone PNG.
    fn decode(&self, png: &[u8]) -> Result<Self::Raster>;
}

/// A 2-D drawing surface holding the composition state.
///
/// Required semantics:
/// - `clear_rect` sets the region to fully transparent pixels;
/// - `draw_raster` and `blit_full` composite with source-over alpha
///   blending (source-copy draws are expressed by the caller as
///   clear-then-draw);
/// - `copy_from` is a raw pixel copy, not a blend.
///
/// Out-of-bounds regions are clipped to the surface.
pub trait DrawSurface {
    /// The raster type this surface can draw.
    type Raster;

    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Resize the surface, discarding its contents.
    fn resize(&mut self, width: u32, height: u32);

    /// Clear a region to fully transparent.
    fn clear_rect(&mut self, region: Region);

    /// Draw a raster at the given offset with source-over alpha blending.
    fn draw_raster(&mut self, raster: &Self::Raster, x: u32, y: u32);

    /// Copy a region of another surface's pixels to the given destination
    /// offset, replacing whatever is there.
    fn copy_from(&mut self, src: &Self, src_region: Region, dest_x: u32, dest_y: u32);

    /// Draw another surface over this one, anchored at the origin, with
    /// source-over alpha blending.
    fn blit_full(&mut self, src: &Self);

    /// Stroke a 1-pixel rectangle outline. Debug aid.
    fn stroke_rect(&mut self, region: Region, color: Rgba);

    /// Draw a short text label at the given anchor. Debug aid; surfaces
    /// without text facilities may ignore this.
    fn fill_text(&mut self, text: &str, x: u32, y: u32, color: Rgba, font: &str);
}
