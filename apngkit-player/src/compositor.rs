//! The frame compositor.
//!
//! Owns the output canvas and the auxiliary restore surface, and applies the
//! APNG dispose/blend rules for one frame at a time. Dispose and blend are
//! both taken from the frame being rendered, and a `Previous` dispose is
//! deferred through `restore_pending` into the next render call; this
//! matches the observable behavior the player is specified against.

use apngkit_core::animation::{BlendOp, DisposeOp, FrameInfo, Region};
use apngkit_core::surface::{DrawSurface, Rgba};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Debug overlay configuration: region outline plus a text label per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugOverlay {
    /// Outline color for the frame's destination region.
    pub region_color: Rgba,
    /// Color of the text label.
    pub text_color: Rgba,
    /// Anchor of the text label.
    pub text_position: (u32, u32),
    /// Font specification passed through to the surface.
    pub text_font: String,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self {
            region_color: Rgba::RED,
            text_color: Rgba::WHITE,
            text_position: (2, 12),
            text_font: "10px monospace".to_string(),
        }
    }
}

/// Canvas state machine applying dispose/blend per rendered frame.
#[derive(Debug)]
pub struct Compositor<S: DrawSurface> {
    canvas: S,
    restore: S,
    restore_pending: bool,
    width: u32,
    height: u32,
}

impl<S: DrawSurface> Compositor<S> {
    /// Take ownership of the two host surfaces and size them to the canvas.
    pub fn new(mut canvas: S, mut restore: S, width: u32, height: u32) -> Self {
        canvas.resize(width, height);
        restore.resize(width, height);
        Self {
            canvas,
            restore,
            restore_pending: false,
            width,
            height,
        }
    }

    /// The composed output canvas.
    pub fn canvas(&self) -> &S {
        &self.canvas
    }

    /// Reset to the initial state: fully transparent canvas, no pending
    /// restore.
    pub fn reset(&mut self) {
        self.canvas.clear_rect(Region::full(self.width, self.height));
        self.restore_pending = false;
    }

    /// Compose one frame onto the canvas.
    ///
    /// `raster` is `None` when the frame's pixels failed to decode; the
    /// dispose/blend bookkeeping still runs, only the draw is skipped.
    pub fn render(
        &mut self,
        frame_index: usize,
        info: &FrameInfo,
        raster: Option<&S::Raster>,
        overlay: Option<&DebugOverlay>,
    ) {
        trace!(
            frame_index,
            dispose = info.dispose.as_u8(),
            blend = info.blend.as_u8(),
            "render frame"
        );

        if self.restore_pending {
            self.canvas.blit_full(&self.restore);
            self.restore_pending = false;
        }

        match info.dispose {
            DisposeOp::None => {}
            DisposeOp::Background => self.canvas.clear_rect(info.region),
            DisposeOp::Previous => {
                self.restore.clear_rect(Region::full(self.width, self.height));
                self.restore
                    .copy_from(&self.canvas, info.region, info.region.x, info.region.y);
                self.restore_pending = true;
            }
        }

        if info.blend == BlendOp::Source {
            self.canvas.clear_rect(info.region);
        }

        if let Some(raster) = raster {
            self.canvas.draw_raster(raster, info.region.x, info.region.y);
        }

        if let Some(overlay) = overlay {
            self.canvas.stroke_rect(info.region, overlay.region_color);
            let label = format!(
                "F:{}  D:{}  B:{}",
                frame_index,
                info.dispose.as_u8(),
                info.blend.as_u8()
            );
            self.canvas.fill_text(
                &label,
                overlay.text_position.0,
                overlay.text_position.1,
                overlay.text_color,
                &overlay.text_font,
            );
        }
    }
}
