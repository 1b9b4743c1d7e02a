//! Sprite-sheet generation.
//!
//! Renders every sequence position of a player onto a single surface,
//! wrapping rows when the sheet would exceed a maximum width.

use crate::player::Player;
use apngkit_core::animation::Region;
use apngkit_core::surface::DrawSurface;
use serde::{Deserialize, Serialize};

/// Default maximum sheet width in pixels.
pub const DEFAULT_MAX_SHEET_WIDTH: u32 = 6000;

/// Geometry of a generated sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Cells per row.
    pub cols: u32,
    /// Number of rows.
    pub rows: u32,
    /// Cell width (the animation's canvas width).
    pub cell_width: u32,
    /// Cell height (the animation's canvas height).
    pub cell_height: u32,
    /// Total sheet width.
    pub width: u32,
    /// Total sheet height.
    pub height: u32,
}

/// Compute the sheet geometry for a frame count and cell size.
///
/// A single row is used when it fits within `max_width`; otherwise rows
/// wrap at `floor(max_width / cell_width)` cells.
pub fn sheet_layout(frame_count: u32, cell_width: u32, cell_height: u32, max_width: u32) -> SheetLayout {
    if frame_count == 0 || cell_width == 0 || cell_height == 0 {
        return SheetLayout {
            cols: 0,
            rows: 0,
            cell_width,
            cell_height,
            width: 0,
            height: 0,
        };
    }

    let single_row = cell_width as u64 * frame_count as u64 <= max_width as u64;
    let cols = if single_row {
        frame_count
    } else {
        (max_width / cell_width).max(1)
    };
    let rows = frame_count.div_ceil(cols);

    SheetLayout {
        cols,
        rows,
        cell_width,
        cell_height,
        width: cols * cell_width,
        height: rows * cell_height,
    }
}

/// Render a sprite sheet of every sequence position onto `sheet`.
///
/// The sheet surface is resized to the computed geometry, the player is
/// seeked through its sequence, and each composed canvas is copied into the
/// next cell, wrapping to a new row when the x offset reaches the sheet
/// width.
pub fn render_sprite_sheet<S: DrawSurface>(
    player: &mut Player<'_, S>,
    sheet: &mut S,
    max_width: u32,
) -> SheetLayout {
    let cell_width = player.animation().width;
    let cell_height = player.animation().height;
    let frame_count = player.sequence_len() as u32;
    let layout = sheet_layout(frame_count, cell_width, cell_height, max_width);

    sheet.resize(layout.width, layout.height);

    let mut x = 0;
    let mut y = 0;
    for pos in 0..frame_count {
        player.set_current_frame(pos as i64);
        sheet.copy_from(player.canvas(), Region::full(cell_width, cell_height), x, y);
        x += cell_width;
        if x >= layout.width {
            x = 0;
            y += cell_height;
        }
    }

    layout
}
