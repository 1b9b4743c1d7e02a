//! APNG frame composition and playback.
//!
//! This crate turns a demuxed animation into pixels: the [`Compositor`]
//! applies the per-frame dispose/blend rules to an accumulated canvas, and
//! the [`Player`] sequences frames with configurable playback modes, loop
//! counts, and timing.
//!
//! ```no_run
//! use apngkit_core::pixmap::Pixmap;
//! use apngkit_player::{Player, PlayerOptions, SystemClock};
//!
//! # fn demo(animation: &apngkit_core::Animation, rasters: Vec<Option<Pixmap>>) {
//! let mut player = Player::new(
//!     animation,
//!     rasters,
//!     Pixmap::new(0, 0),
//!     Pixmap::new(0, 0),
//!     PlayerOptions::new(),
//! )
//! .unwrap()
//! .on_event(|event| println!("{event:?}"));
//!
//! player.run(&mut SystemClock::new());
//! # }
//! ```

#![warn(missing_docs)]

mod compositor;
mod player;
mod sprite;

pub use compositor::{Compositor, DebugOverlay};
pub use player::{
    Clock, PlaybackMode, Player, PlayerEvent, PlayerOptions, SystemClock, WaitRequest,
};
pub use sprite::{render_sprite_sheet, sheet_layout, SheetLayout, DEFAULT_MAX_SHEET_WIDTH};
