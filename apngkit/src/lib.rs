//! # apngkit
//!
//! Decode Animated PNG (APNG) files into standalone per-frame PNG images and
//! play them back with correct dispose/blend composition.
//!
//! The workspace splits into focused crates, re-exported here:
//! - `apngkit-core`: chunk scanning, CRC32, the animation model, and the
//!   surface/decoder trait seams
//! - `apngkit-demux`: the container demuxer producing standalone per-frame
//!   PNGs with recomputed CRCs
//! - `apngkit-player`: the compositor and player with playback modes,
//!   seeking, and sprite-sheet generation
//!
//! ## Quick start
//!
//! ```no_run
//! use apngkit::{load, Player, PlayerOptions, SystemClock};
//! use apngkit::pixmap::Pixmap;
//! # struct MyDecoder;
//! # impl apngkit::RasterDecoder for MyDecoder {
//! #     type Raster = Pixmap;
//! #     fn decode(&self, _png: &[u8]) -> apngkit::Result<Pixmap> { unimplemented!() }
//! # }
//!
//! # fn main() -> apngkit::Result<()> {
//! # let bytes: Vec<u8> = vec![];
//! let loaded = load(&bytes, &MyDecoder)?;
//! println!(
//!     "{} frames over {:.0} ms",
//!     loaded.animation.frame_count(),
//!     loaded.animation.duration_ms
//! );
//!
//! let mut player = Player::new(
//!     &loaded.animation,
//!     loaded.rasters,
//!     Pixmap::new(0, 0),
//!     Pixmap::new(0, 0),
//!     PlayerOptions::new(),
//! )?;
//! player.run(&mut SystemClock::new());
//! # Ok(())
//! # }
//! ```
//!
//! The demuxer can also be used on its own through [`demux`]; it returns the
//! raw [`Animation`] without touching a decoder.

#![warn(missing_docs)]

mod loader;

pub use loader::{load, probe, Loaded};

pub use apngkit_core::{
    animation::{Animation, BlendOp, DisposeOp, FrameInfo, RawFrame, Region},
    chunk::{Chunk, ChunkIndex, ChunkType, PNG_SIGNATURE},
    crc::{Crc32, IEND_CRC},
    error::{Error, Result, Warning},
    pixmap,
    surface::{DrawSurface, RasterDecoder, Rgba},
};

pub use apngkit_demux::{demux, ApngDemuxer, DemuxOutput, DemuxReport};

pub use apngkit_player::{
    render_sprite_sheet, sheet_layout, Clock, Compositor, DebugOverlay, PlaybackMode, Player,
    PlayerEvent, PlayerOptions, SheetLayout, SystemClock, WaitRequest,
    DEFAULT_MAX_SHEET_WIDTH,
};
