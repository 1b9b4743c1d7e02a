//! Core types for APNG demuxing and composition.
//!
//! This crate provides the shared foundation of the apngkit workspace:
//!
//! - [`chunk`] — PNG signature validation and zero-copy chunk scanning
//! - [`crc`] — the table-driven PNG CRC32 engine
//! - [`animation`] — the demuxed animation model and retiming utilities
//! - [`surface`] — traits for the external raster decoder and draw surface
//! - [`pixmap`] — a reference in-memory RGBA surface
//!
//! Higher layers build on these: `apngkit-demux` splits an APNG container
//! into standalone per-frame PNGs, and `apngkit-player` composites them with
//! APNG dispose/blend semantics.

#![warn(missing_docs)]

pub mod animation;
pub mod chunk;
pub mod crc;
pub mod error;
pub mod pixmap;
pub mod surface;

pub use animation::{Animation, BlendOp, DisposeOp, FrameInfo, RawFrame, Region};
pub use chunk::{Chunk, ChunkIndex, ChunkType, PNG_SIGNATURE};
pub use crc::{Crc32, IEND_CRC};
pub use error::{Error, Result, Warning};
pub use pixmap::Pixmap;
pub use surface::{DrawSurface, RasterDecoder, Rgba};
