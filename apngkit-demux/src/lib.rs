//! APNG container demuxing.
//!
//! This crate splits an APNG container into standalone per-frame PNG byte
//! sequences plus the composition metadata the player needs:
//!
//! ```no_run
//! use apngkit_demux::demux;
//!
//! # let bytes: Vec<u8> = vec![];
//! let output = demux(&bytes)?;
//! println!(
//!     "{} frames, {:.0} ms",
//!     output.animation.frame_count(),
//!     output.animation.duration_ms
//! );
//! for warning in output.report.warnings() {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), apngkit_core::Error>(())
//! ```
//!
//! A plain PNG (no `acTL` chunk) demuxes to a single frame carrying the
//! original bytes unchanged.

#![warn(missing_docs)]

mod demuxer;
mod report;

pub use demuxer::{demux, ApngDemuxer, DemuxOutput};
pub use report::DemuxReport;
