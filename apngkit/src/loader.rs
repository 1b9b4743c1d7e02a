//! High-level loading: demux plus raster decoding.
//!
//! The loader runs the demuxer and hands every synthesized standalone PNG
//! to the host's raster decoder. Decoding is best-effort: a failure on any
//! frame but the last is recorded and loading still succeeds with an empty
//! raster slot; a failure on the last frame fails the load. Success and
//! failure are mutually exclusive per load call.

use apngkit_core::chunk::{ChunkIndex, ChunkType};
use apngkit_core::error::{Error, Result};
use apngkit_core::surface::RasterDecoder;
use apngkit_core::Animation;
use apngkit_demux::{ApngDemuxer, DemuxReport};
use tracing::warn;

/// A fully loaded animation: demux output plus decoded rasters.
#[derive(Debug)]
pub struct Loaded<R> {
    /// The demuxed animation.
    pub animation: Animation,
    /// Decoded raster per frame; `None` where decoding failed.
    pub rasters: Vec<Option<R>>,
    /// Demux-time warnings.
    pub report: DemuxReport,
    /// Per-frame decode failures tolerated by the best-effort policy.
    pub decode_errors: Vec<(usize, Error)>,
}

impl<R> Loaded<R> {
    /// Whether every frame decoded successfully.
    pub fn is_complete(&self) -> bool {
        self.decode_errors.is_empty()
    }
}

/// Demux a PNG/APNG buffer and decode every frame.
pub fn load<D: RasterDecoder>(data: &[u8], decoder: &D) -> Result<Loaded<D::Raster>> {
    let output = ApngDemuxer::new().demux(data)?;
    let animation = output.animation;

    let mut rasters = Vec::with_capacity(animation.frame_count());
    let mut decode_errors = Vec::new();
    let last = animation.frame_count().saturating_sub(1);

    for (index, frame) in animation.frames.iter().enumerate() {
        match decoder.decode(frame.as_bytes()) {
            Ok(raster) => rasters.push(Some(raster)),
            Err(err) if index < last => {
                warn!(frame = index, %err, "frame decode failed; continuing");
                decode_errors.push((index, err));
                rasters.push(None);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Loaded {
        animation,
        rasters,
        report: output.report,
        decode_errors,
    })
}

/// Quick check for an animated source: a valid PNG carrying an `acTL`
/// chunk. Never fails; malformed input answers `false`.
pub fn probe(data: &[u8]) -> bool {
    ChunkIndex::scan(data)
        .map(|index| index.contains(ChunkType::ACTL))
        .unwrap_or(false)
}
