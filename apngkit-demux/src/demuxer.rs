//! The APNG container demuxer.
//!
//! Walks the chunk index, interprets the animation control chunks (`acTL`,
//! `fcTL`, `fdAT`), splits the interleaved image-data stream into per-frame
//! chunk lists, and synthesizes one standalone PNG byte sequence per frame:
//! the shared header prelude with a size-patched `IHDR`, the frame's data
//! re-framed as `IDAT` chunks with fresh CRCs, and a terminal `IEND`.
//!
//! Frame data is referenced by byte range into the source buffer until the
//! final per-frame concatenation; nothing is copied twice.

use crate::report::DemuxReport;
use apngkit_core::animation::{Animation, BlendOp, DisposeOp, FrameInfo, RawFrame, Region};
use apngkit_core::chunk::{read_u16_be, read_u32_be, Chunk, ChunkIndex, ChunkType, CHUNK_OVERHEAD, PNG_SIGNATURE};
use apngkit_core::crc::{Crc32, IEND_CRC};
use apngkit_core::error::{Error, Result, Warning};
use byteorder::{BigEndian, ByteOrder};
use std::ops::Range;
use tracing::debug;

/// Ancillary chunk types copied verbatim into every synthesized frame.
/// IHDR is rewritten per frame; the rest keep their original framing.
const HEADER_TYPES: [ChunkType; 9] = [
    ChunkType::IHDR,
    ChunkType::PLTE,
    ChunkType::GAMA,
    ChunkType::PHYS,
    ChunkType::TRNS,
    ChunkType::ICCP,
    ChunkType::SRGB,
    ChunkType::SBIT,
    ChunkType::SPLT,
];

/// Result of a demux run: the animation plus the warning side channel.
#[derive(Debug, Clone)]
pub struct DemuxOutput {
    /// The demuxed animation.
    pub animation: Animation,
    /// Non-fatal warnings observed during the parse.
    pub report: DemuxReport,
}

/// Monitors fcTL/fdAT sequence numbers for monotonic order.
#[derive(Debug, Default)]
struct SequenceMonitor {
    last: Option<u32>,
    flagged: bool,
}

impl SequenceMonitor {
    fn observe(&mut self, seq: u32, report: &mut DemuxReport) {
        if let Some(last) = self.last {
            if seq < last && !self.flagged {
                report.push(Warning::SequenceOutOfOrder {
                    expected: last,
                    found: seq,
                });
                self.flagged = true;
            }
        }
        self.last = Some(self.last.map_or(seq, |l| l.max(seq)));
    }
}

/// The APNG demuxer.
///
/// Owns the CRC32 table for the run; create one per demux job (or reuse it,
/// the demuxer holds no per-input state).
#[derive(Debug, Clone, Default)]
pub struct ApngDemuxer {
    crc: Crc32,
}

impl ApngDemuxer {
    /// Create a demuxer, building the CRC table.
    pub fn new() -> Self {
        Self { crc: Crc32::new() }
    }

    /// Demux a PNG/APNG byte buffer into an [`Animation`].
    ///
    /// A source without an `acTL` chunk is returned unchanged as a single
    /// frame (`is_apng = false`). Fatal errors are the malformed-container
    /// cases ([`Error::BadSignature`], [`Error::BadPng`],
    /// [`Error::TruncatedChunk`]); everything else is reported as a warning
    /// and the parse continues best-effort.
    pub fn demux(&self, src: &[u8]) -> Result<DemuxOutput> {
        let index = ChunkIndex::scan(src)?;
        let (width, height) = index.canvas_size(src)?;
        let mut report = DemuxReport::new();

        self.verify_crcs(src, &index, &mut report);

        let Some(actl) = index.find(ChunkType::ACTL) else {
            debug!(width, height, "no acTL chunk; treating input as a plain PNG");
            let animation = Animation {
                width,
                height,
                iterations: 0,
                duration_ms: -1.0,
                is_apng: false,
                frames: vec![RawFrame::new(src.to_vec())],
                frame_info: vec![FrameInfo::single(width, height)],
            };
            return Ok(DemuxOutput { animation, report });
        };

        let actl_data = checked_data(src, actl, 8)?;
        let num_frames = read_u32_be(actl_data);
        let iterations = read_u32_be(&actl_data[4..]);
        debug!(num_frames, iterations, "acTL found; demuxing animation frames");

        let mut header_chunks: Vec<Chunk> = Vec::new();
        let mut files: Vec<Vec<Range<usize>>> = Vec::new();
        let mut current_parts: Vec<Range<usize>> = Vec::new();
        let mut frame_info: Vec<FrameInfo> = Vec::new();
        let mut seen_fctl = false;
        let mut monitor = SequenceMonitor::default();

        for chunk in index.chunks() {
            match chunk.chunk_type {
                t if HEADER_TYPES.contains(&t) => header_chunks.push(*chunk),
                ChunkType::FCTL => {
                    // One data list per fcTL, empty or not: files[k] must
                    // stay paired with frame_info[k] even when a frame has
                    // no data chunks of its own.
                    if seen_fctl {
                        files.push(std::mem::take(&mut current_parts));
                    }
                    seen_fctl = true;
                    let (seq, info) = parse_fctl(src, chunk)?;
                    monitor.observe(seq, &mut report);
                    frame_info.push(info);
                }
                ChunkType::IDAT => {
                    // IDATs before the first fcTL belong to the static
                    // default image and are skipped; once an fcTL has been
                    // seen, every IDAT joins the current frame.
                    if seen_fctl {
                        current_parts.push(data_range(chunk));
                    }
                }
                ChunkType::FDAT => {
                    let data = checked_data(src, chunk, 4)?;
                    monitor.observe(read_u32_be(data), &mut report);
                    let range = data_range(chunk);
                    current_parts.push(range.start + 4..range.end);
                }
                _ => {}
            }
        }
        if seen_fctl {
            files.push(current_parts);
        }
        debug_assert_eq!(files.len(), frame_info.len());

        if frame_info.len() as u32 != num_frames {
            report.push(Warning::FrameCountMismatch {
                declared: num_frames,
                actual: frame_info.len() as u32,
            });
        }

        let frames: Vec<RawFrame> = files
            .iter()
            .zip(&frame_info)
            .map(|(parts, info)| {
                RawFrame::new(self.synthesize(src, &header_chunks, parts, info.region))
            })
            .collect();

        let duration_ms = frame_info.iter().map(|i| i.delay_ms).sum();
        let animation = Animation {
            width,
            height,
            iterations,
            duration_ms,
            is_apng: true,
            frames,
            frame_info,
        };
        Ok(DemuxOutput { animation, report })
    }

    /// Recompute every chunk's CRC and report mismatches. Never fatal.
    fn verify_crcs(&self, src: &[u8], index: &ChunkIndex, report: &mut DemuxReport) {
        for chunk in index.chunks() {
            let computed = self.crc.checksum(chunk.chunk_type, chunk.data(src));
            if computed != chunk.stored_crc(src) {
                report.push(Warning::CrcMismatch {
                    chunk_type: chunk.chunk_type,
                    offset: chunk.header_offset(),
                });
            }
        }
    }

    /// Build one standalone PNG from the shared header prelude and the
    /// frame's data parts.
    fn synthesize(
        &self,
        src: &[u8],
        header_chunks: &[Chunk],
        parts: &[Range<usize>],
        region: Region,
    ) -> Vec<u8> {
        let header_len: usize = header_chunks
            .iter()
            .map(|c| c.length as usize + CHUNK_OVERHEAD)
            .sum();
        let parts_len: usize = parts.iter().map(|p| p.len() + CHUNK_OVERHEAD).sum();
        let mut out =
            Vec::with_capacity(PNG_SIGNATURE.len() + header_len + parts_len + CHUNK_OVERHEAD);

        out.extend_from_slice(&PNG_SIGNATURE);

        for chunk in header_chunks {
            if chunk.chunk_type == ChunkType::IHDR {
                // Patch the canvas dimensions to the frame's region size and
                // re-CRC; the rest of the IHDR fields carry over.
                let mut data = chunk.data(src).to_vec();
                BigEndian::write_u32(&mut data[0..4], region.width);
                BigEndian::write_u32(&mut data[4..8], region.height);
                self.write_chunk(&mut out, ChunkType::IHDR, &data);
            } else {
                out.extend_from_slice(chunk.framed(src));
            }
        }

        for part in parts {
            self.write_chunk(&mut out, ChunkType::IDAT, &src[part.clone()]);
        }

        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(ChunkType::IEND.as_bytes());
        out.extend_from_slice(&IEND_CRC.to_be_bytes());
        out
    }

    fn write_chunk(&self, out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type.as_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(&self.crc.checksum(chunk_type, data).to_be_bytes());
    }
}

/// Demux a PNG/APNG byte buffer with a freshly built demuxer.
pub fn demux(src: &[u8]) -> Result<DemuxOutput> {
    ApngDemuxer::new().demux(src)
}

fn data_range(chunk: &Chunk) -> Range<usize> {
    let start = chunk.data_offset as usize;
    start..start + chunk.length as usize
}

fn checked_data<'a>(src: &'a [u8], chunk: &Chunk, needed: usize) -> Result<&'a [u8]> {
    if (chunk.length as usize) < needed {
        return Err(Error::TruncatedChunk {
            offset: chunk.header_offset(),
            needed,
            available: chunk.length as usize,
        });
    }
    Ok(chunk.data(src))
}

/// Parse an fcTL chunk into its sequence number and composition record.
fn parse_fctl(src: &[u8], chunk: &Chunk) -> Result<(u32, FrameInfo)> {
    let data = checked_data(src, chunk, 26)?;

    let seq = read_u32_be(data);
    let region = Region {
        x: read_u32_be(&data[12..]),
        y: read_u32_be(&data[16..]),
        width: read_u32_be(&data[4..]),
        height: read_u32_be(&data[8..]),
    };
    let delay_num = read_u16_be(&data[20..]);
    let delay_den = read_u16_be(&data[22..]);

    // A zero denominator would divide by zero; any nonzero substitute works
    // because the result is then overwritten with the fixed 10 ms fallback.
    let den = if delay_den == 0 { 1 } else { delay_den };
    let mut delay_ms = delay_num as f64 / den as f64 * 1000.0;
    if delay_den == 0 {
        delay_ms = 10.0;
    }

    Ok((
        seq,
        FrameInfo {
            region,
            delay_ms,
            dispose: DisposeOp::from_u8(data[24]),
            blend: BlendOp::from_u8(data[25]),
        },
    ))
}
