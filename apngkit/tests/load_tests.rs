//! End-to-end tests: demux, best-effort decode, and playback composition
//! through the public facade.

use apngkit::pixmap::Pixmap;
use apngkit::{
    load, probe, ChunkIndex, ChunkType, Crc32, DrawSurface, Error, Player, PlayerOptions,
    RasterDecoder, Result, Rgba, PNG_SIGNATURE,
};

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let crc = Crc32::new();
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.checksum(ChunkType::new(*tag), data).to_be_bytes());
    out
}

fn ihdr(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    chunk(b"IHDR", &data)
}

fn actl(num_frames: u32, iterations: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&num_frames.to_be_bytes());
    data.extend_from_slice(&iterations.to_be_bytes());
    chunk(b"acTL", &data)
}

fn fctl(seq: u32, width: u32, height: u32, delay_num: u16, delay_den: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&seq.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(&delay_num.to_be_bytes());
    data.extend_from_slice(&delay_den.to_be_bytes());
    data.push(0); // dispose: none
    data.push(0); // blend: source
    chunk(b"fcTL", &data)
}

fn fdat(seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut data = seq.to_be_bytes().to_vec();
    data.extend_from_slice(payload);
    chunk(b"fdAT", &data)
}

fn png_file(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = PNG_SIGNATURE.to_vec();
    for c in chunks {
        out.extend_from_slice(c);
    }
    out
}

fn three_frame_apng() -> Vec<u8> {
    png_file(&[
        ihdr(4, 4),
        actl(3, 0),
        fctl(0, 4, 4, 10, 1000),
        chunk(b"IDAT", &[0x01]),
        fctl(1, 4, 4, 10, 1000),
        fdat(2, &[0x02]),
        fctl(3, 4, 4, 10, 1000),
        fdat(4, &[0x03]),
        chunk(b"IEND", &[]),
    ])
}

// ---------------------------------------------------------------------------
// Test decoders
// ---------------------------------------------------------------------------

/// Decodes a standalone PNG into a solid pixmap sized from its IHDR, with
/// the color keyed off the first IDAT payload byte.
struct StubDecoder;

impl StubDecoder {
    fn frame_color(tag: u8) -> Rgba {
        Rgba::new(tag.wrapping_mul(40), 0, 255 - tag.wrapping_mul(40), 255)
    }
}

impl RasterDecoder for StubDecoder {
    type Raster = Pixmap;

    fn decode(&self, png: &[u8]) -> Result<Pixmap> {
        let index =
            ChunkIndex::scan(png).map_err(|e| Error::Decoder(format!("bad frame png: {e}")))?;
        let (width, height) = index
            .canvas_size(png)
            .map_err(|e| Error::Decoder(format!("bad frame png: {e}")))?;
        let tag = index
            .find(ChunkType::IDAT)
            .map(|c| c.data(png)[0])
            .unwrap_or(0);
        Ok(Pixmap::filled(width, height, Self::frame_color(tag)))
    }
}

/// Fails on the given frame indices, delegating to [`StubDecoder`]
/// otherwise.
struct FailingDecoder {
    fail_on: Vec<usize>,
    calls: std::cell::Cell<usize>,
}

impl FailingDecoder {
    fn new(fail_on: &[usize]) -> Self {
        Self {
            fail_on: fail_on.to_vec(),
            calls: std::cell::Cell::new(0),
        }
    }
}

impl RasterDecoder for FailingDecoder {
    type Raster = Pixmap;

    fn decode(&self, png: &[u8]) -> Result<Pixmap> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if self.fail_on.contains(&call) {
            return Err(Error::Decoder(format!("injected failure on frame {call}")));
        }
        StubDecoder.decode(png)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn load_decodes_every_frame() {
    let loaded = load(&three_frame_apng(), &StubDecoder).unwrap();

    assert!(loaded.is_complete());
    assert_eq!(loaded.animation.frame_count(), 3);
    assert_eq!(loaded.rasters.len(), 3);
    assert!(loaded.rasters.iter().all(Option::is_some));
    assert_eq!(loaded.animation.duration_ms, 30.0);
    assert!(!loaded.report.has_warnings());
}

#[test]
fn decode_failure_on_middle_frame_is_tolerated() {
    let loaded = load(&three_frame_apng(), &FailingDecoder::new(&[1])).unwrap();

    assert!(!loaded.is_complete());
    assert_eq!(loaded.decode_errors.len(), 1);
    assert_eq!(loaded.decode_errors[0].0, 1);
    assert!(loaded.rasters[0].is_some());
    assert!(loaded.rasters[1].is_none());
    assert!(loaded.rasters[2].is_some());
}

#[test]
fn decode_failure_on_last_frame_is_fatal() {
    let result = load(&three_frame_apng(), &FailingDecoder::new(&[2]));
    assert!(matches!(result, Err(Error::Decoder(_))));
}

#[test]
fn load_plain_png_single_frame() {
    let src = png_file(&[ihdr(4, 4), chunk(b"IDAT", &[0x05]), chunk(b"IEND", &[])]);
    let loaded = load(&src, &StubDecoder).unwrap();

    assert!(!loaded.animation.is_apng);
    assert_eq!(loaded.animation.frame_count(), 1);
    assert_eq!(loaded.animation.iterations, 0);
}

#[test]
fn probe_detects_animation_control() {
    assert!(probe(&three_frame_apng()));

    let plain = png_file(&[ihdr(4, 4), chunk(b"IDAT", &[0]), chunk(b"IEND", &[])]);
    assert!(!probe(&plain));

    assert!(!probe(b"not a png"));
    assert!(!probe(&[]));
}

// ---------------------------------------------------------------------------
// Loaded animation drives the player
// ---------------------------------------------------------------------------

#[test]
fn loaded_frames_compose_on_the_player_canvas() {
    let loaded = load(&three_frame_apng(), &StubDecoder).unwrap();

    let mut player = Player::new(
        &loaded.animation,
        loaded.rasters,
        Pixmap::new(0, 0),
        Pixmap::new(0, 0),
        PlayerOptions::new(),
    )
    .unwrap();

    // Every frame is a full-canvas source-copy; seeking to frame i leaves
    // exactly frame i's color on the canvas.
    for (pos, expected_tag) in [(0i64, 0x01u8), (1, 0x02), (2, 0x03)] {
        player.set_current_frame(pos);
        assert_eq!(
            player.canvas().pixel(0, 0),
            StubDecoder::frame_color(expected_tag),
            "wrong canvas color at frame {pos}"
        );
    }
}

#[test]
fn synthesized_frames_report_region_dimensions_to_the_decoder() {
    // The decoder sees each standalone PNG with the region-patched IHDR.
    let src = png_file(&[
        ihdr(64, 64),
        actl(1, 0),
        fctl(0, 24, 16, 10, 1000),
        fdat(1, &[0x09]),
        chunk(b"IEND", &[]),
    ]);

    let loaded = load(&src, &StubDecoder).unwrap();
    let raster = loaded.rasters[0].as_ref().unwrap();
    assert_eq!((raster.width(), raster.height()), (24, 16));
}
