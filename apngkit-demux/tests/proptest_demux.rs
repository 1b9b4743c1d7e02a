//! Property-based tests for the demuxer.

use apngkit_core::chunk::{ChunkIndex, ChunkType, PNG_SIGNATURE};
use apngkit_core::crc::Crc32;
use apngkit_demux::demux;
use proptest::prelude::*;

fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let crc = Crc32::new();
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.checksum(ChunkType::new(*tag), data).to_be_bytes());
    out
}

fn apng_from_payloads(payloads: &[Vec<u8>]) -> Vec<u8> {
    let mut out = PNG_SIGNATURE.to_vec();

    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&16u32.to_be_bytes());
    ihdr.extend_from_slice(&16u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);
    out.extend_from_slice(&chunk(b"IHDR", &ihdr));

    let mut actl = Vec::new();
    actl.extend_from_slice(&(payloads.len() as u32).to_be_bytes());
    actl.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&chunk(b"acTL", &actl));

    let mut seq = 0u32;
    for payload in payloads {
        let mut fctl = Vec::new();
        fctl.extend_from_slice(&seq.to_be_bytes());
        fctl.extend_from_slice(&16u32.to_be_bytes());
        fctl.extend_from_slice(&16u32.to_be_bytes());
        fctl.extend_from_slice(&0u32.to_be_bytes());
        fctl.extend_from_slice(&0u32.to_be_bytes());
        fctl.extend_from_slice(&2u16.to_be_bytes());
        fctl.extend_from_slice(&100u16.to_be_bytes());
        fctl.push(0);
        fctl.push(1);
        out.extend_from_slice(&chunk(b"fcTL", &fctl));
        seq += 1;

        let mut fdat = seq.to_be_bytes().to_vec();
        fdat.extend_from_slice(payload);
        out.extend_from_slice(&chunk(b"fdAT", &fdat));
        seq += 1;
    }

    out.extend_from_slice(&chunk(b"IEND", &[]));
    out
}

proptest! {
    /// The demuxer must never panic, whatever bytes it is fed.
    #[test]
    fn demux_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = demux(&data);
    }

    /// A signature plus arbitrary chunk soup still either demuxes or fails
    /// cleanly.
    #[test]
    fn demux_handles_garbage_after_signature(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&tail);
        let _ = demux(&data);
    }

    /// For any frame payload contents, every synthesized standalone PNG is
    /// well-formed: signature, IHDR first, IEND last, valid CRCs throughout,
    /// and it re-parses as a plain single-frame PNG.
    #[test]
    fn synthesized_frames_always_reparse(
        payloads in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 1..64),
            1..6,
        )
    ) {
        let src = apng_from_payloads(&payloads);
        let out = demux(&src).unwrap();
        prop_assert_eq!(out.animation.frame_count(), payloads.len());

        let crc = Crc32::new();
        for frame in &out.animation.frames {
            let png = frame.as_bytes();
            prop_assert_eq!(&png[..8], &PNG_SIGNATURE[..]);

            let index = ChunkIndex::scan(png).unwrap();
            prop_assert_eq!(index.chunks().first().unwrap().chunk_type, ChunkType::IHDR);
            prop_assert_eq!(index.chunks().last().unwrap().chunk_type, ChunkType::IEND);
            for c in index.chunks() {
                prop_assert_eq!(c.stored_crc(png), crc.checksum(c.chunk_type, c.data(png)));
            }

            let again = demux(png).unwrap().animation;
            prop_assert!(!again.is_apng);
            prop_assert_eq!(again.frame_count(), 1);
        }
    }
}
