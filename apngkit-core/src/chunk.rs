//! PNG chunk scanning.
//!
//! A PNG file is the 8-byte signature followed by a sequence of chunks, each
//! framed as `[u32 length BE][4-byte type][data][u32 crc]`. The scanner
//! records the type and byte range of every chunk without copying data; the
//! source buffer stays the single owner of the bytes.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use std::fmt;

/// PNG signature bytes.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Per-chunk overhead: 4-byte length, 4-byte type, 4-byte CRC.
pub const CHUNK_OVERHEAD: usize = 12;

/// PNG chunk type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType([u8; 4]);

impl ChunkType {
    /// IHDR - Image header.
    pub const IHDR: Self = Self(*b"IHDR");
    /// PLTE - Palette.
    pub const PLTE: Self = Self(*b"PLTE");
    /// IDAT - Image data.
    pub const IDAT: Self = Self(*b"IDAT");
    /// IEND - Image end.
    pub const IEND: Self = Self(*b"IEND");
    /// acTL - Animation control.
    pub const ACTL: Self = Self(*b"acTL");
    /// fcTL - Frame control.
    pub const FCTL: Self = Self(*b"fcTL");
    /// fdAT - Frame data.
    pub const FDAT: Self = Self(*b"fdAT");
    /// gAMA - Gamma.
    pub const GAMA: Self = Self(*b"gAMA");
    /// pHYs - Physical pixel dimensions.
    pub const PHYS: Self = Self(*b"pHYs");
    /// tRNS - Transparency.
    pub const TRNS: Self = Self(*b"tRNS");
    /// iCCP - Embedded ICC profile.
    pub const ICCP: Self = Self(*b"iCCP");
    /// sRGB - Standard RGB color space.
    pub const SRGB: Self = Self(*b"sRGB");
    /// sBIT - Significant bits.
    pub const SBIT: Self = Self(*b"sBIT");
    /// sPLT - Suggested palette.
    pub const SPLT: Self = Self(*b"sPLT");

    /// Create from bytes.
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Check if the chunk is critical (uppercase first letter).
    pub fn is_critical(&self) -> bool {
        (self.0[0] & 0x20) == 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A non-owning reference to one chunk inside a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk type tag.
    pub chunk_type: ChunkType,
    /// Byte offset of the chunk's data within the source buffer.
    pub data_offset: u32,
    /// Length of the data in bytes.
    pub length: u32,
}

impl Chunk {
    /// Resolve the chunk's data slice against the source buffer.
    pub fn data<'a>(&self, src: &'a [u8]) -> &'a [u8] {
        let start = self.data_offset as usize;
        &src[start..start + self.length as usize]
    }

    /// Resolve the fully framed chunk (length, type, data, CRC) against the
    /// source buffer.
    pub fn framed<'a>(&self, src: &'a [u8]) -> &'a [u8] {
        let start = self.data_offset as usize - 8;
        &src[start..start + self.length as usize + CHUNK_OVERHEAD]
    }

    /// Read the chunk's stored CRC field.
    pub fn stored_crc(&self, src: &[u8]) -> u32 {
        let at = self.data_offset as usize + self.length as usize;
        BigEndian::read_u32(&src[at..at + 4])
    }

    /// Byte offset of the chunk's length field.
    pub fn header_offset(&self) -> usize {
        self.data_offset as usize - 8
    }
}

/// An index over all chunks of a PNG byte buffer.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    chunks: Vec<Chunk>,
}

impl ChunkIndex {
    /// Scan a PNG byte buffer into a chunk index.
    ///
    /// Fails with [`Error::BadSignature`] if the buffer does not start with
    /// the PNG signature. A trailing chunk whose declared extent runs past
    /// the buffer ends the walk; the truncated tail is dropped. CRCs are not
    /// verified here.
    pub fn scan(data: &[u8]) -> Result<Self> {
        if data.len() < PNG_SIGNATURE.len() || data[..8] != PNG_SIGNATURE {
            return Err(Error::BadSignature);
        }

        let mut chunks = Vec::new();
        let mut pos = PNG_SIGNATURE.len();

        while pos + 8 <= data.len() {
            let length = BigEndian::read_u32(&data[pos..pos + 4]);
            let mut tag = [0u8; 4];
            tag.copy_from_slice(&data[pos + 4..pos + 8]);

            let end = pos + CHUNK_OVERHEAD + length as usize;
            if end > data.len() {
                tracing::warn!(
                    offset = pos,
                    needed = end - pos,
                    available = data.len() - pos,
                    "dropping truncated trailing chunk"
                );
                break;
            }

            chunks.push(Chunk {
                chunk_type: ChunkType::new(tag),
                data_offset: (pos + 8) as u32,
                length,
            });
            pos = end;
        }

        Ok(Self { chunks })
    }

    /// All scanned chunks, in source order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Check whether any chunk of the given type is present.
    pub fn contains(&self, chunk_type: ChunkType) -> bool {
        self.chunks.iter().any(|c| c.chunk_type == chunk_type)
    }

    /// Find the first chunk of the given type.
    pub fn find(&self, chunk_type: ChunkType) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.chunk_type == chunk_type)
    }

    /// Read the canvas dimensions from the IHDR chunk.
    ///
    /// The first chunk must be IHDR, else [`Error::BadPng`].
    pub fn canvas_size(&self, src: &[u8]) -> Result<(u32, u32)> {
        let first = self.chunks.first().ok_or(Error::BadPng)?;
        if first.chunk_type != ChunkType::IHDR || first.length < 8 {
            return Err(Error::BadPng);
        }
        let data = first.data(src);
        Ok((read_u32_be(data), read_u32_be(&data[4..])))
    }
}

/// Read a big-endian u32 from the start of a slice.
#[inline]
pub fn read_u32_be(data: &[u8]) -> u32 {
    BigEndian::read_u32(data)
}

/// Read a big-endian u16 from the start of a slice.
#[inline]
pub fn read_u16_be(data: &[u8]) -> u16 {
    BigEndian::read_u16(data)
}
