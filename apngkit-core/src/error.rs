//! Error types for the apngkit workspace.

use crate::chunk::ChunkType;
use thiserror::Error;

/// Errors raised while demuxing or loading an animation.
#[derive(Error, Debug)]
pub enum Error {
    /// The leading 8 bytes are not the PNG signature.
    #[error("Bad PNG signature")]
    BadSignature,

    /// The first chunk is not IHDR.
    #[error("Not a valid PNG: first chunk is not IHDR")]
    BadPng,

    /// The input kind cannot be resolved to a byte buffer.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// The external raster decoder rejected a synthesized frame.
    #[error("Raster decoder error: {0}")]
    Decoder(String),

    /// A chunk's declared extent runs past the end of the buffer.
    #[error("Truncated chunk at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedChunk {
        /// Byte offset of the chunk's length field.
        offset: usize,
        /// Bytes required by the declared chunk extent.
        needed: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },
}

/// Non-fatal anomalies observed during a best-effort parse.
///
/// Warnings are collected in the demux report and logged; they never alter
/// the produced output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The fcTL count does not match the frame count declared by acTL.
    #[error("Frame count mismatch: acTL declares {declared}, found {actual} fcTL chunks")]
    FrameCountMismatch {
        /// Frame count from the acTL chunk.
        declared: u32,
        /// Number of fcTL chunks actually present.
        actual: u32,
    },

    /// fcTL/fdAT sequence numbers are not monotonically non-decreasing.
    #[error("Sequence number out of order: expected at least {expected}, found {found}")]
    SequenceOutOfOrder {
        /// Lowest acceptable sequence number at this position.
        expected: u32,
        /// Sequence number actually read.
        found: u32,
    },

    /// A chunk's stored CRC does not match the recomputed value.
    #[error("CRC mismatch in {chunk_type} chunk at offset {offset}")]
    CrcMismatch {
        /// Type of the offending chunk.
        chunk_type: ChunkType,
        /// Byte offset of the chunk's length field.
        offset: usize,
    },
}

/// Result type alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::BadSignature.to_string(), "Bad PNG signature");

        let err = Error::TruncatedChunk {
            offset: 33,
            needed: 64,
            available: 12,
        };
        assert!(err.to_string().contains("offset 33"));
        assert!(err.to_string().contains("have 12"));
    }

    #[test]
    fn test_warning_display() {
        let warn = Warning::FrameCountMismatch {
            declared: 4,
            actual: 3,
        };
        assert!(warn.to_string().contains("declares 4"));
        assert!(warn.to_string().contains("3 fcTL"));

        let warn = Warning::CrcMismatch {
            chunk_type: ChunkType::FCTL,
            offset: 57,
        };
        assert!(warn.to_string().contains("fcTL"));
    }
}
