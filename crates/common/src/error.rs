//! Central error types (thiserror-based).

use thiserror::Error;

use crate::color::{PlaneComponent, Subsampling};
use crate::types::FrameGeometry;

/// Fatal decoder errors.
///
/// Every variant drives the decoder into its `Error` state; the `Display`
/// text is the reason string reported to callers. Wrong-state calls are not
/// represented here: they are reported through `bool` / `Option` results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    // -- Binding --
    #[error("Unable to load decoder library (tried {}): {reason}", .tried.join(", "))]
    LibraryNotFound { tried: Vec<String>, reason: String },

    #[error("Error loading the {library} library: can't find function {symbol}")]
    MissingSymbol { library: String, symbol: String },

    #[error("Creating a new decoder instance failed ({call})")]
    DecoderCreation { call: &'static str },

    #[error("Reset: freeing the decoder failed (error code {code})")]
    FreeFailed { code: i32 },

    // -- Ingest --
    #[error("Error pushing data to decoder ({call}) length {length}")]
    PushFailed { call: &'static str, length: usize },

    // -- Negotiation --
    #[error("Received a frame of different size: expected {expected}, got {got}")]
    SizeMismatch {
        expected: FrameGeometry,
        got: FrameGeometry,
    },

    #[error("Received a frame with different subsampling: expected {expected}, got {got}")]
    SubsamplingMismatch {
        expected: Subsampling,
        got: Subsampling,
    },

    #[error("Received a frame with different bit depth: expected {expected}, got {got}")]
    BitDepthMismatch { expected: u32, got: u32 },

    // -- Assembly --
    #[error("Picture format is unknown")]
    UnknownChromaFormat,

    #[error("Invalid picture size {0}")]
    InvalidPictureSize(FrameGeometry),

    #[error("Invalid bit depth {bits} for {component}")]
    InvalidBitDepth { component: PlaneComponent, bits: u32 },

    #[error("Different bit depth in YUV components is not supported ({component} has {bits} bits, luma has {luma_bits})")]
    MixedSampleWidth {
        component: PlaneComponent,
        bits: u32,
        luma_bits: u32,
    },

    #[error("Chroma components have different size (U {u}, V {v})")]
    ChromaSizeMismatch { u: FrameGeometry, v: FrameGeometry },

    #[error("Unable to get plane for component {0}")]
    MissingPlane(PlaneComponent),

    #[error("Invalid stride {stride} for {component}: a row needs {row_bytes} bytes")]
    InvalidStride {
        component: PlaneComponent,
        stride: isize,
        row_bytes: usize,
    },
}

/// Bitstream reading errors.
#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("No start code found in the first {searched} bytes of the stream")]
    NoStartCode { searched: usize },

    #[error("Invalid length prefix size {0} (expected 1 to 4)")]
    InvalidLengthSize(u8),

    #[error("Truncated unit at offset {offset}: {needed} bytes announced, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings persistence errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiation_messages_name_the_attribute() {
        let size = DecodeError::SizeMismatch {
            expected: FrameGeometry::new(16, 16),
            got: FrameGeometry::new(32, 16),
        };
        assert!(size.to_string().contains("different size"));
        assert!(size.to_string().contains("16x16"));

        let sub = DecodeError::SubsamplingMismatch {
            expected: Subsampling::Yuv420,
            got: Subsampling::Yuv444,
        };
        assert!(sub.to_string().contains("different subsampling"));

        let depth = DecodeError::BitDepthMismatch {
            expected: 8,
            got: 10,
        };
        assert!(depth.to_string().contains("different bit depth"));
    }

    #[test]
    fn binding_messages_name_the_symbol() {
        let err = DecodeError::MissingSymbol {
            library: "libvvcdec.so".into(),
            symbol: "libvvcdec_get_picture_plane".into(),
        };
        assert!(err.to_string().contains("libvvcdec_get_picture_plane"));

        let err = DecodeError::LibraryNotFound {
            tried: vec!["a.so".into(), "b.so".into()],
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("a.so, b.so"));
    }

    #[test]
    fn push_message_names_call_and_length() {
        let err = DecodeError::PushFailed {
            call: "libvvcdec_push_nal_unit",
            length: 42,
        };
        let text = err.to_string();
        assert!(text.contains("libvvcdec_push_nal_unit"));
        assert!(text.contains("42"));
    }
}
