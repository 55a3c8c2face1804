//! Decoder capability interface.
//!
//! Every concrete external-codec adapter implements [`RawDecoder`]. Callers
//! program against the trait and pick the concrete variant at configuration
//! time.

use std::fmt;
use std::path::PathBuf;

use crate::color::YuvFormat;
use crate::config::DecoderRole;
use crate::error::DecodeError;
use crate::types::FrameGeometry;

/// Protocol state of a decoder instance. Exactly one is active at any time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecoderState {
    /// Accepts `push_data`. Push an empty slice to signal the end of the stream.
    #[default]
    NeedsMoreData,
    /// A picture is ready; retrieve it with `raw_frame_data`.
    RetrieveFrames,
    /// Decoding has ended. Terminal until reset.
    EndOfBitstream,
    /// A fatal error occurred. Absorbing until reset.
    Error,
}

impl fmt::Display for DecoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NeedsMoreData => "needs more data",
            Self::RetrieveFrames => "retrieve frames",
            Self::EndOfBitstream => "end of bitstream",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// One loaded library: display name, file name and full path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryInfo {
    pub name: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Push-data / pull-frame decoder protocol.
///
/// 1. Push access units (start codes already stripped) while
///    [`needs_more_data`](RawDecoder::needs_more_data) is true. Push an empty
///    slice once the whole bitstream has been pushed.
/// 2. When [`decode_frames`](RawDecoder::decode_frames) is true, pull the
///    picture once with [`raw_frame_data`](RawDecoder::raw_frame_data).
/// 3. Go back to 1.
///
/// Wrong-state calls return `false` / `None` and change nothing. Fatal errors
/// move the decoder into [`DecoderState::Error`] until
/// [`reset_decoder`](RawDecoder::reset_decoder) is called.
pub trait RawDecoder: Send {
    /// Push one access unit. Returns `false` if the call was not accepted.
    fn push_data(&mut self, data: &[u8]) -> bool;

    /// Re-validate the current picture while in `RetrieveFrames`.
    fn decode_next_frame(&mut self) -> bool;

    /// Assemble and return the current picture as one contiguous buffer.
    ///
    /// Planes are concatenated luma, chroma U, chroma V (chroma absent for
    /// 4:0:0), row-major without padding. Returns `None` outside
    /// `RetrieveFrames` or if assembly fails.
    fn raw_frame_data(&mut self) -> Option<&[u8]>;

    /// Drop the external decoder instance and start over with a fresh one.
    ///
    /// Clears the error and the negotiated geometry and format. Use this
    /// after seeking or to recover from an error.
    fn reset_decoder(&mut self);

    fn state(&self) -> DecoderState;

    /// The reason for the current `Error` state.
    fn error(&self) -> Option<&DecodeError>;

    /// Negotiated luma plane size, once established.
    fn frame_geometry(&self) -> Option<FrameGeometry>;

    /// Negotiated pixel format, once established.
    fn pixel_format(&self) -> Option<YuvFormat>;

    /// Libraries in use by this decoder.
    fn library_paths(&self) -> Vec<LibraryInfo>;

    /// Decoder identification, including version information when available.
    fn decoder_name(&self) -> String;

    fn codec_name(&self) -> &'static str;

    fn role(&self) -> DecoderRole;

    fn needs_more_data(&self) -> bool {
        self.state() == DecoderState::NeedsMoreData
    }

    fn decode_frames(&self) -> bool {
        self.state() == DecoderState::RetrieveFrames
    }

    fn error_in_decoder(&self) -> bool {
        self.state() == DecoderState::Error
    }

    fn error_string(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Names of the signals this decoder can produce.
    fn signal_names(&self) -> Vec<&'static str> {
        vec!["Reconstruction"]
    }

    fn decode_signal(&self) -> u32 {
        0
    }

    /// Select a signal. Returns whether a decoder reset is needed.
    fn set_decode_signal(&mut self, _signal: u32) -> bool {
        false
    }
}
