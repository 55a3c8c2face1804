//! Decoder state machine core.
//!
//! [`DecoderCore`] holds everything a concrete adapter shares with every
//! other adapter: the protocol state, the first fatal error, the negotiated
//! geometry and pixel format, the instance role and its log sink. Adapters
//! drive it through the transition methods and never touch the fields
//! directly.
//!
//! ```text
//!                 push (no picture)
//!                 ┌──────────┐
//!                 ▼          │
//!  reset ──▶ NeedsMoreData ──┘──push (picture)──▶ RetrieveFrames
//!                 ▲   │                                 │
//!                 │   └──empty push (no picture)──▶ EndOfBitstream
//!                 └──────────── pull ───────────────────┘
//!
//!  any fatal error ──▶ Error (absorbing until reset)
//! ```

use std::fmt;

use rd_common::{
    DecodeError, DecoderRole, DecoderState, FrameGeometry, Subsampling, YuvFormat,
    BIT_DEPTH_RANGE,
};

use crate::log::{LogSink, TracingSink};

/// Values reported by the codec for one completed picture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PictureInfo {
    pub geometry: FrameGeometry,
    pub subsampling: Subsampling,
    pub bit_depth: u32,
}

impl PictureInfo {
    pub fn format(&self) -> YuvFormat {
        YuvFormat::new(self.subsampling, self.bit_depth)
    }
}

/// Protocol state shared by every adapter.
pub struct DecoderCore {
    state: DecoderState,
    error: Option<DecodeError>,
    geometry: Option<FrameGeometry>,
    format: Option<YuvFormat>,
    role: DecoderRole,
    decode_signal: u32,
    log: Box<dyn LogSink>,
}

impl fmt::Debug for DecoderCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderCore")
            .field("state", &self.state)
            .field("error", &self.error)
            .field("geometry", &self.geometry)
            .field("format", &self.format)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl DecoderCore {
    /// A core in `NeedsMoreData` logging through a [`TracingSink`].
    pub fn new(role: DecoderRole) -> Self {
        Self::with_log_sink(role, Box::new(TracingSink::new(role)))
    }

    pub fn with_log_sink(role: DecoderRole, log: Box<dyn LogSink>) -> Self {
        Self {
            state: DecoderState::NeedsMoreData,
            error: None,
            geometry: None,
            format: None,
            role,
            decode_signal: 0,
            log,
        }
    }

    pub fn set_log_sink(&mut self, log: Box<dyn LogSink>) {
        self.log = log;
    }

    // -- Accessors --

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    pub fn geometry(&self) -> Option<FrameGeometry> {
        self.geometry
    }

    pub fn format(&self) -> Option<YuvFormat> {
        self.format
    }

    pub fn role(&self) -> DecoderRole {
        self.role
    }

    pub fn decode_signal(&self) -> u32 {
        self.decode_signal
    }

    pub fn set_decode_signal(&mut self, signal: u32, supported: u32) {
        if signal < supported {
            self.decode_signal = signal;
        }
    }

    pub fn log(&self) -> &dyn LogSink {
        self.log.as_ref()
    }

    // -- Protocol guards --

    /// Check a precondition. A mismatch is caller misuse: logged, not fatal.
    pub fn expect_state(&self, expected: DecoderState, operation: &str) -> bool {
        if self.state == expected {
            return true;
        }
        self.log.debug(format_args!(
            "{operation}: wrong decoder state ({}, expected {expected})",
            self.state
        ));
        false
    }

    // -- Transitions --

    /// Enter `Error`. Only the first reason of an error episode is kept.
    pub fn set_error(&mut self, error: DecodeError) {
        self.log.warn(format_args!("decoder error: {error}"));
        if self.error.is_none() {
            self.error = Some(error);
        }
        self.state = DecoderState::Error;
    }

    /// [`set_error`](Self::set_error) and return `false`.
    pub fn fail(&mut self, error: DecodeError) -> bool {
        self.set_error(error);
        false
    }

    /// A validated picture is ready to be pulled.
    pub fn picture_ready(&mut self) {
        if self.state == DecoderState::NeedsMoreData {
            self.state = DecoderState::RetrieveFrames;
        }
    }

    /// The current picture has been pulled.
    pub fn frame_retrieved(&mut self) {
        if self.state == DecoderState::RetrieveFrames {
            self.state = DecoderState::NeedsMoreData;
        }
    }

    /// An end-of-stream push produced no picture.
    pub fn end_of_bitstream(&mut self) {
        if self.state == DecoderState::NeedsMoreData {
            self.log.debug(format_args!("end of bitstream reached"));
            self.state = DecoderState::EndOfBitstream;
        }
    }

    /// Back to a freshly constructed state: no error, nothing negotiated.
    pub fn reset(&mut self) {
        self.state = DecoderState::NeedsMoreData;
        self.error = None;
        self.geometry = None;
        self.format = None;
    }

    // -- Negotiation --

    /// Validate a completed picture against the negotiated baseline.
    ///
    /// Zero sizes, bit depths outside 8..=16 and unknown subsampling are only
    /// reported as diagnostics here and never become the baseline; assembly
    /// rejects such pictures. The first plausible picture sets the baseline,
    /// and every later picture must match it exactly.
    pub fn negotiate(&mut self, picture: PictureInfo) -> Result<(), DecodeError> {
        let plausible = self.check_plausible(&picture);

        match (self.geometry, self.format) {
            (Some(geometry), Some(format)) => {
                if geometry != picture.geometry {
                    return Err(DecodeError::SizeMismatch {
                        expected: geometry,
                        got: picture.geometry,
                    });
                }
                if format.subsampling != picture.subsampling {
                    return Err(DecodeError::SubsamplingMismatch {
                        expected: format.subsampling,
                        got: picture.subsampling,
                    });
                }
                if format.bits_per_sample != picture.bit_depth {
                    return Err(DecodeError::BitDepthMismatch {
                        expected: format.bits_per_sample,
                        got: picture.bit_depth,
                    });
                }
            }
            _ if plausible => {
                self.geometry = Some(picture.geometry);
                self.format = Some(picture.format());
                self.log.debug(format_args!(
                    "negotiated {} {}",
                    picture.geometry,
                    picture.format()
                ));
            }
            _ => {}
        }
        Ok(())
    }

    fn check_plausible(&self, picture: &PictureInfo) -> bool {
        let mut plausible = true;
        if !picture.geometry.is_valid() {
            self.log
                .warn(format_args!("got invalid size {}", picture.geometry));
            plausible = false;
        }
        if picture.subsampling == Subsampling::Unknown {
            self.log.warn(format_args!("got invalid chroma format"));
            plausible = false;
        }
        if !BIT_DEPTH_RANGE.contains(&picture.bit_depth) {
            self.log
                .warn(format_args!("got invalid bit depth {}", picture.bit_depth));
            plausible = false;
        }
        plausible
    }
}
