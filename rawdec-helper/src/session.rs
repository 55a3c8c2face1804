//! Decode session: drives a `RawDecoder` from a unit source into a writer.

use std::fmt;
use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use rd_common::{DecoderState, RawDecoder};
use rd_demux::UnitSource;

/// Counters for one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub units_pushed: usize,
    pub frames: usize,
    pub bytes_written: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} units pushed, {} frames, {} bytes written",
            self.units_pushed, self.frames, self.bytes_written
        )
    }
}

/// Push units, pull every picture as soon as it is ready, then flush the
/// decoder with end-of-stream pushes until it reports the end of the
/// bitstream.
///
/// The session never resets or retries: a fatal decoder error ends it with
/// the decoder's reason.
pub struct DecodeSession<'a> {
    decoder: &'a mut dyn RawDecoder,
    max_frames: Option<usize>,
    stats: SessionStats,
}

impl<'a> DecodeSession<'a> {
    pub fn new(decoder: &'a mut dyn RawDecoder) -> Self {
        Self {
            decoder,
            max_frames: None,
            stats: SessionStats::default(),
        }
    }

    /// Stop after this many frames.
    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn run<S, W>(&mut self, source: &mut S, out: &mut W) -> Result<SessionStats>
    where
        S: UnitSource + ?Sized,
        W: Write + ?Sized,
    {
        while !self.frame_limit_reached() {
            let Some(unit) = source.next_unit() else {
                break;
            };
            if !self.decoder.push_data(unit) {
                self.check_decoder()?;
                bail!(
                    "decoder refused unit {} in state {}",
                    self.stats.units_pushed,
                    self.decoder.state()
                );
            }
            self.stats.units_pushed += 1;
            self.drain(out)?;
        }

        // End of stream: keep pushing the empty marker until the decoder is done.
        while !self.frame_limit_reached() {
            match self.decoder.state() {
                DecoderState::NeedsMoreData => {
                    if !self.decoder.push_data(&[]) {
                        self.check_decoder()?;
                    }
                }
                DecoderState::RetrieveFrames => self.drain(out)?,
                DecoderState::EndOfBitstream => {
                    debug!("end of bitstream");
                    break;
                }
                DecoderState::Error => {
                    self.check_decoder()?;
                    bail!("{} decoder entered the error state", self.decoder.decoder_name());
                }
            }
        }

        info!(
            units = self.stats.units_pushed,
            frames = self.stats.frames,
            bytes = self.stats.bytes_written,
            "Decode session finished"
        );
        Ok(self.stats)
    }

    fn frame_limit_reached(&self) -> bool {
        self.max_frames.is_some_and(|max| self.stats.frames >= max)
    }

    /// Pull and write every picture that is ready.
    fn drain<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<()> {
        while self.decoder.decode_frames() && !self.frame_limit_reached() {
            let Some(frame) = self.decoder.raw_frame_data() else {
                self.check_decoder()?;
                break;
            };
            out.write_all(frame)
                .with_context(|| format!("writing frame {}", self.stats.frames))?;
            let len = frame.len();

            if self.stats.frames == 0 {
                self.log_output_layout(len);
            }
            self.stats.frames += 1;
            self.stats.bytes_written += len as u64;
        }
        self.check_decoder()
    }

    fn log_output_layout(&self, frame_len: usize) {
        let (Some(geometry), Some(format)) =
            (self.decoder.frame_geometry(), self.decoder.pixel_format())
        else {
            return;
        };
        info!(
            size = %geometry,
            format = %format,
            frame_bytes = frame_len,
            expected_bytes = ?format.frame_size(geometry),
            "Output layout"
        );
    }

    fn check_decoder(&self) -> Result<()> {
        match self.decoder.error_string() {
            Some(reason) if self.decoder.error_in_decoder() => {
                bail!("{} decoder error: {reason}", self.decoder.decoder_name())
            }
            _ => Ok(()),
        }
    }
}
