//! `rd-demux` — Raw bitstream splitting for the decoder bridge.
//!
//! Splits VVC elementary streams into the units pushed to a `RawDecoder`:
//! Annex-B start code streams and length-prefixed streams, with framing
//! stripped. No container parsing.

pub mod annexb;
pub mod file;
pub mod length;
pub mod nal;
pub mod traits;

pub use annexb::{annexb_ranges, split_annexb, AnnexBUnits};
pub use file::{BitstreamFile, Framing};
pub use length::{length_prefixed_ranges, split_length_prefixed};
pub use nal::{nal_unit_type, NalHeader, VvcNalType, ANNEXB_START_CODE};
pub use traits::UnitSource;
