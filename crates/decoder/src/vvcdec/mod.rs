//! libvvcdec (VVC / H.266) decoder adapter.
//!
//! libvvcdec is loaded dynamically at runtime, so the application keeps
//! working (with VVC decoding reported as unavailable) when the library is
//! not installed.
//!
//! # Module Structure
//!
//! - [`ffi`] — Raw bindings and the typed [`VvcDecFunctions`] table.
//! - [`decoder`] — [`VvcDecoder`], the `RawDecoder` implementation.
//!
//! # Usage
//!
//! ```ignore
//! use rd_common::{DecoderConfig, RawDecoder};
//! use rd_decoder::vvcdec::VvcDecoder;
//!
//! let mut decoder = VvcDecoder::new(&DecoderConfig::default());
//! for unit in units {
//!     decoder.push_data(&unit);
//!     while decoder.decode_frames() {
//!         let frame = decoder.raw_frame_data();
//!         // copy or write the frame before the next push
//!     }
//! }
//! ```

pub mod decoder;
pub mod ffi;

pub use decoder::VvcDecoder;
pub use ffi::VvcDecFunctions;
