//! `rd-decoder` — Push/pull raw decoders over dynamically loaded codec libraries.
//!
//! # Architecture
//!
//! External codec libraries are loaded at runtime, so the application can
//! run (with the codec reported as unavailable) on systems without them.
//! Every adapter implements [`rd_common::RawDecoder`]: compressed access
//! units go in through `push_data`, decoded pictures come out of
//! `raw_frame_data` as one contiguous planar buffer.
//!
//! ## Module Overview
//!
//! - [`binding`] — Library loading and typed symbol resolution
//! - [`state`] — Protocol state machine and geometry/format negotiation
//! - [`assemble`] — Strided plane copy into the contiguous output frame
//! - [`log`] — Per-instance log sinks
//! - [`vvcdec`] — libvvcdec (VVC) adapter
//!   - [`vvcdec::ffi`] — Raw bindings and binding table
//!   - [`vvcdec::decoder`] — `RawDecoder` implementation
//! - [`select`] — Picking the adapter from a `DecoderConfig`
//!
//! ## Usage
//!
//! ```ignore
//! use rd_common::{DecoderConfig, DecoderEngine, DecoderRole};
//! use rd_decoder::create_decoder;
//!
//! let config = DecoderConfig::new(DecoderEngine::VvcDec, DecoderRole::Interactive);
//! let mut decoder = create_decoder(&config);
//! if let Some(reason) = decoder.error_string() {
//!     eprintln!("VVC decoding unavailable: {reason}");
//! }
//! ```

pub mod assemble;
pub mod binding;
pub mod log;
pub mod select;
pub mod state;
pub mod vvcdec;

pub use assemble::{assemble_frame, frame_layout, FrameLayout, PictureSource, PlaneLayout, PlaneView};
pub use binding::{LoadedLibrary, SymbolResolver, SymbolSource};
pub use log::{LogSink, NullSink, TracingSink};
pub use select::{check_library_file, create_decoder};
pub use state::{DecoderCore, PictureInfo};
pub use vvcdec::{VvcDecFunctions, VvcDecoder};
