//! `rd-common` — Shared types, traits, errors and configuration for the raw decoder bridge.
//!
//! This crate is the foundation the decoder, demux and helper crates depend on:
//!
//! - **Types**: `FrameGeometry` (luma plane size)
//! - **Color**: `Subsampling`, `PlaneComponent`, `YuvFormat` (pixel format descriptor)
//! - **Traits**: `RawDecoder` (push/pull capability interface), `DecoderState`
//! - **Errors**: `DecodeError`, `DemuxError`, `ConfigError` (thiserror-based)
//! - **Config**: `DecoderSettings` (persisted), `DecoderConfig` (per instance), `DecoderRole`

pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use codec::DecoderEngine;
pub use color::{sample_width, PlaneComponent, Subsampling, YuvFormat, BIT_DEPTH_RANGE};
pub use config::{DecoderConfig, DecoderRole, DecoderSettings};
pub use error::{ConfigError, DecodeError, DecodeResult, DemuxError};
pub use traits::{DecoderState, LibraryInfo, RawDecoder};
pub use types::FrameGeometry;
