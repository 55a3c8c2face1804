//! Configuration-time decoder variant selection.
//!
//! Callers hold a `Box<dyn RawDecoder>` and never inspect the concrete type;
//! the engine named in the [`DecoderConfig`] picks the adapter.

use std::path::Path;

use tracing::{info, warn};

use rd_common::{DecodeError, DecoderConfig, DecoderEngine, RawDecoder};

use crate::vvcdec::VvcDecoder;

/// Create the decoder for `config.engine`.
///
/// Never fails: a decoder whose library could not be bound is returned in
/// the `Error` state with the reason available through `error_string()`.
pub fn create_decoder(config: &DecoderConfig) -> Box<dyn RawDecoder> {
    let decoder: Box<dyn RawDecoder> = match config.engine {
        DecoderEngine::VvcDec => Box::new(VvcDecoder::new(config)),
    };

    match decoder.error() {
        Some(e) => warn!(
            engine = %config.engine.display_name(),
            role = %config.role,
            error = %e,
            "Decoder unavailable"
        ),
        None => info!(
            engine = %config.engine.display_name(),
            role = %config.role,
            name = %decoder.decoder_name(),
            "Decoder created"
        ),
    }
    decoder
}

/// Validate a candidate library file for `engine` without creating a decoder.
pub fn check_library_file(engine: DecoderEngine, path: &Path) -> Result<(), DecodeError> {
    match engine {
        DecoderEngine::VvcDec => VvcDecoder::check_library_file(path),
    }
}
