//! Decoder engine identifiers.

use serde::{Deserialize, Serialize};

/// A concrete external codec library the bridge knows how to drive.
///
/// The variant is chosen at configuration time; each one maps to exactly one
/// adapter implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecoderEngine {
    /// libvvcdec (H.266/VVC).
    #[default]
    VvcDec,
}

impl DecoderEngine {
    /// Name used when the library cannot report its own version.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::VvcDec => "VVCDec",
        }
    }

    /// Codec decoded by this engine.
    pub fn codec_name(self) -> &'static str {
        match self {
            Self::VvcDec => "VVC",
        }
    }

    /// Platform-specific file names tried when no library file is configured.
    pub fn library_names(self) -> &'static [&'static str] {
        match self {
            Self::VvcDec => {
                if cfg!(target_os = "windows") {
                    &["libvvcdec.dll"]
                } else if cfg!(target_os = "macos") {
                    &["libvvcdec.dylib"]
                } else {
                    &["libvvcdec.so", "libvvcdec.so.1"]
                }
            }
        }
    }
}
