//! Persistent decoder settings and per-instance decoder configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::DecoderEngine;
use crate::error::ConfigError;

/// Whether a decoder instance serves interactive display or background caching.
///
/// Purely a behavioral hint: it tags log output and lets callers run a second,
/// fully isolated instance for prefetching. It never changes the protocol.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderRole {
    #[default]
    Interactive,
    Caching,
}

impl DecoderRole {
    pub fn is_caching(self) -> bool {
        self == Self::Caching
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Caching => "caching",
        }
    }
}

impl fmt::Display for DecoderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-level decoder settings, persisted as JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// Explicit libvvcdec file. When set, no other location is tried.
    pub vvcdec_library: Option<PathBuf>,
    /// Additional directories searched for decoder libraries.
    pub search_dirs: Vec<PathBuf>,
}

impl DecoderSettings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write settings to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// The configured library file for an engine, if any.
    pub fn library_file(&self, engine: DecoderEngine) -> Option<&Path> {
        match engine {
            DecoderEngine::VvcDec => self.vvcdec_library.as_deref(),
        }
    }
}

/// Construction parameters for one decoder instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecoderConfig {
    pub engine: DecoderEngine,
    pub role: DecoderRole,
    /// Load exactly this file instead of searching for the library.
    pub library_file: Option<PathBuf>,
    /// Extra directories searched before the platform loader path.
    pub search_dirs: Vec<PathBuf>,
    /// Index of the decoded signal (0 = reconstruction).
    pub decode_signal: u32,
}

impl DecoderConfig {
    pub fn new(engine: DecoderEngine, role: DecoderRole) -> Self {
        Self {
            engine,
            role,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &DecoderSettings, engine: DecoderEngine, role: DecoderRole) -> Self {
        Self {
            engine,
            role,
            library_file: settings.library_file(engine).map(Path::to_path_buf),
            search_dirs: settings.search_dirs.clone(),
            decode_signal: 0,
        }
    }

    pub fn with_library_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_file = Some(path.into());
        self
    }
}
