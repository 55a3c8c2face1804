//! Whole-file bitstream reading.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use rd_common::DemuxError;

use crate::annexb::annexb_ranges;
use crate::length::length_prefixed_ranges;
use crate::nal::nal_unit_type;
use crate::traits::UnitSource;

/// How units are delimited in a raw bitstream file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Framing {
    /// Start codes (`.vvc`, `.266`, `.bin` elementary streams).
    #[default]
    AnnexB,
    /// Big-endian length fields of the given size in bytes.
    LengthPrefixed(u8),
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnnexB => f.write_str("Annex-B"),
            Self::LengthPrefixed(size) => write!(f, "{size}-byte length prefixed"),
        }
    }
}

/// A bitstream file read into memory and split into units.
pub struct BitstreamFile {
    path: PathBuf,
    data: Vec<u8>,
    units: Vec<Range<usize>>,
    next: usize,
    framing: Framing,
}

impl fmt::Debug for BitstreamFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitstreamFile")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .field("units", &self.units.len())
            .field("next", &self.next)
            .field("framing", &self.framing)
            .finish()
    }
}

impl BitstreamFile {
    /// Read and split a whole file.
    pub fn open(path: &Path, framing: Framing) -> Result<Self, DemuxError> {
        let data = fs::read(path)?;
        let file = Self::from_bytes(data, framing)?.with_path(path);
        info!(
            path = %path.display(),
            bytes = file.data.len(),
            units = file.units.len(),
            framing = %framing,
            "Opened bitstream"
        );
        Ok(file)
    }

    /// Split an in-memory bitstream.
    pub fn from_bytes(data: Vec<u8>, framing: Framing) -> Result<Self, DemuxError> {
        let units = match framing {
            Framing::AnnexB => annexb_ranges(&data)?,
            Framing::LengthPrefixed(size) => length_prefixed_ranges(&data, size)?,
        };
        Ok(Self {
            path: PathBuf::new(),
            data,
            units,
            next: 0,
            framing,
        })
    }

    fn with_path(mut self, path: &Path) -> Self {
        self.path = path.to_path_buf();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// All units, regardless of the read position.
    pub fn units(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.units.iter().map(|range| &self.data[range.clone()])
    }
}

impl UnitSource for BitstreamFile {
    fn next_unit(&mut self) -> Option<&[u8]> {
        let range = self.units.get(self.next)?.clone();
        self.next += 1;
        let unit = &self.data[range];
        debug!(
            index = self.next - 1,
            len = unit.len(),
            nal_type = ?nal_unit_type(unit),
            "Read unit"
        );
        Some(unit)
    }

    fn reset(&mut self) {
        self.next = 0;
    }

    fn unit_count(&self) -> Option<usize> {
        Some(self.units.len())
    }
}
