//! Chroma subsampling, plane components and the YUV pixel format descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::FrameGeometry;

/// Relationship between chroma plane resolution and luma plane resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsampling {
    /// Monochrome: luma plane only.
    Yuv400,
    /// Chroma at half width and half height.
    Yuv420,
    /// Chroma at half width, full height.
    Yuv422,
    /// Chroma at full resolution.
    Yuv444,
    /// The codec reported a chroma format we do not recognise.
    Unknown,
}

impl Subsampling {
    /// Number of planes in the assembled output (1 for 4:0:0, otherwise 3).
    pub fn plane_count(self) -> usize {
        match self {
            Self::Yuv400 => 1,
            _ => 3,
        }
    }

    /// Expected size of each chroma plane for a given luma size.
    ///
    /// Returns `None` for monochrome and unknown subsampling.
    pub fn chroma_geometry(self, luma: FrameGeometry) -> Option<FrameGeometry> {
        let (w, h) = (luma.width, luma.height);
        match self {
            Self::Yuv420 => Some(FrameGeometry::new(w.div_ceil(2), h.div_ceil(2))),
            Self::Yuv422 => Some(FrameGeometry::new(w.div_ceil(2), h)),
            Self::Yuv444 => Some(luma),
            Self::Yuv400 | Self::Unknown => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Yuv400 => "4:0:0",
            Self::Yuv420 => "4:2:0",
            Self::Yuv422 => "4:2:2",
            Self::Yuv444 => "4:4:4",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Subsampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One color component's sample grid, in output order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneComponent {
    Luma,
    ChromaU,
    ChromaV,
}

impl PlaneComponent {
    /// All components in the order they are concatenated in a raw frame.
    pub const ALL: [Self; 3] = [Self::Luma, Self::ChromaU, Self::ChromaV];

    pub fn name(self) -> &'static str {
        match self {
            Self::Luma => "luma",
            Self::ChromaU => "chroma U",
            Self::ChromaV => "chroma V",
        }
    }
}

impl fmt::Display for PlaneComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Valid range for bits per sample.
pub const BIT_DEPTH_RANGE: std::ops::RangeInclusive<u32> = 8..=16;

/// Pixel format descriptor: chroma subsampling plus bits per sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YuvFormat {
    pub subsampling: Subsampling,
    pub bits_per_sample: u32,
}

impl YuvFormat {
    pub const fn new(subsampling: Subsampling, bits_per_sample: u32) -> Self {
        Self {
            subsampling,
            bits_per_sample,
        }
    }

    /// Known subsampling and a bit depth within 8..=16.
    pub fn is_valid(self) -> bool {
        self.subsampling != Subsampling::Unknown && BIT_DEPTH_RANGE.contains(&self.bits_per_sample)
    }

    /// Bytes used to store one sample: 1 up to 8 bits, 2 above.
    pub fn bytes_per_sample(self) -> usize {
        sample_width(self.bits_per_sample)
    }

    /// Size in bytes of one plane-concatenated raw frame of `geometry`.
    ///
    /// Returns `None` when the subsampling is unknown.
    pub fn frame_size(self, geometry: FrameGeometry) -> Option<usize> {
        let luma = geometry.sample_count();
        let chroma = match self.subsampling {
            Subsampling::Yuv400 => 0,
            Subsampling::Unknown => return None,
            other => other.chroma_geometry(geometry)?.sample_count(),
        };
        Some((luma + 2 * chroma) * self.bytes_per_sample())
    }
}

impl fmt::Display for YuvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YUV {} {}-bit", self.subsampling, self.bits_per_sample)
    }
}

/// Storage width in bytes for a sample of the given bit depth.
pub fn sample_width(bits_per_sample: u32) -> usize {
    if bits_per_sample > 8 {
        2
    } else {
        1
    }
}
