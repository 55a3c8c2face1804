//! Core geometry types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Picture size in samples of the luma (primary) plane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero.
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn sample_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
