//! Annex-B byte stream splitting.
//!
//! NAL units are separated by `00 00 01` or `00 00 00 01`. Units are returned
//! with the start code removed; zero bytes in front of a start code (the
//! leading zero of a 4-byte start code, or `trailing_zero_8bits`) are trimmed
//! from the preceding unit.

use std::ops::Range;

use rd_common::DemuxError;

use crate::nal::{find_start_code, START_CODE_PREFIX};

/// Iterator over the NAL units of an Annex-B byte stream.
///
/// Bytes before the first start code are skipped; empty units are skipped.
#[derive(Clone, Debug)]
pub struct AnnexBUnits<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> AnnexBUnits<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Byte range (within the stream) of the next unit.
    pub fn next_range(&mut self) -> Option<Range<usize>> {
        loop {
            let start = find_start_code(self.data, self.pos)? + START_CODE_PREFIX.len();
            let next = find_start_code(self.data, start).unwrap_or(self.data.len());

            let mut end = next;
            while end > start && self.data[end - 1] == 0 {
                end -= 1;
            }
            self.pos = next;

            if end > start {
                return Some(start..end);
            }
        }
    }
}

impl<'a> Iterator for AnnexBUnits<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        self.next_range().map(|range| &data[range])
    }
}

/// Byte ranges of every unit in an Annex-B stream.
///
/// # Errors
/// `DemuxError::NoStartCode` for a non-empty stream without any start code.
pub fn annexb_ranges(data: &[u8]) -> Result<Vec<Range<usize>>, DemuxError> {
    if !data.is_empty() && find_start_code(data, 0).is_none() {
        return Err(DemuxError::NoStartCode {
            searched: data.len(),
        });
    }
    let mut units = AnnexBUnits::new(data);
    Ok(std::iter::from_fn(|| units.next_range()).collect())
}

/// Split an Annex-B stream into NAL units with start codes stripped.
pub fn split_annexb(data: &[u8]) -> Result<Vec<&[u8]>, DemuxError> {
    Ok(annexb_ranges(data)?
        .into_iter()
        .map(|range| &data[range])
        .collect())
}
