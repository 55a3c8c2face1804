//! Length-prefixed unit splitting (`[length][NAL data]...`, as stored in
//! ISO BMFF samples).

use std::ops::Range;

use rd_common::DemuxError;

/// Byte ranges of every unit in a length-prefixed stream.
///
/// `length_size` is the size of the big-endian length field (1 to 4 bytes).
/// Zero-length units are skipped.
///
/// # Errors
/// `InvalidLengthSize` for an unsupported field size, `Truncated` when a
/// length field or unit runs past the end of the data.
pub fn length_prefixed_ranges(
    data: &[u8],
    length_size: u8,
) -> Result<Vec<Range<usize>>, DemuxError> {
    if !(1..=4).contains(&length_size) {
        return Err(DemuxError::InvalidLengthSize(length_size));
    }
    let ls = length_size as usize;

    let mut units = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        if offset + ls > data.len() {
            return Err(DemuxError::Truncated {
                offset,
                needed: ls,
                available: data.len() - offset,
            });
        }
        let nal_len = read_nal_length(&data[offset..], ls);
        offset += ls;

        if offset + nal_len > data.len() {
            return Err(DemuxError::Truncated {
                offset,
                needed: nal_len,
                available: data.len() - offset,
            });
        }
        if nal_len > 0 {
            units.push(offset..offset + nal_len);
        }
        offset += nal_len;
    }
    Ok(units)
}

/// Split a length-prefixed stream into units.
pub fn split_length_prefixed(data: &[u8], length_size: u8) -> Result<Vec<&[u8]>, DemuxError> {
    Ok(length_prefixed_ranges(data, length_size)?
        .into_iter()
        .map(|range| &data[range])
        .collect())
}

/// Read a variable-length NAL unit size (1, 2, 3, or 4 bytes big-endian).
fn read_nal_length(data: &[u8], length_size: usize) -> usize {
    let mut val: usize = 0;
    for &byte in &data[..length_size] {
        val = (val << 8) | byte as usize;
    }
    val
}
