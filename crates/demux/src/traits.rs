//! Unit source trait definition.

/// Anything that yields bitstream units (framing already stripped) in
/// decoding order.
pub trait UnitSource {
    /// The next unit, or `None` at the end of the stream.
    fn next_unit(&mut self) -> Option<&[u8]>;

    /// Rewind to the first unit.
    fn reset(&mut self);

    /// Total number of units, if known up front.
    fn unit_count(&self) -> Option<usize> {
        None
    }
}
