use std::io;
use std::ops::Range;

use crate::io::ByteSource;

/// Read-only view over a `[start, stop)` window of a byte source.
///
/// All indices are relative to `start`, so regions compose without
/// callers re-deriving absolute offsets. Out-of-range slices yield an
/// empty result rather than an error; probing for trailing records
/// depends on this.
pub struct ByteRegion<'a> {
    source: &'a dyn ByteSource,
    start: u64,
    stop: u64,
}

impl<'a> ByteRegion<'a> {
    /// Region spanning the whole source.
    pub fn new(source: &'a dyn ByteSource) -> Self {
        Self {
            source,
            start: 0,
            stop: source.len(),
        }
    }

    /// Region over `[start, stop)`; `stop` defaults to the source end.
    pub fn with_bounds(source: &'a dyn ByteSource, start: u64, stop: Option<u64>) -> Self {
        let stop = stop.unwrap_or_else(|| source.len()).min(source.len());
        Self {
            source,
            start: start.min(stop),
            stop,
        }
    }

    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single byte at a region-relative index.
    pub fn byte_at(&self, index: u64) -> io::Result<u8> {
        if index >= self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "index beyond region",
            ));
        }
        let mut buf = [0u8; 1];
        self.source.read_at_into(self.start + index, &mut buf)?;
        Ok(buf[0])
    }

    /// Bytes in a region-relative range, clamped to the region bounds.
    pub fn slice(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let start = range.start.min(self.len());
        let end = range.end.min(self.len());
        if end <= start {
            return Ok(Vec::new());
        }
        self.source.read_at(self.start + start, (end - start) as usize)
    }

    /// Like [`ByteRegion::slice`], taking every `step.abs()`-th byte.
    /// A negative step reverses the extracted bytes.
    pub fn slice_step(&self, range: Range<u64>, step: isize) -> io::Result<Vec<u8>> {
        if step == 0 {
            return Ok(Vec::new());
        }
        let mut data = self.slice(range)?;
        if step.unsigned_abs() > 1 {
            data = data.into_iter().step_by(step.unsigned_abs()).collect();
        }
        if step < 0 {
            data.reverse();
        }
        Ok(data)
    }
}
