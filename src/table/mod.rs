//! Frame tables.
//!
//! A [`FrameTable`] is an ordered sequence of frames, each a fixed-width row
//! of `f64` values. Column meaning is assigned by the caller; the table only
//! guarantees that every frame has the same width.
//!
//! Tables are immutable once built. Every editing operation in this crate
//! produces a new table.

pub mod text;

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::util::{Error, Result};

/// Rectangular frame-major array of `f64`.
///
/// Stored as one contiguous buffer. The frame count is kept separately so a
/// zero-width table can still have frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct FrameTable {
    width: usize,
    frames: usize,
    data: Vec<f64>,
}

impl FrameTable {
    /// Create an empty table with a fixed width.
    pub fn new(width: usize) -> Self {
        Self { width, frames: 0, data: Vec::new() }
    }

    /// Create an empty table with room for `frames` frames.
    pub fn with_capacity(width: usize, frames: usize) -> Self {
        Self { width, frames: 0, data: Vec::with_capacity(width * frames) }
    }

    /// Table of zeros.
    pub fn zeros(frames: usize, width: usize) -> Self {
        Self { width, frames, data: vec![0.0; width * frames] }
    }

    /// Build from a flat frame-major buffer.
    pub fn from_flat(width: usize, data: Vec<f64>) -> Result<Self> {
        if width == 0 {
            if !data.is_empty() {
                return Err(Error::invalid_arg("zero-width table with data"));
            }
            return Ok(Self::new(0));
        }
        if data.len() % width != 0 {
            return Err(Error::RaggedTable {
                row: data.len() / width,
                expected: width,
                actual: data.len() % width,
            });
        }
        let frames = data.len() / width;
        Ok(Self { width, frames, data })
    }

    /// Build from rows. Fails on the first row whose width differs from row 0.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut table = Self::with_capacity(width, rows.len());
        for row in rows {
            table.push_frame(row.as_ref())?;
        }
        Ok(table)
    }

    /// Append one frame. Only used while building a table.
    pub(crate) fn push_frame(&mut self, frame: &[f64]) -> Result<()> {
        if frame.len() != self.width {
            return Err(Error::RaggedTable {
                row: self.frames,
                expected: self.width,
                actual: frame.len(),
            });
        }
        self.data.extend_from_slice(frame);
        self.frames += 1;
        Ok(())
    }

    /// Number of frames (rows).
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Number of columns per frame.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Shape as `(frames, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.frames, self.width)
    }

    /// Borrow one frame.
    ///
    /// # Panics
    /// Panics if `index >= frame_count()`.
    #[inline]
    pub fn frame(&self, index: usize) -> &[f64] {
        assert!(index < self.frames, "frame {} out of bounds ({})", index, self.frames);
        &self.data[index * self.width..(index + 1) * self.width]
    }

    /// Borrow one frame, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&[f64]> {
        (index < self.frames).then(|| self.frame(index))
    }

    /// Iterate frames in order.
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = &[f64]> + ExactSizeIterator + '_ {
        (0..self.frames).map(move |i| self.frame(i))
    }

    /// Flat frame-major view of all values.
    #[inline]
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }

    /// Frame and column of the first NaN or infinite value, if any.
    pub fn find_non_finite(&self) -> Option<(usize, usize)> {
        let width = self.width.max(1);
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| (i / width, i % width))
    }

    /// Copy a contiguous range of frames. The range must be in bounds.
    pub fn frame_range(&self, range: Range<usize>) -> Self {
        let frames = range.end - range.start;
        let data = self.data[range.start * self.width..range.end * self.width].to_vec();
        Self { width: self.width, frames, data }
    }

    /// Copy a contiguous range of columns, clamped to the table width.
    pub fn columns(&self, range: Range<usize>) -> Self {
        let start = range.start.min(self.width);
        let end = range.end.clamp(start, self.width);
        let mut out = Self::with_capacity(end - start, self.frames);
        for frame in self.frames() {
            out.data.extend_from_slice(&frame[start..end]);
        }
        out.frames = self.frames;
        out
    }

    /// Join tables side by side. All parts must have the same frame count.
    pub fn hconcat(parts: &[&FrameTable]) -> Result<Self> {
        let frames = parts.first().map(|t| t.frames).unwrap_or(0);
        if let Some(bad) = parts.iter().find(|t| t.frames != frames) {
            return Err(Error::FrameCountMismatch { expected: frames, actual: bad.frames });
        }
        let width = parts.iter().map(|t| t.width).sum();
        let mut out = Self::with_capacity(width, frames);
        for i in 0..frames {
            for part in parts {
                out.data.extend_from_slice(part.frame(i));
            }
        }
        out.frames = frames;
        Ok(out)
    }

    /// Copy rows out as nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.frames().map(<[f64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for FrameTable {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(&rows)
    }
}

impl From<FrameTable> for Vec<Vec<f64>> {
    fn from(table: FrameTable) -> Self {
        table.to_rows()
    }
}
