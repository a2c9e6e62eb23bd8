//! Column and frame-range edits on a [`FrameTable`].

use crate::table::FrameTable;
use crate::util::{Diagnostic, Validated};

/// Append constant columns to every frame.
///
/// `values` are appended in order. If `expected_width` is given and the input
/// width differs from it, the result carries a
/// [`Diagnostic::WidthMismatch`] warning; the columns are appended anyway.
pub fn append_constant_columns(
    table: &FrameTable,
    values: &[f64],
    expected_width: Option<usize>,
) -> Validated<FrameTable> {
    let width = table.width() + values.len();
    let mut data = Vec::with_capacity(width * table.frame_count());
    for frame in table.frames() {
        data.extend_from_slice(frame);
        data.extend_from_slice(values);
    }
    tracing::debug!("Appended {} columns: {:?} -> {} wide", values.len(), table.shape(), width);

    let out = if width == 0 {
        table.clone()
    } else {
        // Length is frames * width by construction.
        FrameTable::from_flat(width, data).unwrap_or_default()
    };

    let result = Validated::clean(out);
    match expected_width {
        Some(expected) if expected != table.width() => {
            result.warn(Diagnostic::WidthMismatch { expected, actual: table.width() })
        }
        _ => result,
    }
}

/// Copy frames `[start, end)` with permissive clamping.
///
/// Negative `start` clamps to 0. Negative `end` or `end` past the last
/// frame clamps to the frame count. A start beyond the end yields an empty
/// table of the same width. Never fails.
pub fn slice_frames(table: &FrameTable, start: i64, end: i64) -> FrameTable {
    let n = table.frame_count();
    let clamp = |i: i64| usize::try_from(i).map_or(0, |i| i.min(n));
    let start = clamp(start);
    let end = if end < 0 { n } else { clamp(end) };
    let start = start.min(end);
    tracing::debug!("Slicing frames {}..{} of {}", start, end, n);
    table.frame_range(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FrameTable {
        FrameTable::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_append_zeros() {
        let t = table();
        let out = append_constant_columns(&t, &[0.0, 0.0, 0.0], Some(2));
        assert!(out.is_clean());
        assert_eq!(out.value.width(), 5);
        for (old, new) in t.frames().zip(out.value.frames()) {
            assert_eq!(&new[..2], old);
            assert_eq!(&new[2..], &[0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_append_width_warning() {
        let out = append_constant_columns(&table(), &[7.0], Some(33));
        assert_eq!(out.value.frame(2), &[5.0, 6.0, 7.0]);
        assert_eq!(
            out.warnings.as_slice(),
            &[Diagnostic::WidthMismatch { expected: 33, actual: 2 }]
        );
    }

    #[test]
    fn test_append_to_empty_table() {
        let t = FrameTable::new(4);
        let out = append_constant_columns(&t, &[1.0], None).into_value();
        assert_eq!(out.shape(), (0, 5));
    }

    #[test]
    fn test_slice_identity() {
        let t = table();
        assert_eq!(slice_frames(&t, 0, 3), t);
    }

    #[test]
    fn test_slice_clamps_end() {
        let out = slice_frames(&table(), 1, 10);
        assert_eq!(out.to_rows(), vec![vec![3.0, 4.0], vec![5.0, 6.0]]);
    }

    #[test]
    fn test_slice_negative_bounds() {
        let t = table();
        assert_eq!(slice_frames(&t, -4, -1), t);
        assert_eq!(slice_frames(&t, 2, -1).frame_count(), 1);
    }

    #[test]
    fn test_slice_inverted_range_is_empty() {
        let out = slice_frames(&table(), 2, 1);
        assert_eq!(out.shape(), (0, 2));
        let out = slice_frames(&table(), 9, 12);
        assert!(out.is_empty());
    }

    #[test]
    fn test_slice_empty_table() {
        let out = slice_frames(&FrameTable::new(3), 0, 5);
        assert!(out.is_empty());
    }
}
