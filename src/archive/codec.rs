//! Conversion between flat frame tables and archive records.
//!
//! Flat row layout: `root_translation (3) | root_rotation (4) | dof (K)`.
//!
//! Upstream tooling drops a fixed block of DoF columns before archiving.
//! The dropped values are gone; [`reconstruct`] restores the row layout by
//! inserting zero columns where they used to be. Which block was dropped is
//! described by a [`ReductionPolicy`] supplied by the caller. It is never
//! inferred from the data, so an archive reduced under a different policy
//! reconstructs to a table of plausible shape with misplaced columns.

use serde::{Deserialize, Serialize};

use super::ArchiveRecord;
use crate::table::FrameTable;
use crate::util::{Error, Result};

/// Columns of root translation in a flat row.
pub const ROOT_TRANSLATION_WIDTH: usize = 3;
/// Columns of root rotation (quaternion) in a flat row.
pub const ROOT_ROTATION_WIDTH: usize = 4;
/// Columns before the DoF block in a flat row.
pub const ROOT_WIDTH: usize = ROOT_TRANSLATION_WIDTH + ROOT_ROTATION_WIDTH;

/// Which DoF columns the upstream reduction removed.
///
/// The default describes the historical policy: three columns removed
/// starting at DoF index 19.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionPolicy {
    /// DoF index where the removed block started.
    pub dof_split_index: usize,
    /// Number of removed columns.
    pub dof_gap_width: usize,
}

impl Default for ReductionPolicy {
    fn default() -> Self {
        Self { dof_split_index: 19, dof_gap_width: 3 }
    }
}

impl ReductionPolicy {
    pub const fn new(dof_split_index: usize, dof_gap_width: usize) -> Self {
        Self { dof_split_index, dof_gap_width }
    }

    /// Width of a reconstructed DoF block for a reduced width `k`.
    #[inline]
    pub fn restored_width(&self, k: usize) -> usize {
        k + self.dof_gap_width
    }

    /// Insert `dof_gap_width` zero columns at `dof_split_index`.
    ///
    /// If the reduced DoF is narrower than the split index, the zeros go at
    /// the end.
    pub fn restore(&self, dof: &FrameTable) -> Result<FrameTable> {
        let split = self.dof_split_index.min(dof.width());
        let head = dof.columns(0..split);
        let tail = dof.columns(split..dof.width());
        let filler = FrameTable::zeros(dof.frame_count(), self.dof_gap_width);
        FrameTable::hconcat(&[&head, &filler, &tail])
    }

    /// Remove the `dof_gap_width` columns starting at `dof_split_index`.
    ///
    /// Applies this policy to a full DoF block the way upstream tooling
    /// does. Indices past the table width are clamped.
    pub fn reduce(&self, dof: &FrameTable) -> Result<FrameTable> {
        let split = self.dof_split_index.min(dof.width());
        let resume = (split + self.dof_gap_width).min(dof.width());
        let head = dof.columns(0..split);
        let tail = dof.columns(resume..dof.width());
        FrameTable::hconcat(&[&head, &tail])
    }
}

/// Rebuild a flat table from an archive record.
///
/// Output rows are `root_translation | root_rotation | restored dof`, with
/// width `7 + K + dof_gap_width`. The frame count is preserved and the
/// inserted columns are exactly zero. Fails with
/// [`Error::MalformedArchive`] before producing anything if the record does
/// not validate.
pub fn reconstruct(record: &ArchiveRecord, policy: &ReductionPolicy) -> Result<FrameTable> {
    record.validate()?;
    let dof = policy.restore(&record.dof)?;
    tracing::debug!(
        "Restored dof {:?} -> {:?} ({} zero columns at {})",
        record.dof.shape(),
        dof.shape(),
        policy.dof_gap_width,
        policy.dof_split_index
    );
    FrameTable::hconcat(&[&record.root_translation, &record.root_rotation, &dof])
}

/// Split a flat table into an archive record.
///
/// Columns `[0, 3)` become the root translation, `[3, 7)` the root rotation
/// and the rest the DoF block, unchanged. Apply
/// [`ReductionPolicy::reduce`] to the DoF separately if needed.
///
/// Fails with [`Error::NonFinite`] if the table holds NaN or infinity, with
/// the frame and column given in table coordinates.
pub fn split_table(table: &FrameTable) -> Result<ArchiveRecord> {
    if table.width() < ROOT_WIDTH {
        return Err(Error::malformed(format!(
            "table has {} columns, need at least {} for the root",
            table.width(),
            ROOT_WIDTH
        )));
    }
    if let Some((frame, column)) = table.find_non_finite() {
        let value = table.frame(frame)[column];
        return Err(Error::NonFinite { field: "table", frame, column, value });
    }
    Ok(ArchiveRecord::new(
        table.columns(0..ROOT_TRANSLATION_WIDTH),
        table.columns(ROOT_TRANSLATION_WIDTH..ROOT_WIDTH),
        table.columns(ROOT_WIDTH..table.width()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Record with `n` frames and a `k`-wide DoF holding `frame * 100 + column`.
    fn record(n: usize, k: usize) -> ArchiveRecord {
        let trans: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, 0.5, -1.0]).collect();
        let rot: Vec<Vec<f64>> = (0..n).map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect();
        let dof: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..k).map(|j| (i * 100 + j) as f64 + 1.0).collect())
            .collect();
        ArchiveRecord::new(
            FrameTable::from_rows(&trans).unwrap(),
            FrameTable::from_rows(&rot).unwrap(),
            FrameTable::from_rows(&dof).unwrap(),
        )
    }

    #[test]
    fn test_reconstruct_k23() {
        let rec = record(4, 23);
        let out = reconstruct(&rec, &ReductionPolicy::default()).unwrap();
        assert_eq!(out.shape(), (4, 33));

        for (i, row) in out.frames().enumerate() {
            assert_eq!(&row[..3], rec.root_translation.frame(i));
            assert_eq!(&row[3..7], rec.root_rotation.frame(i));
            let dof = &row[7..];
            assert_eq!(&dof[..19], &rec.dof.frame(i)[..19]);
            assert_eq!(&dof[19..22], &[0.0, 0.0, 0.0]);
            assert_eq!(&dof[22..], &rec.dof.frame(i)[19..]);
        }
    }

    #[test]
    fn test_reconstruct_narrow_dof_appends_filler() {
        let rec = record(2, 5);
        let out = reconstruct(&rec, &ReductionPolicy::default()).unwrap();
        assert_eq!(out.width(), 5 + 10);
        assert_eq!(&out.frame(1)[7..12], rec.dof.frame(1));
        assert_eq!(&out.frame(1)[12..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reconstruct_custom_policy() {
        let rec = record(3, 6);
        let policy = ReductionPolicy::new(2, 1);
        let out = reconstruct(&rec, &policy).unwrap();
        assert_eq!(out.width(), 7 + 6 + 1);
        assert_eq!(&out.frame(0)[7..], &[1.0, 2.0, 0.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_reconstruct_rejects_mismatched_frames() {
        let mut rec = record(3, 23);
        rec.dof = rec.dof.frame_range(0..2);
        let err = reconstruct(&rec, &ReductionPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedArchive(_)));
    }

    #[test]
    fn test_reduce_then_restore() {
        let policy = ReductionPolicy::default();
        let full = record(3, 26).dof;
        let reduced = policy.reduce(&full).unwrap();
        assert_eq!(reduced.width(), 23);

        let restored = policy.restore(&reduced).unwrap();
        assert_eq!(restored.width(), policy.restored_width(23));
        for (a, b) in full.frames().zip(restored.frames()) {
            assert_eq!(&a[..19], &b[..19]);
            assert_eq!(&b[19..22], &[0.0, 0.0, 0.0]);
            assert_eq!(&a[22..], &b[22..]);
        }
    }

    #[test]
    fn test_split_table() {
        let row: Vec<f64> = (0..12).map(f64::from).collect();
        let table = FrameTable::from_rows(&[row.clone(), row]).unwrap();
        let rec = split_table(&table).unwrap();
        assert_eq!(rec.root_translation.frame(0), &[0.0, 1.0, 2.0]);
        assert_eq!(rec.root_rotation.frame(0), &[3.0, 4.0, 5.0, 6.0]);
        assert_eq!(rec.dof.shape(), (2, 5));
        rec.validate().unwrap();

        let narrow = FrameTable::from_rows(&[[1.0, 2.0]]).unwrap();
        assert!(matches!(split_table(&narrow), Err(Error::MalformedArchive(_))));
    }

    #[test]
    fn test_split_table_rejects_nan() {
        let mut row = vec![0.5; 33];
        row[10] = f64::NAN;
        let table = FrameTable::from_rows(&[vec![0.5; 33], row]).unwrap();
        let err = split_table(&table).unwrap_err();
        assert!(matches!(err, Error::NonFinite { field: "table", frame: 1, column: 10, .. }));
    }
}
