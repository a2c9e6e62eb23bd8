//! Motion archives.
//!
//! An archive stores one motion clip as named arrays instead of a flat
//! table. On disk it is a mapping with a single entry: an arbitrary
//! identifier (usually the source file stem) pointing at the record.
//!
//! ```text
//! { "walk_0_100": { "root_trans_offset": [[x, y, z], ...],
//!                   "root_rot":          [[q0, q1, q2, q3], ...],
//!                   "dof":               [[...], ...],
//!                   "contact_mask":      [[...], ...] } }
//! ```
//!
//! [`ArchiveRecord`] is the validated schema for the inner mapping. The three
//! root/DoF arrays are required. Annotations added by upstream tooling
//! (`contact_mask`, `smpl_joints`, `pose_aa`) are optional and only ever
//! carried through or stripped. Unknown keys are kept verbatim.

mod codec;
pub mod io;

pub use codec::*;

use glam::{DVec3, DVec4};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::table::FrameTable;
use crate::util::{Error, Result};

/// Wire names of the annotation fields, in the order they are stripped.
pub const ANNOTATION_KEYS: [&str; 3] = ["contact_mask", "smpl_joints", "pose_aa"];

/// One motion clip in archive form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Root position per frame (N x 3).
    #[serde(rename = "root_trans_offset", alias = "root_translation")]
    pub root_translation: FrameTable,

    /// Root orientation quaternion per frame (N x 4).
    #[serde(rename = "root_rot", alias = "root_rotation")]
    pub root_rotation: FrameTable,

    /// Joint DoF vector per frame (N x K), possibly reduced upstream.
    pub dof: FrameTable,

    /// Per-frame foot contact flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_mask: Option<Value>,

    /// Per-frame joint positions.
    #[serde(
        rename = "smpl_joints",
        alias = "joint_positions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub joint_positions: Option<Value>,

    /// Per-frame axis-angle pose.
    #[serde(
        rename = "pose_aa",
        alias = "pose_axis_angle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pose_axis_angle: Option<Value>,

    /// Any other keys (fps, etc.).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ArchiveRecord {
    /// Build a record from the three required arrays.
    pub fn new(root_translation: FrameTable, root_rotation: FrameTable, dof: FrameTable) -> Self {
        Self {
            root_translation,
            root_rotation,
            dof,
            contact_mask: None,
            joint_positions: None,
            pose_axis_angle: None,
            extra: BTreeMap::new(),
        }
    }

    /// Number of frames, taken from the root translation.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.root_translation.frame_count()
    }

    /// Check that the root arrays have the expected widths and that every
    /// per-frame field agrees on the frame count.
    pub fn validate(&self) -> Result<()> {
        let n = self.frame_count();
        if n > 0 {
            check_width("root_trans_offset", &self.root_translation, ROOT_TRANSLATION_WIDTH)?;
            check_width("root_rot", &self.root_rotation, ROOT_ROTATION_WIDTH)?;
        }
        check_frames("root_rot", self.root_rotation.frame_count(), n)?;
        check_frames("dof", self.dof.frame_count(), n)?;

        for (name, value) in self.annotations() {
            if let Value::Array(items) = value {
                check_frames(name, items.len(), n)?;
            }
        }
        Ok(())
    }

    /// Check that the numeric arrays hold only finite values.
    ///
    /// JSON has no representation for NaN or infinity; serde_json would
    /// write them as `null` and the archive could not be read back.
    pub fn check_finite(&self) -> Result<()> {
        let fields = [
            ("root_trans_offset", &self.root_translation),
            ("root_rot", &self.root_rotation),
            ("dof", &self.dof),
        ];
        for (field, table) in fields {
            if let Some((frame, column)) = table.find_non_finite() {
                let value = table.frame(frame)[column];
                return Err(Error::NonFinite { field, frame, column, value });
            }
        }
        Ok(())
    }

    /// Present annotation fields with their wire names.
    pub fn annotations(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        let fields = [&self.contact_mask, &self.joint_positions, &self.pose_axis_angle];
        ANNOTATION_KEYS
            .into_iter()
            .zip(fields)
            .filter_map(|(name, field)| field.as_ref().map(|v| (name, v)))
    }

    /// Remove all annotation fields. Returns the names of removed fields.
    ///
    /// Only the annotation keys are removed. A `dof` array that was reduced
    /// upstream stays reduced.
    pub fn strip_annotations(&mut self) -> Vec<&'static str> {
        let removed: Vec<_> = self.annotations().map(|(name, _)| name).collect();
        self.contact_mask = None;
        self.joint_positions = None;
        self.pose_axis_angle = None;
        removed
    }

    /// Root-motion statistics for display.
    pub fn summary(&self) -> MotionSummary {
        let positions: Vec<DVec3> = self
            .root_translation
            .frames()
            .filter(|f| f.len() >= 3)
            .map(|f| DVec3::new(f[0], f[1], f[2]))
            .collect();
        let root_path_length = positions.windows(2).map(|w| w[0].distance(w[1])).sum();

        let max_rotation_norm_error = self
            .root_rotation
            .frames()
            .filter(|f| f.len() >= 4)
            .map(|f| (DVec4::from_slice(f).length() - 1.0).abs())
            .fold(0.0, f64::max);

        MotionSummary {
            frames: self.frame_count(),
            dof_width: self.dof.width(),
            root_path_length,
            max_rotation_norm_error,
            annotations: self.annotations().map(|(name, _)| name).collect(),
        }
    }
}

fn check_width(name: &str, table: &FrameTable, expected: usize) -> Result<()> {
    if table.width() != expected {
        return Err(Error::malformed(format!(
            "field `{}` has {} columns, expected {}",
            name,
            table.width(),
            expected
        )));
    }
    Ok(())
}

fn check_frames(name: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::malformed(format!(
            "field `{}` has {} frames, root has {}",
            name, actual, expected
        )));
    }
    Ok(())
}

/// Root-motion statistics of a record.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionSummary {
    pub frames: usize,
    pub dof_width: usize,
    /// Sum of distances between consecutive root positions.
    pub root_path_length: f64,
    /// Largest `| |q| - 1 |` over all root quaternions.
    pub max_rotation_norm_error: f64,
    pub annotations: Vec<&'static str>,
}

/// A record together with its top-level identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Archive {
    pub key: String,
    pub record: ArchiveRecord,
}

impl Archive {
    pub fn new(key: impl Into<String>, record: ArchiveRecord) -> Self {
        Self { key: key.into(), record }
    }

    /// Decode the single-entry top-level mapping and validate the record.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::malformed("top level is not a mapping"));
        };
        let (key, inner) = single_entry(map)?;
        let record: ArchiveRecord = serde_json::from_value(inner).map_err(schema_error)?;
        record.validate()?;
        tracing::debug!(
            "Archive {:?}: {} frames, dof width {}",
            key,
            record.frame_count(),
            record.dof.width()
        );
        Ok(Self { key, record })
    }

    /// Encode as the single-entry top-level mapping.
    ///
    /// Fails with [`Error::NonFinite`] if any numeric array holds NaN or
    /// infinity.
    pub fn to_value(&self) -> Result<Value> {
        self.record.check_finite()?;
        let mut map = Map::new();
        map.insert(self.key.clone(), serde_json::to_value(&self.record)?);
        Ok(Value::Object(map))
    }
}

fn single_entry(map: Map<String, Value>) -> Result<(String, Value)> {
    if map.len() != 1 {
        return Err(Error::malformed(format!(
            "expected exactly one top-level entry, found {}",
            map.len()
        )));
    }
    map.into_iter()
        .next()
        .ok_or_else(|| Error::malformed("empty top-level mapping"))
}

fn schema_error(err: serde_json::Error) -> Error {
    Error::malformed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_json() -> Value {
        json!({
            "root_trans_offset": [[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]],
            "root_rot": [[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0, 1.0]],
            "dof": [[0.1, 0.2], [0.3, 0.4]],
            "contact_mask": [[1, 0], [0, 1]],
            "fps": 30
        })
    }

    #[test]
    fn test_from_value() {
        let archive = Archive::from_value(json!({ "walk": record_json() })).unwrap();
        assert_eq!(archive.key, "walk");
        assert_eq!(archive.record.frame_count(), 2);
        assert_eq!(archive.record.dof.width(), 2);
        assert!(archive.record.contact_mask.is_some());
        assert_eq!(archive.record.extra.get("fps"), Some(&json!(30)));
    }

    #[test]
    fn test_descriptive_aliases() {
        let inner = json!({
            "root_translation": [[1.0, 2.0, 3.0]],
            "root_rotation": [[1.0, 0.0, 0.0, 0.0]],
            "dof": [[0.5]],
            "joint_positions": [[[0.0, 0.0, 0.0]]]
        });
        let archive = Archive::from_value(json!({ "x": inner })).unwrap();
        assert_eq!(archive.record.root_translation.frame(0), &[1.0, 2.0, 3.0]);
        assert!(archive.record.joint_positions.is_some());

        let out = archive.to_value().unwrap();
        assert!(out["x"].get("root_trans_offset").is_some());
        assert!(out["x"].get("smpl_joints").is_some());
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let mut inner = record_json();
        inner.as_object_mut().unwrap().remove("dof");
        let err = Archive::from_value(json!({ "walk": inner })).unwrap_err();
        assert!(matches!(err, Error::MalformedArchive(ref m) if m.contains("dof")));
    }

    #[test]
    fn test_frame_count_mismatch_is_malformed() {
        let mut inner = record_json();
        inner["dof"] = json!([[0.1, 0.2]]);
        let err = Archive::from_value(json!({ "walk": inner })).unwrap_err();
        assert!(matches!(err, Error::MalformedArchive(_)));

        let mut inner = record_json();
        inner["contact_mask"] = json!([[1, 0]]);
        assert!(Archive::from_value(json!({ "walk": inner })).is_err());
    }

    #[test]
    fn test_root_width_is_checked() {
        let mut inner = record_json();
        inner["root_rot"] = json!([[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]]);
        let err = Archive::from_value(json!({ "walk": inner })).unwrap_err();
        assert!(matches!(err, Error::MalformedArchive(ref m) if m.contains("root_rot")));
    }

    #[test]
    fn test_top_level_shape() {
        assert!(Archive::from_value(json!({})).is_err());
        assert!(Archive::from_value(json!([1, 2])).is_err());
        let two = json!({ "a": record_json(), "b": record_json() });
        assert!(Archive::from_value(two).is_err());
    }

    #[test]
    fn test_strip_annotations() {
        let mut archive = Archive::from_value(json!({ "walk": record_json() })).unwrap();
        let removed = archive.record.strip_annotations();
        assert_eq!(removed, vec!["contact_mask"]);
        assert_eq!(archive.record.annotations().count(), 0);
        assert!(archive.record.extra.contains_key("fps"));
        assert!(archive.record.strip_annotations().is_empty());
    }

    #[test]
    fn test_non_finite_is_not_encoded() {
        let mut archive = Archive::from_value(json!({ "walk": record_json() })).unwrap();
        archive.record.dof = FrameTable::from_rows(&[[0.1, 0.2], [0.3, f64::NAN]]).unwrap();
        let err = archive.to_value().unwrap_err();
        assert!(matches!(err, Error::NonFinite { field: "dof", frame: 1, column: 1, .. }));

        archive.record.dof = FrameTable::from_rows(&[[0.1, 0.2], [0.3, 0.4]]).unwrap();
        archive.record.root_translation =
            FrameTable::from_rows(&[[0.0, f64::NEG_INFINITY, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        let err = archive.to_value().unwrap_err();
        assert!(matches!(err, Error::NonFinite { field: "root_trans_offset", frame: 0, column: 1, .. }));
    }

    #[test]
    fn test_summary() {
        let archive = Archive::from_value(json!({ "walk": record_json() })).unwrap();
        let s = archive.record.summary();
        assert_eq!(s.frames, 2);
        assert_eq!(s.dof_width, 2);
        assert!((s.root_path_length - 5.0).abs() < 1e-12);
        assert_eq!(s.max_rotation_norm_error, 0.0);
        assert_eq!(s.annotations, vec!["contact_mask"]);
    }
}
