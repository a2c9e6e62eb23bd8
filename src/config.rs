//! Tool configuration.
//!
//! Every value has a default matching the historical behavior of the tools,
//! so a config file only needs the keys it changes:
//!
//! ```json
//! { "reduction": { "dof_split_index": 21 }, "transition_frames": 8 }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::archive::ReductionPolicy;
use crate::mirror::DEFAULT_TRANSITION_FRAMES;
use crate::table::text::Precision;
use crate::util::{Error, Result};

/// Nominal width of a flat motion table (3 + 4 + 26 DoF).
pub const NOMINAL_TABLE_WIDTH: usize = 33;

/// Settings shared by all commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// DoF columns removed upstream, restored as zeros on revert.
    pub reduction: ReductionPolicy,

    /// Width the pad command expects its input to have. Mismatches warn.
    pub expected_width: Option<usize>,

    /// Values appended by the pad command.
    pub pad_values: Vec<f64>,

    /// Transition length for smooth mirroring.
    pub transition_frames: usize,

    pub precision: OutputPrecision,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reduction: ReductionPolicy::default(),
            expected_width: Some(NOMINAL_TABLE_WIDTH),
            pad_values: vec![0.0; 3],
            transition_frames: DEFAULT_TRANSITION_FRAMES,
            precision: OutputPrecision::default(),
        }
    }
}

/// Number formatting per output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPrecision {
    pub pad: Precision,
    pub slice: Precision,
    pub mirror: Precision,
    pub reconstruct: Precision,
}

impl Default for OutputPrecision {
    fn default() -> Self {
        Self {
            pad: Precision::Shortest,
            slice: Precision::Fixed(6),
            mirror: Precision::Fixed(6),
            reconstruct: Precision::Fixed(8),
        }
    }
}

impl Config {
    /// Load a config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.reduction, ReductionPolicy::new(19, 3));
        assert_eq!(c.expected_width, Some(33));
        assert_eq!(c.pad_values, vec![0.0, 0.0, 0.0]);
        assert_eq!(c.transition_frames, 5);
        assert_eq!(c.precision.reconstruct, Precision::Fixed(8));
    }

    #[test]
    fn test_partial_json() {
        let c: Config = serde_json::from_str(
            r#"{ "reduction": { "dof_split_index": 21 }, "precision": { "mirror": { "fixed": 3 } } }"#,
        )
        .unwrap();
        assert_eq!(c.reduction, ReductionPolicy::new(21, 3));
        assert_eq!(c.precision.mirror, Precision::Fixed(3));
        assert_eq!(c.precision.slice, Precision::Fixed(6));
        assert_eq!(c.transition_frames, 5);
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "precision": { "slice": { "fixed": 3 } }, "expected_width": null }"#)
            .unwrap();
        let c = Config::load(&path).unwrap();
        assert_eq!(c.precision.slice, Precision::Fixed(3));
        assert_eq!(c.expected_width, None);
        assert_eq!(c.pad_values, vec![0.0; 3]);
        assert!(matches!(Config::load(dir.path().join("nope.json")), Err(Error::FileNotFound(_))));
    }
}
