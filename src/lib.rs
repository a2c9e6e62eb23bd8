//! # mocap
//!
//! Tools for motion-capture clips stored as flat frame tables (one row per
//! frame) or as named-array archives.
//!
//! ## Modules
//!
//! - [`util`] - Errors and non-fatal diagnostics
//! - [`table`] - The [`FrameTable`] data model and its text form
//! - [`edit`] - Append constant columns, slice frame ranges
//! - [`mirror`] - Reversed and symmetric motion
//! - [`archive`] - Archive records, DoF reduction/restoration, archive files
//! - [`config`] - Tool configuration
//!
//! ## Example
//!
//! ```ignore
//! use mocap::prelude::*;
//!
//! let archive = mocap::archive::io::read_archive("walk.json")?;
//! let table = reconstruct(&archive.record, &ReductionPolicy::default())?;
//! let looped = mirror::simple(&table, true)?;
//! ```

pub mod util;
pub mod table;
pub mod edit;
pub mod mirror;
pub mod archive;
pub mod config;

use std::path::Path;

// Re-export commonly used types
pub use util::{Diagnostic, Error, Result, Validated};
pub use table::FrameTable;
pub use config::Config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Diagnostic, Error, Result, Validated};
    pub use crate::table::FrameTable;
    pub use crate::table::text::Precision;
    pub use crate::edit::{append_constant_columns, slice_frames};
    pub use crate::mirror::{self, MirrorMode};
    pub use crate::archive::{reconstruct, split_table, Archive, ArchiveRecord, ReductionPolicy};
    pub use crate::config::Config;
}

/// Create the parent directory of an output path if it does not exist.
pub(crate) fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            tracing::debug!("Creating directory {}", dir.display());
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}
