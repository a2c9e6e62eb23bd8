//! Utility types shared across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Diagnostic`] / [`Validated`] - Non-fatal warnings next to an output

mod error;
mod diagnostic;

pub use error::*;
pub use diagnostic::*;
