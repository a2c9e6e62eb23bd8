//! Non-fatal diagnostics.
//!
//! Some operations detect conditions worth reporting that do not stop
//! processing (an unexpected column count, a shortened transition). They
//! return a [`Validated`] value carrying the output together with the
//! warnings, and the caller decides how to surface them.

use smallvec::SmallVec;
use std::fmt;

/// A non-fatal condition detected while producing an output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// Table width differs from the nominal width for this operation.
    WidthMismatch { expected: usize, actual: usize },
    /// Smooth mirror input was too short for the requested transition.
    TransitionShortened { requested: usize, used: usize, frames: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WidthMismatch { expected, actual } => write!(
                f,
                "input has {} columns, not {}; proceeding anyway",
                actual, expected
            ),
            Self::TransitionShortened { requested, used, frames } => write!(
                f,
                "{} frames are too few for a {}-frame transition; using {}",
                frames, requested, used
            ),
        }
    }
}

/// An output value with the warnings raised while computing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub warnings: SmallVec<[Diagnostic; 2]>,
}

impl<T> Validated<T> {
    /// Wrap a value with no warnings.
    pub fn clean(value: T) -> Self {
        Self { value, warnings: SmallVec::new() }
    }

    /// Attach a warning.
    pub fn warn(mut self, diagnostic: Diagnostic) -> Self {
        self.warnings.push(diagnostic);
        self
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Drop the warnings and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated { value: f(self.value), warnings: self.warnings }
    }
}
