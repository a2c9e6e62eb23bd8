//! Temporal mirroring of frame sequences.
//!
//! Both modes append a time-reversed copy of the motion so that it ends in
//! the pose it started from:
//!
//! - [`MirrorMode::Simple`] concatenates the frames with their reverse,
//!   optionally dropping the last frame so the turn-around pose is not held
//!   for two frames (`1234` + `321`).
//! - [`MirrorMode::Smooth`] keeps every frame, then bridges the last and the
//!   second-to-last frame with linearly interpolated transition frames before
//!   playing the rest backwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::table::FrameTable;
use crate::util::{Diagnostic, Error, Result, Validated};

/// Default number of transition frames for [`MirrorMode::Smooth`].
pub const DEFAULT_TRANSITION_FRAMES: usize = 5;

/// Mirroring algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorMode {
    /// Frames followed by their reverse.
    Simple { skip_last: bool },
    /// Frames, interpolated transition, then the reverse without the last frame.
    Smooth { transition_frames: usize },
}

impl Default for MirrorMode {
    fn default() -> Self {
        Self::Simple { skip_last: false }
    }
}

impl fmt::Display for MirrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple { skip_last } => write!(f, "simple (skip_last={})", skip_last),
            Self::Smooth { transition_frames } => {
                write!(f, "smooth ({} transition frames)", transition_frames)
            }
        }
    }
}

impl FromStr for MirrorMode {
    type Err = Error;

    /// Parse a mode name with default parameters.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(Self::Simple { skip_last: false }),
            "smooth" => Ok(Self::Smooth { transition_frames: DEFAULT_TRANSITION_FRAMES }),
            other => Err(Error::invalid_arg(format!(
                "unknown mirror mode {:?} (expected simple or smooth)",
                other
            ))),
        }
    }
}

/// Mirror a table with the given mode.
pub fn mirror(table: &FrameTable, mode: MirrorMode) -> Result<Validated<FrameTable>> {
    match mode {
        MirrorMode::Simple { skip_last } => simple(table, skip_last).map(Validated::clean),
        MirrorMode::Smooth { transition_frames } => smooth(table, transition_frames),
    }
}

/// Frames followed by their reverse.
///
/// With `skip_last` the output is `F[..N-1] ++ rev(F[..N-1])`, a palindrome
/// of `2N - 2` frames. Without it the output is `F ++ rev(F)`, `2N` frames
/// with the last frame repeated at the midpoint.
pub fn simple(table: &FrameTable, skip_last: bool) -> Result<FrameTable> {
    let n = table.frame_count();
    if n == 0 {
        return Err(Error::EmptyInput("mirror"));
    }
    let kept = if skip_last { n - 1 } else { n };

    let mut out = FrameTable::with_capacity(table.width(), kept * 2);
    for frame in table.frames().take(kept) {
        out.push_frame(frame)?;
    }
    for frame in table.frames().take(kept).rev() {
        out.push_frame(frame)?;
    }
    tracing::debug!("Simple mirror: {} frames -> {}", n, out.frame_count());
    Ok(out)
}

/// Symmetric motion with a smoothed turn-around.
///
/// Output is `F ++ T ++ rev(F[..N-1])` where `T` holds `transition_frames`
/// frames interpolated from `F[N-1]` towards `F[N-2]` at ratios
/// `(i + 1) / (T + 1)`, so no transition frame equals either endpoint.
///
/// If `N < 2 * transition_frames` the transition is shortened to
/// `max(1, N / 4)` frames and a [`Diagnostic::TransitionShortened`] warning
/// is attached. Needs at least two frames.
pub fn smooth(table: &FrameTable, transition_frames: usize) -> Result<Validated<FrameTable>> {
    let n = table.frame_count();
    if n < 2 {
        return Err(Error::InsufficientFrames { required: 2, actual: n });
    }

    let mut warning = None;
    let mut t = transition_frames;
    if n < t.saturating_mul(2) {
        t = (n / 4).max(1);
        warning = Some(Diagnostic::TransitionShortened {
            requested: transition_frames,
            used: t,
            frames: n,
        });
    }

    let last = table.frame(n - 1);
    let before_last = table.frame(n - 2);

    let mut out = FrameTable::with_capacity(table.width(), 2 * n - 1 + t);
    for frame in table.frames() {
        out.push_frame(frame)?;
    }

    let mut blended = vec![0.0; table.width()];
    for i in 0..t {
        let ratio = (i + 1) as f64 / (t + 1) as f64;
        for ((dst, a), b) in blended.iter_mut().zip(last).zip(before_last) {
            *dst = a * (1.0 - ratio) + b * ratio;
        }
        out.push_frame(&blended)?;
    }

    for frame in table.frames().take(n - 1).rev() {
        out.push_frame(frame)?;
    }
    tracing::debug!(
        "Smooth mirror: {} frames + {} transition + {} reversed",
        n,
        t,
        n - 1
    );

    let result = Validated::clean(out);
    Ok(match warning {
        Some(w) => result.warn(w),
        None => result,
    })
}
