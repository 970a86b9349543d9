//! Sampling resolution ladder.
//!
//! A request window is divided by a target sample count and the result is
//! snapped down onto a fixed ladder of granularities, so the uniform grid
//! always lands on "round" timestamps.

use chrono::Duration;
use std::fmt;

/// Supported granularities in seconds, ascending.
const LADDER_SECONDS: [i64; 13] = [
    1,
    5,
    10,
    30,
    60,
    5 * 60,
    10 * 60,
    30 * 60,
    60 * 60,
    2 * 60 * 60,
    6 * 60 * 60,
    12 * 60 * 60,
    24 * 60 * 60,
];

/// Default number of uniform grid points aimed for per request.
pub const DEFAULT_TARGET_SAMPLES: u32 = 250;

/// A sampling granularity. Only ever one of the ladder entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution {
    seconds: i64,
}

impl Resolution {
    /// All supported resolutions, finest first.
    pub fn ladder() -> impl Iterator<Item = Resolution> {
        LADDER_SECONDS.iter().map(|&seconds| Resolution { seconds })
    }

    pub fn finest() -> Resolution {
        Resolution {
            seconds: LADDER_SECONDS[0],
        }
    }

    pub fn coarsest() -> Resolution {
        Resolution {
            seconds: LADDER_SECONDS[LADDER_SECONDS.len() - 1],
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.seconds;
        if s % 86_400 == 0 {
            write!(f, "{}d", s / 86_400)
        } else if s % 3_600 == 0 {
            write!(f, "{}h", s / 3_600)
        } else if s % 60 == 0 {
            write!(f, "{}m", s / 60)
        } else {
            write!(f, "{}s", s)
        }
    }
}

/// Snap a target spacing down onto the ladder.
///
/// Returns the largest entry that is `<= spacing`. Spacings finer than the
/// ladder get the finest entry; spacings coarser than the ladder get the
/// coarsest.
pub fn snap_down(spacing: Duration) -> Resolution {
    Resolution::ladder()
        .take_while(|r| r.as_duration() <= spacing)
        .last()
        .unwrap_or_else(Resolution::finest)
}

/// Pick the resolution for a window of length `span`.
///
/// The target spacing is `span / target_samples` (integer division, in
/// nanoseconds where representable).
pub fn select_resolution(span: Duration, target_samples: u32) -> Resolution {
    let divisor = i32::try_from(target_samples.max(1)).unwrap_or(i32::MAX);
    let spacing = span / divisor;
    let resolution = snap_down(spacing);
    tracing::debug!(
        "Selected resolution {} for span {}s (target spacing {}ms)",
        resolution,
        span.num_seconds(),
        spacing.num_milliseconds()
    );
    resolution
}
