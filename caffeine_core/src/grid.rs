//! Uniform time grid over a request window.

use crate::resolution::Resolution;
use crate::{Error, Result};
use chrono::{DateTime, Duration, DurationRound, RoundingError, Utc};

/// Lazy sequence of evenly spaced timestamps.
///
/// The first point is `start` truncated down to a multiple of the step since
/// the Unix epoch. Points advance by one step while strictly before `end`,
/// then one final point (the first one `>= end`) is emitted.
#[derive(Debug)]
pub struct TimeGrid {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    done: bool,
}

impl TimeGrid {
    /// Build a grid with an arbitrary step.
    ///
    /// Fails with `InvalidResolution` if `step` is not positive.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(Error::InvalidResolution(step));
        }
        let first = align_down(start, step)?;
        Ok(Self {
            next: first,
            end,
            step,
            done: false,
        })
    }
}

/// Truncate `t` to a multiple of `step` since the Unix epoch.
///
/// Whole-second steps work on second timestamps so dates past 2262 (the
/// nanosecond limit of `duration_trunc`) still align.
fn align_down(t: DateTime<Utc>, step: Duration) -> Result<DateTime<Utc>> {
    if step.subsec_nanos() != 0 {
        return Ok(t.duration_trunc(step)?);
    }
    let secs = t.timestamp();
    let aligned = secs - secs.rem_euclid(step.num_seconds());
    DateTime::from_timestamp(aligned, 0)
        .ok_or(Error::Rounding(RoundingError::TimestampExceedsLimit))
}

impl Iterator for TimeGrid {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        if self.done {
            return None;
        }
        let current = self.next;
        if current < self.end {
            match current.checked_add_signed(self.step) {
                Some(next) => self.next = next,
                None => self.done = true,
            }
        } else {
            // Closing point at or after `end`
            self.done = true;
        }
        Some(current)
    }
}

/// Grid over `[start, end]` at a ladder resolution.
pub fn generate_grid(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    resolution: Resolution,
) -> Result<TimeGrid> {
    TimeGrid::new(start, end, resolution.as_duration())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn test_aligned_window() {
        let points: Vec<_> = TimeGrid::new(at(8, 0, 0), at(9, 0, 0), Duration::minutes(30))
            .unwrap()
            .collect();
        assert_eq!(points, vec![at(8, 0, 0), at(8, 30, 0), at(9, 0, 0)]);
    }

    #[test]
    fn test_unaligned_start_truncates_down() {
        let points: Vec<_> = TimeGrid::new(at(8, 7, 13), at(8, 20, 0), Duration::minutes(5))
            .unwrap()
            .collect();
        assert_eq!(points.first(), Some(&at(8, 5, 0)));
        assert_eq!(points.last(), Some(&at(8, 20, 0)));
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_final_point_overshoots_unaligned_end() {
        let points: Vec<_> = TimeGrid::new(at(8, 0, 0), at(8, 12, 0), Duration::minutes(5))
            .unwrap()
            .collect();
        assert_eq!(points, vec![at(8, 0, 0), at(8, 5, 0), at(8, 10, 0), at(8, 15, 0)]);
    }

    #[test]
    fn test_grid_covers_window() {
        let start = at(3, 17, 41);
        let end = at(19, 2, 5);
        for resolution in Resolution::ladder() {
            let points: Vec<_> = generate_grid(start, end, resolution).unwrap().collect();
            assert!(*points.first().unwrap() <= start, "resolution {}", resolution);
            assert!(*points.last().unwrap() >= end, "resolution {}", resolution);
            assert!(points.windows(2).all(|w| w[1] - w[0] == resolution.as_duration()));
        }
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let err = TimeGrid::new(at(8, 0, 0), at(9, 0, 0), Duration::zero()).unwrap_err();
        assert!(matches!(err, Error::InvalidResolution(_)));

        let err = TimeGrid::new(at(8, 0, 0), at(9, 0, 0), Duration::seconds(-5)).unwrap_err();
        assert!(matches!(err, Error::InvalidResolution(_)));
    }

    #[test]
    fn test_far_future_window_aligns() {
        let start = Utc.with_ymd_and_hms(2300, 1, 1, 0, 7, 0).unwrap();
        let end = start + Duration::hours(1);
        let points: Vec<_> = TimeGrid::new(start, end, Duration::minutes(5))
            .unwrap()
            .collect();
        assert_eq!(points[0], Utc.with_ymd_and_hms(2300, 1, 1, 0, 5, 0).unwrap());
        assert!(*points.last().unwrap() >= end);
    }

    #[test]
    fn test_pre_epoch_start_truncates_down() {
        let start = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
        let mut grid = TimeGrid::new(start, start + Duration::minutes(1), Duration::minutes(1))
            .unwrap();
        assert_eq!(grid.next(), Some(Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 0).unwrap()));
    }

    #[test]
    fn test_sub_second_step() {
        let points: Vec<_> =
            TimeGrid::new(at(8, 0, 0), at(8, 0, 1), Duration::milliseconds(250))
                .unwrap()
                .collect();
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn test_empty_window_still_yields_one_point() {
        let points: Vec<_> = TimeGrid::new(at(8, 0, 0), at(8, 0, 0), Duration::minutes(1))
            .unwrap()
            .collect();
        assert_eq!(points, vec![at(8, 0, 0)]);
    }
}
