//! Level series assembly.
//!
//! This module turns a set of events into the ordered samples a chart needs:
//! - A uniform grid at an adaptive resolution
//! - Two knots per in-window event (the event itself and just before it)
//! - Decay evaluation at every point, sorted by time

use crate::decay::level_at;
use crate::grid::generate_grid;
use crate::resolution::{select_resolution, DEFAULT_TARGET_SAMPLES};
use crate::store::EventSource;
use crate::{ConsumptionEvent, Error, LevelSeries, Result, TimeSample};
use chrono::{DateTime, Duration, Utc};

/// Per-deployment constants for series generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesParams {
    /// Time for a dose to decay to half its amount
    pub half_life: Duration,
    /// How far before the window start events are still fetched
    pub lookback: Duration,
    /// Offset of the knot placed before each event
    pub knot_offset: Duration,
    /// Uniform grid size aimed for
    pub target_samples: u32,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            half_life: Duration::hours(4),
            lookback: Duration::hours(72),
            knot_offset: Duration::minutes(1),
            target_samples: DEFAULT_TARGET_SAMPLES,
        }
    }
}

fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        return Err(Error::InvalidRange { start, end });
    }
    Ok(())
}

/// Build the level series for `[start, end]` from a pre-fetched event set.
///
/// `events` should already include the lookback period; every event is used
/// for decay but only events inside the window get knots. Samples are sorted
/// by timestamp; a knot landing on a grid point is kept twice.
pub fn build_series(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    events: &[ConsumptionEvent],
    params: &SeriesParams,
) -> Result<LevelSeries> {
    check_range(start, end)?;
    if params.half_life <= Duration::zero() {
        return Err(Error::InvalidHalfLife(params.half_life));
    }

    let resolution = select_resolution(end - start, params.target_samples);
    let grid = generate_grid(start, end, resolution)?;

    let knots = events
        .iter()
        .filter(|e| e.timestamp >= start && e.timestamp <= end)
        .flat_map(|e| {
            // A knot that would fall outside the representable range is dropped
            let before = e.timestamp.checked_sub_signed(params.knot_offset);
            std::iter::once(e.timestamp).chain(before)
        });

    let mut series: LevelSeries = grid
        .chain(knots)
        .map(|timestamp| TimeSample {
            timestamp,
            level: level_at(timestamp, events, params.half_life),
        })
        .collect();

    series.sort_by_key(|s| s.timestamp);

    tracing::debug!(
        "Built {} samples at {} resolution from {} events",
        series.len(),
        resolution,
        events.len()
    );

    Ok(series)
}

/// Fetch events for `[start - lookback, end]` and build the series.
pub fn levels_between<S: EventSource + ?Sized>(
    source: &S,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    params: &SeriesParams,
) -> Result<LevelSeries> {
    check_range(start, end)?;
    let fetch_from = start
        .checked_sub_signed(params.lookback)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let events = source.fetch_events(fetch_from, end)?;
    tracing::info!(
        "Computing levels from {} to {} over {} events",
        start.to_rfc3339(),
        end.to_rfc3339(),
        events.len()
    );
    build_series(start, end, &events, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
    }

    fn event(t: DateTime<Utc>, amount: f64) -> ConsumptionEvent {
        ConsumptionEvent::new(t, "flat white", amount, 550)
    }

    struct FixedSource(Vec<ConsumptionEvent>);

    impl EventSource for FixedSource {
        fn fetch_events(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<ConsumptionEvent>> {
            Ok(self
                .0
                .iter()
                .filter(|e| e.timestamp >= start && e.timestamp <= end)
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let params = SeriesParams::default();
        let err = build_series(at(9, 0, 0), at(8, 0, 0), &[], &params).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));

        let err = build_series(at(9, 0, 0), at(9, 0, 0), &[], &params).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_non_positive_half_life_is_rejected() {
        let params = SeriesParams {
            half_life: Duration::zero(),
            ..SeriesParams::default()
        };
        let err = build_series(at(8, 0, 0), at(9, 0, 0), &[], &params).unwrap_err();
        assert!(matches!(err, Error::InvalidHalfLife(_)));
    }

    #[test]
    fn test_no_events_gives_flat_zero_series() {
        let series = build_series(at(0, 0, 0), at(23, 0, 0), &[], &SeriesParams::default()).unwrap();
        assert!(!series.is_empty());
        assert!(series.iter().all(|s| s.level == 0.0));
        assert!(series.first().unwrap().timestamp <= at(0, 0, 0));
        assert!(series.last().unwrap().timestamp >= at(23, 0, 0));
    }

    #[test]
    fn test_knots_inserted_at_event_and_minute_before() {
        let events = [event(at(9, 0, 0), 160.0)];
        let series =
            build_series(at(8, 0, 0), at(14, 0, 0), &events, &SeriesParams::default()).unwrap();

        let before = series.iter().find(|s| s.timestamp == at(8, 59, 0)).unwrap();
        assert_eq!(before.level, 0.0);

        let on = series
            .iter()
            .filter(|s| s.timestamp == at(9, 0, 0))
            .collect::<Vec<_>>();
        // 6h window -> 1m resolution, so 09:00 is also a grid point
        assert_eq!(on.len(), 2);
        assert!(on.iter().all(|s| s.level == 160.0));
    }

    #[test]
    fn test_series_is_sorted() {
        let events = [
            event(at(13, 0, 0), 80.0),
            event(at(9, 0, 7), 160.0),
            event(at(11, 42, 3), 240.0),
        ];
        let series =
            build_series(at(8, 0, 0), at(16, 0, 0), &events, &SeriesParams::default()).unwrap();
        assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(series.iter().any(|s| s.timestamp == at(9, 0, 7)));
        assert!(series.iter().any(|s| s.timestamp == at(11, 41, 3)));
    }

    #[test]
    fn test_sample_count_is_grid_plus_two_knots_per_event() {
        let events = [event(at(10, 0, 30), 160.0), event(at(12, 0, 30), 80.0)];
        let params = SeriesParams::default();
        let start = at(0, 0, 0);
        let end = start + Duration::hours(24);

        let grid_len = generate_grid(start, end, select_resolution(end - start, 250))
            .unwrap()
            .count();
        let series = build_series(start, end, &events, &params).unwrap();
        assert_eq!(series.len(), grid_len + 4);
    }

    #[test]
    fn test_events_outside_window_get_no_knots_but_still_decay() {
        let early = event(at(2, 0, 0), 160.0);
        let series =
            build_series(at(6, 0, 0), at(10, 0, 0), &[early], &SeriesParams::default()).unwrap();

        assert!(!series.iter().any(|s| s.timestamp == at(1, 59, 0)));
        let first = series.iter().find(|s| s.timestamp == at(6, 0, 0)).unwrap();
        assert_eq!(first.level, 80.0);
    }

    #[test]
    fn test_knots_at_window_boundaries() {
        let events = [
            event(at(8, 0, 0), 160.0),
            event(at(14, 0, 0), 80.0),
            event(at(14, 0, 1), 240.0),
        ];
        let start = at(8, 0, 0);
        let end = at(14, 0, 0);
        let series = build_series(start, end, &events, &SeriesParams::default()).unwrap();
        let count = |t| series.iter().filter(|s| s.timestamp == t).count();

        // 6h window -> 1m grid, so every whole minute in range is a grid point
        assert_eq!(count(at(8, 0, 0)), 2);
        assert_eq!(count(at(7, 59, 0)), 1);
        assert_eq!(count(at(14, 0, 0)), 2);
        assert_eq!(count(at(13, 59, 0)), 2);

        // One second past the end gets no knots
        assert_eq!(count(at(14, 0, 1)), 0);
        assert_eq!(count(at(13, 59, 1)), 0);

        let grid_len = generate_grid(start, end, select_resolution(end - start, 250))
            .unwrap()
            .count();
        assert_eq!(series.len(), grid_len + 4);
    }

    #[test]
    fn test_unrepresentable_offsets_do_not_panic() {
        let params = SeriesParams {
            lookback: Duration::MAX,
            knot_offset: Duration::MAX,
            ..SeriesParams::default()
        };
        let source = FixedSource(vec![event(at(9, 0, 0), 160.0)]);
        let series = levels_between(&source, at(8, 0, 0), at(10, 0, 0), &params).unwrap();

        let resolution = select_resolution(Duration::hours(2), 250);
        let grid_len = generate_grid(at(8, 0, 0), at(10, 0, 0), resolution)
            .unwrap()
            .count();
        assert_eq!(series.len(), grid_len + 1);
    }

    #[test]
    fn test_custom_knot_offset() {
        let params = SeriesParams {
            knot_offset: Duration::seconds(97),
            ..SeriesParams::default()
        };
        let events = [event(at(9, 0, 0), 160.0)];
        let series = build_series(at(8, 0, 0), at(10, 0, 0), &events, &params).unwrap();
        assert!(series.iter().any(|s| s.timestamp == at(8, 58, 23)));
    }

    #[test]
    fn test_long_spans_are_not_capped() {
        // The ladder tops out at one day, so a year-long window yields one
        // point per day rather than the target count.
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = build_series(start, end, &[], &SeriesParams::default()).unwrap();
        assert_eq!(series.len(), 366);
    }

    #[test]
    fn test_levels_between_uses_lookback() {
        let source = FixedSource(vec![
            event(at(1, 0, 0), 160.0),
            event(at(9, 0, 0), 80.0),
            event(at(15, 0, 0), 80.0),
        ]);
        let series =
            levels_between(&source, at(5, 0, 0), at(12, 0, 0), &SeriesParams::default()).unwrap();

        let at_start = series.iter().find(|s| s.timestamp == at(5, 0, 0)).unwrap();
        assert_eq!(at_start.level, 80.0);

        // 15:00 is outside the fetched window and never contributes
        assert!(!series.iter().any(|s| s.timestamp == at(15, 0, 0)));
    }

    #[test]
    fn test_levels_between_end_to_end_value() {
        let source = FixedSource(vec![event(at(9, 0, 0), 160.0), event(at(13, 0, 0), 80.0)]);
        let series =
            levels_between(&source, at(8, 0, 0), at(14, 0, 0), &SeriesParams::default()).unwrap();
        let at_one = series.iter().find(|s| s.timestamp == at(13, 0, 0)).unwrap();
        assert_eq!(at_one.level, 160.0);
    }
}
