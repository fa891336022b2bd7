use std::collections::BTreeMap;

use geo::Point;
use gtfs::{Stop, StopID, StopVisit};

/// Half-open interval [start_sec, end_sec) on the service day's
/// elapsed-seconds timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourWindow {
    pub hour: u32,
}

impl HourWindow {
    pub fn start_sec(self) -> u32 {
        self.hour * 3600
    }

    pub fn end_sec(self) -> u32 {
        self.start_sec() + 3600
    }
}

/// One travel segment clipped to an hour window. Positions at the clip
/// bounds are interpolated along the raw segment.
#[derive(Clone, Debug, PartialEq)]
pub struct ClippedSegment {
    pub start_sec: u32,
    pub end_sec: u32,
    pub start: Point<f64>,
    pub end: Point<f64>,
}

/// Walks consecutive visit pairs of one trip and keeps the parts that
/// overlap the window. Pairs with non-increasing times or an unknown stop
/// position are dropped; the rest of the trip is unaffected. The result
/// preserves visit order, so segment start times are non-decreasing.
pub fn clip_trip_to_hour(
    visits: &[StopVisit],
    stops: &BTreeMap<StopID, Stop>,
    window: HourWindow,
) -> Vec<ClippedSegment> {
    let mut segments = Vec::new();
    for pair in visits.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        // The vehicle travels during [a departs, b arrives)
        let (t0, t1) = (a.departure_sec, b.arrival_sec);
        if t1 <= t0 {
            continue;
        }
        let (p0, p1) = match (stops.get(&a.stop_id), stops.get(&b.stop_id)) {
            (Some(s0), Some(s1)) => (s0.pos, s1.pos),
            _ => continue,
        };
        if t1 <= window.start_sec() || t0 >= window.end_sec() {
            continue;
        }
        let ta = t0.max(window.start_sec());
        let tb = t1.min(window.end_sec());
        if tb <= ta {
            continue;
        }
        let ua = (ta - t0) as f64 / (t1 - t0) as f64;
        let ub = (tb - t0) as f64 / (t1 - t0) as f64;
        segments.push(ClippedSegment {
            start_sec: ta,
            end_sec: tb,
            start: lerp_point(p0, p1, ua),
            end: lerp_point(p0, p1, ub),
        });
    }
    segments
}

// The a*(1-u) + b*u form reproduces the endpoints exactly at u=0 and u=1
fn lerp(a: f64, b: f64, u: f64) -> f64 {
    a * (1.0 - u) + b * u
}

fn lerp_point(a: Point<f64>, b: Point<f64>, u: f64) -> Point<f64> {
    Point::new(lerp(a.x(), b.x(), u), lerp(a.y(), b.y(), u))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn visit(sequence: u32, arrival_sec: u32, departure_sec: u32, stop: &str) -> StopVisit {
        StopVisit {
            sequence,
            arrival_sec,
            departure_sec,
            stop_id: StopID::new(stop),
        }
    }

    fn stop_table(entries: &[(&str, f64, f64)]) -> BTreeMap<StopID, Stop> {
        entries
            .iter()
            .map(|(id, lat, lon)| {
                (
                    StopID::new(*id),
                    Stop {
                        stop_id: StopID::new(*id),
                        pos: Point::new(*lon, *lat),
                    },
                )
            })
            .collect()
    }

    fn diagonal_trip() -> (Vec<StopVisit>, BTreeMap<StopID, Stop>) {
        let visits = vec![
            visit(1, 32_400, 32_400, "a"),
            visit(2, 33_000, 33_010, "b"),
            visit(3, 36_500, 36_500, "c"),
        ];
        let stops = stop_table(&[("a", 0.0, 0.0), ("b", 1.0, 1.0), ("c", 2.0, 2.0)]);
        (visits, stops)
    }

    #[test]
    fn clips_at_the_window_end_and_interpolates() {
        let (visits, stops) = diagonal_trip();
        let segments = clip_trip_to_hour(&visits, &stops, HourWindow { hour: 9 });
        assert_eq!(segments.len(), 2);

        // First pair lies entirely inside the window, endpoints untouched
        assert_eq!(segments[0].start_sec, 32_400);
        assert_eq!(segments[0].end_sec, 33_000);
        assert_eq!(segments[0].start, Point::new(0.0, 0.0));
        assert_eq!(segments[0].end, Point::new(1.0, 1.0));

        // Second pair runs past 10:00 and is cut there
        assert_eq!(segments[1].start_sec, 33_010);
        assert_eq!(segments[1].end_sec, 36_000);
        assert_eq!(segments[1].start, Point::new(1.0, 1.0));
        let u = (36_000.0 - 33_010.0) / (36_500.0 - 33_010.0);
        assert_relative_eq!(segments[1].end.y(), 1.0 + u, epsilon = 1e-12);
        assert_relative_eq!(segments[1].end.x(), 1.0 + u, epsilon = 1e-12);
    }

    #[test]
    fn clips_at_the_window_start() {
        let (visits, stops) = diagonal_trip();
        let segments = clip_trip_to_hour(&visits, &stops, HourWindow { hour: 10 });
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_sec, 36_000);
        assert_eq!(segments[0].end_sec, 36_500);
        let u = (36_000.0 - 33_010.0) / (36_500.0 - 33_010.0);
        assert_relative_eq!(segments[0].start.y(), 1.0 + u, epsilon = 1e-12);
        // The raw segment ends inside this window, so its endpoint is exact
        assert_eq!(segments[0].end, Point::new(2.0, 2.0));
    }

    #[test]
    fn segments_stay_inside_the_window() {
        let (visits, stops) = diagonal_trip();
        for hour in 0..24 {
            let window = HourWindow { hour };
            for seg in clip_trip_to_hour(&visits, &stops, window) {
                assert!(window.start_sec() <= seg.start_sec);
                assert!(seg.start_sec < seg.end_sec);
                assert!(seg.end_sec <= window.end_sec());
            }
        }
    }

    #[test]
    fn no_overlap_means_no_segments() {
        let (visits, stops) = diagonal_trip();
        // Entirely before and entirely after the trip
        assert!(clip_trip_to_hour(&visits, &stops, HourWindow { hour: 8 }).is_empty());
        assert!(clip_trip_to_hour(&visits, &stops, HourWindow { hour: 11 }).is_empty());
    }

    #[test]
    fn pair_ending_exactly_at_window_start_is_excluded() {
        let visits = vec![visit(1, 32_000, 32_000, "a"), visit(2, 36_000, 36_000, "b")];
        let stops = stop_table(&[("a", 0.0, 0.0), ("b", 1.0, 1.0)]);
        // [32000, 36000) touches 10:00 but never enters the window
        assert!(clip_trip_to_hour(&visits, &stops, HourWindow { hour: 10 }).is_empty());
    }

    #[test]
    fn non_increasing_pairs_are_dropped() {
        let stops = stop_table(&[("a", 0.0, 0.0), ("b", 1.0, 1.0), ("c", 2.0, 2.0)]);
        // b arrives the moment a departs, then again strictly earlier
        let visits = vec![
            visit(1, 32_400, 32_400, "a"),
            visit(2, 32_400, 33_000, "b"),
            visit(3, 32_900, 32_900, "c"),
        ];
        assert!(clip_trip_to_hour(&visits, &stops, HourWindow { hour: 9 }).is_empty());
    }

    #[test]
    fn missing_stop_positions_drop_only_their_pairs() {
        let visits = vec![
            visit(1, 32_400, 32_400, "a"),
            visit(2, 33_000, 33_010, "mystery"),
            visit(3, 34_000, 34_000, "c"),
            visit(4, 35_000, 35_000, "d"),
        ];
        let stops = stop_table(&[("a", 0.0, 0.0), ("c", 2.0, 2.0), ("d", 3.0, 3.0)]);
        let segments = clip_trip_to_hour(&visits, &stops, HourWindow { hour: 9 });
        // Both pairs touching the unknown stop vanish; c->d survives
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_sec, 34_000);
        assert_eq!(segments[0].end_sec, 35_000);
    }

    #[test]
    fn short_trips_produce_nothing() {
        let stops = stop_table(&[("a", 0.0, 0.0)]);
        assert!(clip_trip_to_hour(&[], &stops, HourWindow { hour: 9 }).is_empty());
        let one = vec![visit(1, 32_400, 32_400, "a")];
        assert!(clip_trip_to_hour(&one, &stops, HourWindow { hour: 9 }).is_empty());
    }

    #[test]
    fn order_follows_the_visit_sequence() {
        let visits = vec![
            visit(1, 32_400, 32_400, "a"),
            visit(2, 33_000, 33_100, "b"),
            visit(3, 34_000, 34_100, "c"),
            visit(4, 35_000, 35_000, "d"),
        ];
        let stops = stop_table(&[
            ("a", 0.0, 0.0),
            ("b", 1.0, 1.0),
            ("c", 2.0, 2.0),
            ("d", 3.0, 3.0),
        ]);
        let segments = clip_trip_to_hour(&visits, &stops, HourWindow { hour: 9 });
        assert_eq!(segments.len(), 3);
        for pair in segments.windows(2) {
            assert!(pair[0].start_sec <= pair[1].start_sec);
        }
    }
}
