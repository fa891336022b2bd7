use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::{StopID, Trip, TripID};

/// One scheduled visit of a trip to a stop. Times are GTFS clock values as
/// elapsed seconds since the start of the service day; they can exceed 24
/// hours for trips scheduled past midnight.
#[derive(Clone)]
pub struct StopVisit {
    pub sequence: u32,
    pub arrival_sec: u32,
    pub departure_sec: u32,
    pub stop_id: StopID,
}

/// Visits grouped per trip, sorted by stop_sequence. Rows that can't be used
/// are skipped individually; the rest of the trip is unaffected.
pub fn load<R: std::io::Read>(
    reader: R,
    trips: &BTreeMap<TripID, Trip>,
) -> Result<BTreeMap<TripID, Vec<StopVisit>>> {
    let mut visits: BTreeMap<TripID, Vec<StopVisit>> = BTreeMap::new();
    let mut skipped: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        match visit_from_record(rec, trips) {
            RowOutcome::Visit(trip_id, visit) => {
                visits.entry(trip_id).or_insert_with(Vec::new).push(visit);
            }
            RowOutcome::Skip(reason) => {
                *skipped.entry(reason.describe()).or_insert(0) += 1;
            }
        }
    }

    // Sort by stop_sequence, in case the file isn't in order. Sequence
    // numbers don't have to be contiguous.
    for list in visits.values_mut() {
        list.sort_by_key(|visit| visit.sequence);
    }

    for (reason, count) in skipped {
        warn!("Skipped {count} stop_times rows: {reason}");
    }
    Ok(visits)
}

enum RowOutcome {
    Visit(TripID, StopVisit),
    Skip(SkipReason),
}

#[derive(Debug, PartialEq)]
enum SkipReason {
    /// The trip was filtered out upstream, or never declared
    UnknownTrip,
    UnparseableTime,
    UnparseableSequence,
}

impl SkipReason {
    fn describe(&self) -> &'static str {
        match self {
            SkipReason::UnknownTrip => "trip not retained",
            SkipReason::UnparseableTime => "malformed arrival or departure time",
            SkipReason::UnparseableSequence => "malformed stop_sequence",
        }
    }
}

fn visit_from_record(rec: Record, trips: &BTreeMap<TripID, Trip>) -> RowOutcome {
    if !trips.contains_key(&rec.trip_id) {
        return RowOutcome::Skip(SkipReason::UnknownTrip);
    }
    let times = rec
        .arrival_time
        .as_deref()
        .and_then(parse_clock)
        .zip(rec.departure_time.as_deref().and_then(parse_clock));
    let (arrival_sec, departure_sec) = match times {
        Some(x) => x,
        None => return RowOutcome::Skip(SkipReason::UnparseableTime),
    };
    let sequence = match rec.stop_sequence.as_deref().and_then(|s| s.trim().parse().ok()) {
        Some(x) => x,
        None => return RowOutcome::Skip(SkipReason::UnparseableSequence),
    };
    RowOutcome::Visit(
        rec.trip_id,
        StopVisit {
            sequence,
            arrival_sec,
            departure_sec,
            stop_id: rec.stop_id,
        },
    )
}

/// "H:MM:SS" or "HH:MM:SS" to elapsed seconds. Hours past 23 are legal.
fn parse_clock(raw: &str) -> Option<u32> {
    let mut parts = raw.trim().split(':');
    let h: u32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let s: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    arrival_time: Option<String>,
    departure_time: Option<String>,
    stop_id: StopID,
    stop_sequence: Option<String>,
}
