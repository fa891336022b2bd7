use std::collections::BTreeMap;

use serde::Serialize;

use gtfs::{RouteID, StopID, TripID};

use crate::clip::{clip_trip_to_hour, HourWindow};
use crate::pack::{encode_stream, quantize};
use crate::Model;

/// The whole artifact a client needs to replay one day of movement. To
/// recover positions from a packed stream: base64-decode, read varints,
/// unzigzag, cumulative-sum, then divide coordinates by meta.q.
#[derive(Serialize)]
pub struct Document {
    pub meta: Meta,
    pub routes: BTreeMap<RouteID, RouteInfo>,
    pub stops_hourly: Vec<StopHourly>,
    pub trips_by_hour: Vec<HourTrips>,
}

#[derive(Serialize)]
pub struct Meta {
    pub q: u32,
    pub window: WindowMeta,
}

#[derive(Serialize)]
pub struct WindowMeta {
    pub start_hour: u32,
    pub end_hour: u32,
}

#[derive(Serialize)]
pub struct RouteInfo {
    pub short_name: String,
    pub color: String,
}

/// Departure counts per hour of the day for one stop
#[derive(Serialize)]
pub struct StopHourly {
    pub stop_id: StopID,
    pub lat: f64,
    pub lon: f64,
    pub hourly: Vec<u32>,
}

#[derive(Serialize)]
pub struct HourTrips {
    pub hour: u32,
    pub trips: Vec<PackedTripHour>,
}

/// One trip's movement within one hour window
#[derive(Serialize)]
pub struct PackedTripHour {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub headsign: String,
    pub segments_packed: SegmentsPacked,
}

#[derive(Serialize)]
pub struct SegmentsPacked {
    /// Clip start/end seconds, interleaved per segment
    pub t: String,
    /// Quantized lat/lon for both segment endpoints, interleaved
    pub p: String,
    /// Segment count
    pub n: usize,
}

impl Model {
    pub fn build(&self) -> Document {
        info!("Building hour-chunked trips");
        let mut trips_by_hour = Vec::new();
        for hour in self.config.start_hour..self.config.end_hour {
            let window = HourWindow { hour };
            let mut trips = Vec::new();
            for (trip_id, visits) in &self.gtfs.visits {
                let segments = clip_trip_to_hour(visits, &self.gtfs.stops, window);
                if segments.is_empty() {
                    continue;
                }

                let mut time_stream = Vec::with_capacity(segments.len() * 2);
                let mut pos_stream = Vec::with_capacity(segments.len() * 4);
                for seg in &segments {
                    time_stream.push(seg.start_sec as i32);
                    time_stream.push(seg.end_sec as i32);
                    pos_stream.push(quantize(seg.start.y(), self.config.scale));
                    pos_stream.push(quantize(seg.start.x(), self.config.scale));
                    pos_stream.push(quantize(seg.end.y(), self.config.scale));
                    pos_stream.push(quantize(seg.end.x(), self.config.scale));
                }

                let trip = &self.gtfs.trips[trip_id];
                trips.push(PackedTripHour {
                    trip_id: trip.trip_id.clone(),
                    route_id: trip.route_id.clone(),
                    headsign: trip.headsign.clone(),
                    segments_packed: SegmentsPacked {
                        t: encode_stream(&time_stream),
                        p: encode_stream(&pos_stream),
                        n: segments.len(),
                    },
                });
            }
            trips_by_hour.push(HourTrips { hour, trips });
        }

        Document {
            meta: Meta {
                q: self.config.scale,
                window: WindowMeta {
                    start_hour: self.config.start_hour,
                    end_hour: self.config.end_hour,
                },
            },
            routes: self
                .gtfs
                .routes
                .iter()
                .map(|(id, route)| {
                    (
                        id.clone(),
                        RouteInfo {
                            short_name: route.short_name.clone(),
                            color: route.color.clone(),
                        },
                    )
                })
                .collect(),
            stops_hourly: self.stops_hourly(),
            trips_by_hour,
        }
    }

    /// Departure counts per stop, bucketed by hour. Only departures inside
    /// the configured window count; the bucket index is still clamped to the
    /// day's 24 slots because GTFS times run past 23:59:59.
    fn stops_hourly(&self) -> Vec<StopHourly> {
        let window_start = self.config.start_hour * 3600;
        let window_end = self.config.end_hour * 3600;

        let mut counts: BTreeMap<&StopID, Vec<u32>> = BTreeMap::new();
        for visits in self.gtfs.visits.values() {
            for visit in visits {
                if !self.gtfs.stops.contains_key(&visit.stop_id) {
                    continue;
                }
                if visit.departure_sec < window_start || visit.departure_sec >= window_end {
                    continue;
                }
                let bucket = (visit.departure_sec / 3600).min(23) as usize;
                counts.entry(&visit.stop_id).or_insert_with(|| vec![0; 24])[bucket] += 1;
            }
        }

        counts
            .into_iter()
            .map(|(stop_id, hourly)| {
                let pos = self.gtfs.stops[stop_id].pos;
                StopHourly {
                    stop_id: stop_id.clone(),
                    lat: pos.y(),
                    lon: pos.x(),
                    hourly,
                }
            })
            .collect()
    }
}
