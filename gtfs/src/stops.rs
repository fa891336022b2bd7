use std::collections::BTreeMap;

use anyhow::Result;
use geo::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StopID(String);

impl StopID {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

pub struct Stop {
    pub stop_id: StopID,
    /// x is longitude, y is latitude
    pub pos: Point<f64>,
}

/// Rows without usable coordinates are skipped; every segment touching such a
/// stop is later dropped by the clipper.
pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<StopID, Stop>> {
    let mut stops = BTreeMap::new();
    let mut skipped = 0;
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let parsed = match (&rec.stop_lat, &rec.stop_lon) {
            (Some(lat), Some(lon)) => match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Some((lat, lon)),
                _ => None,
            },
            _ => None,
        };
        let (lat, lon) = match parsed {
            Some(x) => x,
            None => {
                skipped += 1;
                continue;
            }
        };
        stops.insert(
            rec.stop_id.clone(),
            Stop {
                stop_id: rec.stop_id,
                pos: Point::new(lon, lat),
            },
        );
    }
    if skipped > 0 {
        warn!("Skipped {skipped} stops without usable coordinates");
    }
    Ok(stops)
}

#[derive(Deserialize)]
struct Record {
    stop_id: StopID,
    stop_lat: Option<String>,
    stop_lon: Option<String>,
}
