use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{Route, RouteID};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripID(String);

impl TripID {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub headsign: String,
}

/// Trips referencing a route that wasn't retained are dropped.
pub fn load<R: std::io::Read>(
    reader: R,
    routes: &BTreeMap<RouteID, Route>,
) -> Result<BTreeMap<TripID, Trip>> {
    let mut trips = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if !routes.contains_key(&rec.route_id) {
            continue;
        }
        trips.insert(
            rec.trip_id.clone(),
            Trip {
                trip_id: rec.trip_id,
                route_id: rec.route_id,
                headsign: rec.trip_headsign.unwrap_or_default(),
            },
        );
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    route_id: RouteID,
    trip_headsign: Option<String>,
}
