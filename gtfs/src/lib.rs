#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod routes;
mod stop_times;
mod stops;
mod trips;

use std::collections::BTreeMap;

use anyhow::Result;
use zip::ZipArchive;

pub use routes::{Route, RouteID, DEFAULT_ROUTE_COLOR};
pub use stop_times::StopVisit;
pub use stops::{Stop, StopID};
pub use trips::{Trip, TripID};

pub struct GTFS {
    pub routes: BTreeMap<RouteID, Route>,
    pub trips: BTreeMap<TripID, Trip>,
    pub stops: BTreeMap<StopID, Stop>,
    /// Per trip, sorted by stop_sequence
    pub visits: BTreeMap<TripID, Vec<StopVisit>>,
}

impl GTFS {
    /// `path` is either a directory of GTFS .txt files or a .zip archive
    /// containing them.
    pub fn load(path: &str, route_filter: Option<&RouteID>) -> Result<Self> {
        let gtfs = if path.ends_with(".zip") {
            let mut archive = ZipArchive::new(fs_err::File::open(path)?)?;
            Self::load_from_zip(&mut archive, route_filter)?
        } else {
            Self::load_from_dir(path, route_filter)?
        };
        info!(
            "Loaded {} routes, {} trips, {} stops, {} trips with stop times",
            gtfs.routes.len(),
            gtfs.trips.len(),
            gtfs.stops.len(),
            gtfs.visits.len()
        );
        dump_bounding_box(&gtfs.stops);
        Ok(gtfs)
    }

    pub fn load_from_dir(path: &str, route_filter: Option<&RouteID>) -> Result<Self> {
        let routes = routes::load(fs_err::File::open(format!("{path}/routes.txt"))?, route_filter)?;
        let trips = trips::load(fs_err::File::open(format!("{path}/trips.txt"))?, &routes)?;
        let stops = stops::load(fs_err::File::open(format!("{path}/stops.txt"))?)?;
        let visits = stop_times::load(fs_err::File::open(format!("{path}/stop_times.txt"))?, &trips)?;
        Ok(Self {
            routes,
            trips,
            stops,
            visits,
        })
    }

    pub fn load_from_zip<R: std::io::Read + std::io::Seek>(
        archive: &mut ZipArchive<R>,
        route_filter: Option<&RouteID>,
    ) -> Result<Self> {
        let routes = routes::load(get_zip_file(archive, "routes.txt")?, route_filter)?;
        let trips = trips::load(get_zip_file(archive, "trips.txt")?, &routes)?;
        let stops = stops::load(get_zip_file(archive, "stops.txt")?)?;
        let visits = stop_times::load(get_zip_file(archive, "stop_times.txt")?, &trips)?;
        Ok(Self {
            routes,
            trips,
            stops,
            visits,
        })
    }

    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
            trips: BTreeMap::new(),
            stops: BTreeMap::new(),
            visits: BTreeMap::new(),
        }
    }
}

// Adds the path in the error message
fn get_zip_file<'a, R: std::io::Read + std::io::Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<zip::read::ZipFile<'a>> {
    archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))
}

fn dump_bounding_box(stops: &BTreeMap<StopID, Stop>) {
    use geojson::{Feature, FeatureCollection, GeoJson};

    let mut pts = stops.values().map(|stop| stop.pos);
    let first = match pts.next() {
        Some(x) => x,
        None => {
            return;
        }
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        (first.x(), first.y(), first.x(), first.y());
    for pt in pts {
        min_x = min_x.min(pt.x());
        min_y = min_y.min(pt.y());
        max_x = max_x.max(pt.x());
        max_y = max_y.max(pt.y());
    }

    let ring = vec![
        vec![min_x, min_y],
        vec![max_x, min_y],
        vec![max_x, max_y],
        vec![min_x, max_y],
        vec![min_x, min_y],
    ];
    let feature = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    let gj = GeoJson::FeatureCollection(FeatureCollection {
        features: vec![feature],
        bbox: None,
        foreign_members: None,
    });
    info!(
        "GeoJSON covering the stops: {}",
        serde_json::to_string(&gj).unwrap()
    );
}
