#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod clip;
mod document;
mod pack;

use anyhow::Result;
use gtfs::{RouteID, GTFS};

pub use self::clip::{clip_trip_to_hour, ClippedSegment, HourWindow};
pub use self::document::{
    Document, HourTrips, Meta, PackedTripHour, RouteInfo, SegmentsPacked, StopHourly, WindowMeta,
};
pub use self::pack::{
    decode_stream, encode_stream, pack_stream, quantize, unpack_stream, unzigzag, varint_encode,
    zigzag,
};

/// All the knobs in one immutable value; nothing here is ambient state.
pub struct Config {
    /// When set, only this route (and its trips) survive loading
    pub route_filter: Option<RouteID>,
    /// Coordinates are multiplied by this and rounded before packing
    pub scale: u32,
    /// Hours processed are [start_hour, end_hour)
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            route_filter: None,
            scale: 50_000,
            start_hour: 9,
            end_hour: 18,
        }
    }
}

pub struct Model {
    pub gtfs: GTFS,
    pub config: Config,
}

impl Model {
    pub fn new(gtfs: GTFS, config: Config) -> Result<Self> {
        if config.start_hour >= config.end_hour {
            bail!(
                "Empty hour window: [{}, {})",
                config.start_hour,
                config.end_hour
            );
        }
        if config.scale == 0 {
            bail!("Quantization scale can't be 0");
        }
        Ok(Self { gtfs, config })
    }

    /// `path` is a GTFS directory or .zip archive
    pub fn load(path: &str, config: Config) -> Result<Self> {
        let gtfs = GTFS::load(path, config.route_filter.as_ref())?;
        Self::new(gtfs, config)
    }
}
