#[macro_use]
extern crate log;

use anyhow::Result;
use structopt::StructOpt;

use gtfs::RouteID;
use model::{Config, Model};

#[derive(StructOpt)]
struct Args {
    /// The path to a GTFS directory or .zip archive
    #[structopt(long)]
    gtfs: String,
    /// Where to write the JSON document
    #[structopt(long, default_value = "all_trips.json")]
    out: String,
    /// Only process one route
    #[structopt(long)]
    route: Option<String>,
    /// Multiplier applied to lat/lon before rounding to integers
    #[structopt(long, default_value = "50000")]
    scale: u32,
    /// First hour of the day to process
    #[structopt(long, default_value = "9")]
    start_hour: u32,
    /// One past the last hour to process
    #[structopt(long, default_value = "18")]
    end_hour: u32,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            route_filter: self.route.clone().map(RouteID::new),
            scale: self.scale,
            start_hour: self.start_hour,
            end_hour: self.end_hour,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::from_args();

    let model = Model::load(&args.gtfs, args.config())?;
    let document = model.build();
    for per_hour in &document.trips_by_hour {
        info!("Hour {}: {} trips", per_hour.hour, per_hour.trips.len());
    }

    fs_err::write(&args.out, serde_json::to_string(&document)?)?;
    info!("Wrote {}", args.out);
    Ok(())
}
