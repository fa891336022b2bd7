use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteID(String);

impl RouteID {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }
}

/// Fallback when routes.txt doesn't specify route_color
pub const DEFAULT_ROUTE_COLOR: &str = "#084C8D";

pub struct Route {
    pub route_id: RouteID,
    pub short_name: String,
    /// Uppercase "#RRGGBB"
    pub color: String,
}

pub fn load<R: std::io::Read>(
    reader: R,
    route_filter: Option<&RouteID>,
) -> Result<BTreeMap<RouteID, Route>> {
    let mut routes = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if let Some(only) = route_filter {
            if &rec.route_id != only {
                continue;
            }
        }
        routes.insert(
            rec.route_id.clone(),
            Route {
                route_id: rec.route_id,
                short_name: rec.route_short_name.unwrap_or_default(),
                color: normalize_color(rec.route_color.as_deref()),
            },
        );
    }
    Ok(routes)
}

fn normalize_color(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return DEFAULT_ROUTE_COLOR.to_string();
    }
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    format!("#{}", hex.to_uppercase())
}

#[derive(Deserialize)]
struct Record {
    route_id: RouteID,
    route_short_name: Option<String>,
    route_color: Option<String>,
}
