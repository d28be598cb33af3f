/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! the flight side of the noisemap pipeline: retrieving live aircraft states from an upstream feed,
//! turning them into noise [`EmissionPoint`]s, broadcasting those to connected subscribers and recording
//! them in a durable log that can be aggregated into a [`DensityCell`] surface
//!
//! the main objects are created once at process start and shared through `Arc`s:
//!   - [`feed::FlightFeed`] (with the live [`feed::OpenSkyFeed`] implementation)
//!   - [`hub::BroadcastHub`]
//!   - [`store::SnapshotStore`]
//!   - [`scheduler::IngestScheduler`], which drives the others

use std::time::Duration;
use serde::{Serialize,Deserialize};

use noisemap_common::{
    BoundingBox,
    datetime::{EpochMillis,deserialize_duration,secs,hours,days},
};

pub mod errors;
pub mod noise;
pub mod feed;
pub mod hub;
pub mod store;
pub mod scheduler;
pub mod flight_service;

/// the category tag of all emission points derived from aircraft states
pub const FLIGHT_CATEGORY: &str = "flight";

#[derive(Deserialize,Debug,Clone)]
#[serde(default)]
pub struct FlightsConfig {
    /// the `states/all` endpoint of the upstream feed
    pub feed_url: String,
    pub bbox: BoundingBox<f64>,
    /// tag for all points derived from this feed
    pub region: String,

    /// optional basic auth credentials (supports `${ENV_VAR}` expansion)
    pub username: Option<String>,
    pub password: Option<String>,

    #[serde(deserialize_with="deserialize_duration")]
    pub request_timeout: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub flight_interval: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub retention_interval: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub retention_max_age: Duration,

    /// sqlx connection string of the durable log
    pub db_url: String,
    /// max number of queued messages per subscriber before we start to skip
    pub subscriber_capacity: usize,

    pub aggregate: AggregateConfig,
}

impl Default for FlightsConfig {
    fn default()->Self {
        FlightsConfig {
            feed_url: "https://opensky-network.org/api/states/all".into(),
            bbox: BoundingBox::new( 126.76, 37.41, 127.18, 37.70),
            region: "seoul".into(),
            username: None,
            password: None,
            request_timeout: secs(15),
            flight_interval: secs(30),
            retention_interval: hours(6),
            retention_max_age: days(7),
            db_url: "sqlite://noisemap.db".into(),
            subscriber_capacity: 16,
            aggregate: AggregateConfig::default(),
        }
    }
}

/// defaults for density aggregation queries
#[derive(Deserialize,Debug,Clone,Copy)]
#[serde(default)]
pub struct AggregateConfig {
    #[serde(deserialize_with="deserialize_duration")]
    pub window: Duration,
    /// cell size in degrees
    pub grid_size: f64,
    /// cells with fewer observations are dropped
    pub min_count: u32,
    /// observation count that corresponds to density 1.0
    pub capacity: u32,
}

impl Default for AggregateConfig {
    fn default()->Self {
        AggregateConfig { window: hours(24), grid_size: 0.01, min_count: 2, capacity: 50 }
    }
}

/// a decoded upstream aircraft state record. This only lives within a single ingest cycle
#[derive(Debug,Clone,PartialEq)]
pub struct AircraftState {
    pub id: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// meters, geometric if the feed has it, barometric otherwise
    pub altitude: Option<f64>,
    pub on_ground: bool,
    /// meters per second
    pub velocity: Option<f64>,
    /// feed supplied epoch seconds of the last position update
    pub position_time: Option<i64>,
}

impl AircraftState {
    /// the valid (finite, in range) position of an airborne aircraft
    pub fn airborne_position (&self)->Option<(f64,f64)> {
        if self.on_ground { return None }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if noisemap_common::geo::is_valid_position( lat, lon) => Some((lat,lon)),
            _ => None
        }
    }
}

/// a single noise observation. This is what we broadcast to subscribers and store in the log
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct EmissionPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// dB-like scalar in [60,90]
    pub noise_level: f64,
    pub category: String,
    pub region: String,
    pub timestamp: EpochMillis,
    #[serde(skip_serializing_if="noisemap_common::is_none", default)]
    pub altitude: Option<i64>,
    /// km/h
    #[serde(skip_serializing_if="noisemap_common::is_none", default)]
    pub speed: Option<i64>,
}

/// a grid cell of the aggregated emission point log
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct DensityCell {
    pub lat: f64,
    pub lon: f64,
    pub count: i64,
    /// normalized to [0,1]
    pub density: f64,
    pub noise_level: f64,
}

impl DensityCell {
    pub fn new (lat: f64, lon: f64, count: i64, capacity: u32)->Self {
        let density = density( count, capacity);
        DensityCell { lat, lon, count, density, noise_level: 40.0 + density * 50.0 }
    }
}

#[inline]
pub fn density (count: i64, capacity: u32)->f64 {
    if capacity == 0 { return 1.0 }
    (count as f64 / capacity as f64).min(1.0)
}
