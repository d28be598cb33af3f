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

//! retrieval of aircraft state snapshots from an OpenSky style `states/all` endpoint
//!
//! the upstream payload is a JSON object with a `states` array of fixed order records. We decode those
//! into [`AircraftState`] right here so that positional arrays never leave this module

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use noisemap_common::{
    BoundingBox,
    net::{self,BasicAuth},
    strings::env_expand_non_empty,
};
use crate::{AircraftState, FlightsConfig, errors::{FeedError,Result}};

/// something that can produce the current aircraft states within a bounding box.
/// Failures are always recoverable, callers treat them as "no aircraft in this cycle"
#[async_trait]
pub trait FlightFeed: Send + Sync {
    async fn fetch (&self, bbox: &BoundingBox<f64>)->std::result::Result<Vec<AircraftState>,FeedError>;
}

// record field indices of the upstream state vectors
const ICAO24: usize = 0;
const TIME_POSITION: usize = 3;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const ON_GROUND: usize = 8;
const VELOCITY: usize = 9;
const GEO_ALTITUDE: usize = 13;

#[derive(Deserialize,Debug)]
struct StatesResponse {
    #[allow(unused)]
    time: Option<i64>,
    states: Option<Vec<Vec<Value>>>,
}

pub struct OpenSkyFeed {
    client: Client,
    url: String,
    auth: Option<BasicAuth>,
}

impl OpenSkyFeed {
    pub fn new (config: &FlightsConfig)->Result<Self> {
        let client = net::build_client( config.request_timeout, concat!("noisemap/", env!("CARGO_PKG_VERSION"))).map_err( FeedError::from)?;
        Ok( Self::with_client( client, config))
    }

    pub fn with_client (client: Client, config: &FlightsConfig)->Self {
        let user = config.username.as_deref().and_then( env_expand_non_empty);
        let password = config.password.as_deref().and_then( env_expand_non_empty);

        OpenSkyFeed {
            client,
            url: config.feed_url.clone(),
            auth: BasicAuth::from_opt( user, password),
        }
    }
}

#[async_trait]
impl FlightFeed for OpenSkyFeed {
    async fn fetch (&self, bbox: &BoundingBox<f64>)->std::result::Result<Vec<AircraftState>,FeedError> {
        let query = [
            ("lamin", bbox.south.to_string()),
            ("lomin", bbox.west.to_string()),
            ("lamax", bbox.north.to_string()),
            ("lomax", bbox.east.to_string()),
        ];

        let response: StatesResponse = net::get_json( &self.client, &self.url, &query, self.auth.as_ref()).await?;
        let states = decode_states( response);
        debug!("fetched {} aircraft states from {}", states.len(), self.url);
        Ok(states)
    }
}

/// parse a raw `states/all` response body
pub fn parse_states (json: &[u8])->std::result::Result<Vec<AircraftState>,FeedError> {
    let response: StatesResponse = serde_json::from_slice( json).map_err( |e| FeedError::Malformed( e.to_string()))?;
    Ok( decode_states( response))
}

/// a missing or null `states` array means there are no aircraft in the box
fn decode_states (response: StatesResponse)->Vec<AircraftState> {
    match response.states {
        Some(records) => records.iter().filter_map( |rec| decode_record( rec)).collect(),
        None => Vec::new()
    }
}

/// records without an identifier are dropped, all other fields are optional at this level
fn decode_record (rec: &[Value])->Option<AircraftState> {
    let id = rec.get(ICAO24)?.as_str()?.trim();
    if id.is_empty() { return None }

    let f64_at = |i: usize| rec.get(i).and_then( Value::as_f64);

    Some( AircraftState {
        id: id.to_string(),
        lat: f64_at( LATITUDE),
        lon: f64_at( LONGITUDE),
        altitude: f64_at( GEO_ALTITUDE).or_else( || f64_at( BARO_ALTITUDE)),
        on_ground: rec.get(ON_GROUND).and_then( Value::as_bool).unwrap_or(false),
        velocity: f64_at( VELOCITY),
        position_time: rec.get(TIME_POSITION).and_then( Value::as_i64),
    })
}
