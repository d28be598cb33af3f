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

//! a [`TrafficSource`] that queries a Google Directions style API once per configured route
//!
//! each response provides the normal and the traffic-affected duration of the route. Failing routes are
//! logged and skipped, only if no route succeeds the whole refresh fails

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug,warn};

use noisemap_common::{net, strings::env_expand_non_empty};
use crate::{
    RouteConfig, TrafficConfig, TrafficSample, TrafficSource,
    errors::{Result,TrafficError,op_failed},
};

/// the durations (in seconds) we get for a route
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct RouteDurations {
    pub normal: u64,
    pub in_traffic: u64,
}

#[derive(Deserialize,Debug)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize,Debug)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Deserialize,Debug)]
struct DirectionsLeg {
    duration: Option<TextValue>,
    duration_in_traffic: Option<TextValue>,
}

#[derive(Deserialize,Debug)]
struct TextValue {
    value: u64,
}

/// extract the route durations from a directions response. Without traffic information we assume there is no delay
pub fn parse_directions (json: &[u8])->Result<RouteDurations> {
    let response: DirectionsResponse = serde_json::from_slice( json).map_err( |e| TrafficError::Malformed( e.to_string()))?;
    durations_of( response)
}

fn durations_of (response: DirectionsResponse)->Result<RouteDurations> {
    if response.status != "OK" {
        let msg = response.error_message.unwrap_or_default();
        return Err( TrafficError::Malformed( format!("status {} {}", response.status, msg)))
    }

    let leg = response.routes.first()
        .and_then( |r| r.legs.first())
        .ok_or_else( || TrafficError::Malformed( "no route legs".into()))?;
    let normal = leg.duration.as_ref()
        .map( |d| d.value)
        .ok_or_else( || TrafficError::Malformed( "no route duration".into()))?;
    let in_traffic = leg.duration_in_traffic.as_ref().map( |d| d.value).unwrap_or( normal);

    Ok( RouteDurations { normal, in_traffic })
}

/// turn per-route results into a sample batch. Failed routes are skipped, a batch without any
/// successful route is an error
pub fn collect_samples<'a,I> (results: I)->Result<Vec<TrafficSample>>
    where I: IntoIterator<Item=(&'a RouteConfig, Result<RouteDurations>)>
{
    let mut samples = Vec::new();
    let mut n_failed = 0;

    for (route, res) in results {
        match res.and_then( |d| sample_for( route, d)) {
            Ok(sample) => samples.push( sample),
            Err(e) => {
                warn!("skipping traffic route {}: {e}", route.name);
                n_failed += 1;
            }
        }
    }

    if samples.is_empty() && n_failed > 0 {
        Err( TrafficError::AllRoutesFailed( n_failed))
    } else {
        Ok(samples)
    }
}

fn sample_for (route: &RouteConfig, d: RouteDurations)->Result<TrafficSample> {
    if d.normal == 0 {
        return Err( op_failed!("zero normal duration"))
    }
    Ok( TrafficSample::for_route( route, d.normal, d.in_traffic))
}

pub struct DirectionsTrafficSource {
    client: Client,
    config: TrafficConfig,
}

impl DirectionsTrafficSource {
    pub fn new (config: TrafficConfig)->Result<Self> {
        let client = net::build_client( config.request_timeout, concat!("noisemap/", env!("CARGO_PKG_VERSION")))?;
        Ok( DirectionsTrafficSource { client, config })
    }

    async fn route_durations (&self, route: &RouteConfig, api_key: &str)->Result<RouteDurations> {
        let query = [
            ("origin", format!("{},{}", route.origin.lat, route.origin.lon)),
            ("destination", format!("{},{}", route.destination.lat, route.destination.lon)),
            ("departure_time", "now".to_string()),
            ("key", api_key.to_string()),
        ];
        let response: DirectionsResponse = net::get_json( &self.client, &self.config.api_url, &query, None).await?;
        durations_of( response)
    }
}

#[async_trait]
impl TrafficSource for DirectionsTrafficSource {
    async fn fetch_samples (&self)->Result<Vec<TrafficSample>> {
        let api_key = env_expand_non_empty( &self.config.api_key)
            .ok_or_else( || TrafficError::ConfigurationMissing( "traffic api key".into()))?;
        if self.config.routes.is_empty() {
            return Err( TrafficError::ConfigurationMissing( "traffic routes".into()))
        }

        let mut results = Vec::with_capacity( self.config.routes.len());
        for route in &self.config.routes {
            let res = self.route_durations( route, &api_key).await;
            results.push( (route, res));
        }

        let samples = collect_samples( results)?;
        debug!("retrieved {} traffic samples", samples.len());
        Ok(samples)
    }
}
