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

//! road congestion samples for the traffic overlay
//!
//! samples are obtained per configured route from a directions style API (see [`live_source`]) and served
//! through the time-boxed [`cache::TrafficCache`]. Unlike the flight pipeline nothing here runs periodically,
//! refreshes are driven by queries

use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize,Deserialize};

use noisemap_common::{
    datetime::{deserialize_duration,minutes,secs},
    geo::GeoPoint,
};

pub mod errors;
use errors::Result;

pub mod live_source;
pub mod cache;
pub mod traffic_service;

/// the lower bound of sample intensities
pub const MIN_INTENSITY: f64 = 0.3;

#[derive(Deserialize,Debug,Clone)]
#[serde(default)]
pub struct TrafficConfig {
    /// the directions endpoint
    pub api_url: String,
    /// supports `${ENV_VAR}` expansion. Traffic refreshes are refused if this is empty
    pub api_key: String,
    #[serde(deserialize_with="deserialize_duration")]
    pub ttl: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub request_timeout: Duration,
    pub routes: Vec<RouteConfig>,
}

impl Default for TrafficConfig {
    fn default()->Self {
        TrafficConfig {
            api_url: "https://maps.googleapis.com/maps/api/directions/json".into(),
            api_key: "${GOOGLE_MAPS_API_KEY}".into(),
            ttl: minutes(5),
            request_timeout: secs(10),
            routes: Vec::new(),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct RouteConfig {
    pub name: String,
    pub region: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// importance of the route, scales the derived intensity
    #[serde(default="default_weight")]
    pub weight: f64,
}

fn default_weight()->f64 { 1.0 }

/// a single congestion observation, positioned at the midpoint of its route
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct TrafficSample {
    pub lat: f64,
    pub lon: f64,
    /// normalized to [0.3,1.0]
    pub intensity: f64,
    pub route: String,
    pub region: String,
    /// seconds without traffic
    pub normal_duration: u64,
    /// seconds with current traffic
    pub traffic_duration: u64,
    pub delay_seconds: i64,
    pub delay_ratio: f64,
}

/// something that can produce a complete batch of traffic samples
#[async_trait]
pub trait TrafficSource: Send + Sync {
    async fn fetch_samples (&self)->Result<Vec<TrafficSample>>;
}

/// congestion intensity of a route: twice the relative delay capped at 1.0 and floored at 0.3, then scaled
/// by the route weight and clamped to [0.3,1.0] again
pub fn traffic_intensity (normal_duration: u64, traffic_duration: u64, weight: f64)->f64 {
    if normal_duration == 0 { return MIN_INTENSITY }
    let ratio = traffic_duration as f64 / normal_duration as f64;
    let raw = ((ratio - 1.0) * 2.0).min(1.0).max(MIN_INTENSITY);
    let weighted = raw * weight;
    if weighted.is_finite() { weighted.clamp( MIN_INTENSITY, 1.0) } else { MIN_INTENSITY }
}

impl TrafficSample {
    pub fn for_route (route: &RouteConfig, normal_duration: u64, traffic_duration: u64)->Self {
        let pos = route.origin.midpoint( &route.destination);
        let delay_seconds = traffic_duration as i64 - normal_duration as i64;
        let delay_ratio = if normal_duration > 0 { traffic_duration as f64 / normal_duration as f64 } else { 1.0 };

        TrafficSample {
            lat: pos.lat,
            lon: pos.lon,
            intensity: traffic_intensity( normal_duration, traffic_duration, route.weight),
            route: route.name.clone(),
            region: route.region.clone(),
            normal_duration,
            traffic_duration,
            delay_seconds,
            delay_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route (weight: f64)->RouteConfig {
        RouteConfig {
            name: "gangnam-jamsil".into(), region: "seoul".into(),
            origin: GeoPoint::from_lon_lat_degrees( 127.0276, 37.4979),
            destination: GeoPoint::from_lon_lat_degrees( 127.1000, 37.5133),
            weight
        }
    }

    #[test]
    fn test_intensity() {
        assert_eq!( traffic_intensity( 600, 600, 1.0), 0.3);   // no delay
        assert_eq!( traffic_intensity( 600, 500, 1.0), 0.3);   // faster than usual
        assert!( (traffic_intensity( 600, 750, 1.0) - 0.5).abs() < 1e-9);
        assert_eq!( traffic_intensity( 600, 1200, 1.0), 1.0);  // capped
        assert!( (traffic_intensity( 600, 900, 0.8) - 0.8).abs() < 1e-9);
        assert_eq!( traffic_intensity( 600, 600, 0.5), 0.3);   // weighted result never below the floor
        assert_eq!( traffic_intensity( 600, 1200, 1.5), 1.0);
        assert_eq!( traffic_intensity( 0, 100, 1.0), 0.3);
    }

    #[test]
    fn test_sample_for_route() {
        let s = TrafficSample::for_route( &route(1.0), 600, 900);
        assert!( (s.lat - 37.5056).abs() < 1e-9);
        assert!( (s.lon - 127.0638).abs() < 1e-9);
        assert_eq!( s.delay_seconds, 300);
        assert!( (s.delay_ratio - 1.5).abs() < 1e-9);
        assert_eq!( s.intensity, 1.0);
        assert_eq!( s.route, "gangnam-jamsil");
    }

    #[test]
    fn test_config() {
        let input = r#"(
            api_key: "secret",
            ttl: "2m",
            routes: [
                ( name: "r1", region: "seoul", origin: (lon: 127.0, lat: 37.5), destination: (lon: 127.1, lat: 37.6) ),
                ( name: "r2", region: "seoul", origin: (lon: 126.9, lat: 37.5), destination: (lon: 127.0, lat: 37.55), weight: 0.7 ),
            ]
        )"#;
        let config: TrafficConfig = ron::from_str( input).unwrap();
        assert_eq!( config.ttl, minutes(2));
        assert_eq!( config.request_timeout, secs(10));
        assert_eq!( config.routes.len(), 2);
        assert_eq!( config.routes[0].weight, 1.0);
        assert_eq!( config.routes[1].weight, 0.7);
    }
}
