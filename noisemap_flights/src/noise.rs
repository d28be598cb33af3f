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

//! noise estimation for aircraft states. Everything in here is a pure function so that it can be
//! tested without any network or storage access

use uom::si::{f64::Velocity, velocity::{meter_per_second,kilometer_per_hour}};
use noisemap_common::datetime::EpochMillis;

use crate::{AircraftState, EmissionPoint, FLIGHT_CATEGORY};

/// below this altitude (meters) we assume maximum noise exposure
pub const MAX_NOISE_ALTITUDE: f64 = 1000.0;
/// above this altitude (meters) noise exposure is negligible
pub const MIN_NOISE_ALTITUDE: f64 = 10000.0;
/// the level we use for negligible exposure and unknown altitudes
pub const NEGLIGIBLE_LEVEL: f64 = 0.1;

/// map an (optional) altitude in meters to a noise level within [0,1]
///
/// unknown or non-finite altitudes and altitudes above 10000m map to 0.1, altitudes below 1000m to 1.0, and
/// everything in between (including 10000m itself) is linearly interpolated
pub fn estimate (altitude: Option<f64>)->f64 {
    match altitude {
        Some(alt) if alt.is_finite() => {
            if alt > MIN_NOISE_ALTITUDE {
                NEGLIGIBLE_LEVEL
            } else if alt < MAX_NOISE_ALTITUDE {
                1.0
            } else {
                1.0 - (alt - MAX_NOISE_ALTITUDE) / (MIN_NOISE_ALTITUDE - MAX_NOISE_ALTITUDE)
            }
        }
        _ => NEGLIGIBLE_LEVEL
    }
}

/// the dB-like display scale [60,90] of a noise level
#[inline]
pub fn to_decibel (level: f64)->f64 {
    60.0 + level * 30.0
}

/// turn an aircraft state into an emission point. This returns `None` for aircraft that are on the
/// ground or have no valid position. Missing or unrepresentable position times are replaced by `cycle_time`
pub fn emission_point (state: &AircraftState, region: &str, cycle_time: EpochMillis)->Option<EmissionPoint> {
    let (lat,lon) = state.airborne_position()?;

    let timestamp = state.position_time.and_then( EpochMillis::from_secs).unwrap_or( cycle_time);
    let altitude = state.altitude.filter( |a| a.is_finite()).map( |a| a.round() as i64);
    let speed = state.velocity.filter( |v| v.is_finite()).map( |v| {
        Velocity::new::<meter_per_second>(v).get::<kilometer_per_hour>().round() as i64
    });

    Some( EmissionPoint {
        id: state.id.clone(),
        lat,
        lon,
        noise_level: to_decibel( estimate( state.altitude)),
        category: FLIGHT_CATEGORY.to_string(),
        region: region.to_string(),
        timestamp,
        altitude,
        speed,
    })
}

/// the emission points of all airborne and positioned aircraft
pub fn emission_points (states: &[AircraftState], region: &str, cycle_time: EpochMillis)->Vec<EmissionPoint> {
    states.iter().filter_map( |s| emission_point( s, region, cycle_time)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state (id: &str, lat: Option<f64>, lon: Option<f64>, alt: Option<f64>, on_ground: bool)->AircraftState {
        AircraftState { id: id.into(), lat, lon, altitude: alt, on_ground, velocity: Some(100.0), position_time: None }
    }

    #[test]
    fn test_estimate() {
        assert_eq!( estimate( Some(500.0)), 1.0);
        assert_eq!( estimate( Some(1000.0)), 1.0);
        assert_eq!( estimate( Some(5500.0)), 0.5);
        assert!( estimate( Some(10000.0)) < 1.0);
        assert_eq!( estimate( Some(20000.0)), 0.1);
        assert_eq!( estimate( None), 0.1);
        assert_eq!( estimate( Some(f64::NAN)), 0.1);
    }

    #[test]
    fn test_estimate_range() {
        let mut alt = -500.0;
        while alt < 15000.0 {
            let level = estimate( Some(alt));
            assert!( (0.0..=1.0).contains(&level), "level {level} for altitude {alt} out of range");
            alt += 37.5;
        }
    }

    #[test]
    fn test_decibel() {
        assert_eq!( to_decibel(1.0), 90.0);
        assert_eq!( to_decibel(0.0), 60.0);
        assert_eq!( to_decibel(0.5), 75.0);
    }

    #[test]
    fn test_filter_states() {
        let now = EpochMillis::new( 1_700_000_000_000);
        let states = vec![
            state( "a1", Some(37.5), Some(127.0), Some(800.0), false),
            state( "a2", Some(37.5), Some(127.0), Some(0.0), true),    // on ground
            state( "a3", None, Some(127.0), Some(3000.0), false),      // no latitude
            state( "a4", Some(37.5), None, Some(3000.0), false),       // no longitude
            state( "a5", Some(f64::NAN), Some(127.0), Some(3000.0), false),
            state( "a6", Some(37.6), Some(126.9), None, false),
        ];

        let points = emission_points( &states, "seoul", now);
        let ids: Vec<&str> = points.iter().map( |p| p.id.as_str()).collect();
        assert_eq!( ids, vec!["a1", "a6"]);

        let p = &points[0];
        assert_eq!( p.noise_level, 90.0);
        assert_eq!( p.category, FLIGHT_CATEGORY);
        assert_eq!( p.region, "seoul");
        assert_eq!( p.timestamp, now);
        assert_eq!( p.altitude, Some(800));
        assert_eq!( p.speed, Some(360)); // 100 m/s

        let p = &points[1];
        assert!( (p.noise_level - 63.0).abs() < 1e-9);
        assert_eq!( p.altitude, None);
    }

    #[test]
    fn test_position_time() {
        let mut s = state( "a1", Some(37.5), Some(127.0), Some(1234.4), false);
        s.position_time = Some( 1_700_000_100);
        let p = emission_point( &s, "seoul", EpochMillis::new(0)).unwrap();
        assert_eq!( p.timestamp.millis(), 1_700_000_100_000);
        assert_eq!( p.altitude, Some(1234));
    }

    #[test]
    fn test_out_of_range_position_time() {
        let now = EpochMillis::new( 1_700_000_000_000);
        let mut s = state( "a1", Some(37.5), Some(127.0), Some(3000.0), false);

        for t in [ 9_300_000_000_000_000, i64::MAX, i64::MIN, 9_000_000_000_000 ] {
            s.position_time = Some(t);
            let points = emission_points( std::slice::from_ref( &s), "seoul", now);
            assert_eq!( points.len(), 1);
            assert_eq!( points[0].timestamp, now, "position time {t} not replaced");
        }
    }
}
