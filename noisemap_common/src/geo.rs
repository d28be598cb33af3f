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

//! this module provides the small set of geodetic primitives we need for position data on a regional scale.
//! All coordinates are WGS84 degrees stored as f64

use serde::{Serialize,Deserialize};

/// a plain geodetic point. Note that we use (lon,lat) order in ctors to be consistent with GeoJSON
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPoint {
    #[serde(alias="longitude", alias="lng")]
    pub lon: f64,
    #[serde(alias="latitude")]
    pub lat: f64,
}

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64)->Self {
        GeoPoint { lon, lat }
    }

    pub fn is_valid (&self)->bool { is_valid_position( self.lat, self.lon) }

    /// simple arithmetic midpoint, which is good enough for the sub-degree distances of urban routes
    pub fn midpoint (&self, other: &GeoPoint)->GeoPoint {
        GeoPoint { lon: (self.lon + other.lon) / 2.0, lat: (self.lat + other.lat) / 2.0 }
    }
}

/// both coordinates have to be finite and within their respective WGS84 degree ranges
#[inline]
pub fn is_valid_position (lat: f64, lon: f64)->bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// the lattice coordinate of a grid cell index. Cells of size `grid_size` degrees are centered on
/// multiples of `grid_size`
#[inline]
pub fn grid_coord (idx: i64, grid_size: f64)->f64 {
    idx as f64 * grid_size
}
