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

use std::path::Path;
use noisemap_common::{config::load_config, datetime::{secs, hours, days}};
use noisemap_flights::FlightsConfig;

#[test]
fn test_flights_config_file() {
    let dir = Path::new( env!("CARGO_MANIFEST_DIR")).join("../configs");
    let config: FlightsConfig = load_config( &dir, "flights").unwrap();

    assert_eq!( config.region, "seoul");
    assert!( config.bbox.is_valid());
    assert_eq!( config.flight_interval, secs(30));
    assert_eq!( config.retention_interval, hours(6));
    assert_eq!( config.retention_max_age, days(7));
    assert_eq!( config.aggregate.window, hours(24));
    assert_eq!( config.aggregate.min_count, 2);
    assert_eq!( config.aggregate.capacity, 50);
}

#[test]
fn test_partial_config() {
    let config: FlightsConfig = ron::from_str( r#"(region: "busan", flight_interval: "10s")"#).unwrap();
    assert_eq!( config.region, "busan");
    assert_eq!( config.flight_interval, secs(10));
    assert_eq!( config.retention_max_age, days(7));
    assert!( config.username.is_none());
}
