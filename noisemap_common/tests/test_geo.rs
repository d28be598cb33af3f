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
use noisemap_common::BoundingBox;
use noisemap_common::geo::GeoPoint;

// run with "cargo test test_bbox -- --nocapture"

#[test]
fn test_bbox() {
    let bbox: BoundingBox<f64> = BoundingBox::new( 126.8, 37.4, 127.2, 37.7);
    println!("bbox = {:?}", bbox);
    assert!( bbox.is_valid());

    let degenerate = BoundingBox::new( 127.0, 37.5, 127.0, 37.5);
    assert!( degenerate.is_valid());

    let inverted = BoundingBox::new( 127.2, 37.4, 126.8, 37.7);
    assert!( !inverted.is_valid());
}

#[test]
fn test_bbox_ron() {
    let input = "(west: -122.5, south: 37.2, east: -121.8, north: 37.9)";
    let bbox: BoundingBox<f64> = ron::from_str( input).unwrap();
    assert_eq!( bbox.to_minmax_array(), [-122.5, 37.2, -121.8, 37.9]);
}

#[test]
fn test_geo_point_ron() {
    let p: GeoPoint = ron::from_str( "(longitude: 126.9780, latitude: 37.5665)").unwrap();
    assert!( p.is_valid());
    assert_eq!( p, GeoPoint::from_lon_lat_degrees( 126.9780, 37.5665));

    let off: GeoPoint = ron::from_str( "(lon: 190.0, lat: 37.5)").unwrap();
    assert!( !off.is_valid());
}
