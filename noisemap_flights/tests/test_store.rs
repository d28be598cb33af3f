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

use noisemap_common::{BoundingBox, datetime::{EpochMillis, hours, days, minutes}};
use noisemap_flights::{
    AggregateConfig, EmissionPoint, FLIGHT_CATEGORY,
    errors::StoreError,
    store::{AggregateQuery, SnapshotStore},
};

fn point_at (id: &str, lat: f64, lon: f64, timestamp: EpochMillis)->EmissionPoint {
    EmissionPoint {
        id: id.to_string(), lat, lon, noise_level: 80.0,
        category: FLIGHT_CATEGORY.to_string(), region: "seoul".to_string(),
        timestamp, altitude: Some(2000), speed: None
    }
}

fn seoul_query ()->AggregateQuery {
    AggregateQuery::new( BoundingBox::new( 126.0, 37.0, 128.0, 38.0), &AggregateConfig::default())
}

#[tokio::test]
async fn test_append_and_count() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();

    let n = store.append( &[ point_at("a1", 37.5, 127.0, now), point_at("a2", 37.6, 126.9, now) ]).await.unwrap();
    assert_eq!( n, 2);
    assert_eq!( store.count().await.unwrap(), 2);

    assert_eq!( store.append( &[]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_batch_is_rejected() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();

    let batch = [
        point_at("a1", 37.5, 127.0, now),
        point_at("a2", f64::NAN, 127.0, now),
        point_at("a3", 37.6, 127.1, now),
    ];
    let res = store.append( &batch).await;
    assert!( matches!( res, Err(StoreError::InvalidPoint(_))));
    assert_eq!( store.count().await.unwrap(), 0); // none of the batch

    let mut loud = point_at("a4", 37.5, 127.0, now);
    loud.noise_level = f64::INFINITY;
    assert!( store.append( &[loud]).await.is_err());
    assert!( store.append( &[point_at("a5", 37.5, 181.0, now)]).await.is_err());
    assert_eq!( store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_prune() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();

    store.append( &[
        point_at("old1", 37.5, 127.0, now.minus( days(8))),
        point_at("old2", 37.5, 127.0, now.minus( days(10))),
        point_at("new", 37.5, 127.0, now.minus( hours(1))),
    ]).await.unwrap();

    assert_eq!( store.prune( days(7)).await.unwrap(), 2);
    assert_eq!( store.prune( days(7)).await.unwrap(), 0);
    assert_eq!( store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_aggregate() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();

    store.append( &[
        // three points in the 37.50/127.00 cell
        point_at("a1", 37.5001, 127.0002, now.minus( minutes(5))),
        point_at("a2", 37.4998, 126.9999, now.minus( minutes(10))),
        point_at("a3", 37.5003, 127.0004, now.minus( minutes(15))),
        // two in the 37.55/126.95 cell
        point_at("b1", 37.5510, 126.9510, now.minus( minutes(1))),
        point_at("b2", 37.5512, 126.9508, now.minus( minutes(2))),
        // a single point cell
        point_at("c1", 37.6000, 127.1000, now.minus( minutes(1))),
        // outside of the window
        point_at("d1", 37.5000, 127.0000, now.minus( hours(30))),
        // outside of the bounding box
        point_at("e1", 35.1000, 129.0000, now.minus( minutes(1))),
        point_at("e2", 35.1000, 129.0000, now.minus( minutes(1))),
    ]).await.unwrap();

    let cells = store.aggregate_at( now, &seoul_query()).await.unwrap();
    assert_eq!( cells.len(), 2);

    let c = &cells[0];
    assert_eq!( c.count, 3);
    assert!( (c.lat - 37.5).abs() < 1e-9);
    assert!( (c.lon - 127.0).abs() < 1e-9);
    assert!( (c.density - 0.06).abs() < 1e-9);
    assert!( (c.noise_level - 43.0).abs() < 1e-9);

    let c = &cells[1];
    assert_eq!( c.count, 2);
    assert!( (c.lat - 37.55).abs() < 1e-9);
    assert!( (c.lon - 126.95).abs() < 1e-9);

    // with min_count 1 the single point cell shows up last
    let mut query = seoul_query();
    query.min_count = 1;
    let cells = store.aggregate_at( now, &query).await.unwrap();
    assert_eq!( cells.len(), 3);
    assert_eq!( cells[2].count, 1);
}

#[tokio::test]
async fn test_aggregate_saturates() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();

    let batch: Vec<EmissionPoint> = (0..60).map( |i| point_at( &format!("a{i}"), 37.5, 127.0, now.minus( minutes(1)))).collect();
    store.append( &batch).await.unwrap();

    let cells = store.aggregate_at( now, &seoul_query()).await.unwrap();
    assert_eq!( cells.len(), 1);
    assert_eq!( cells[0].count, 60);
    assert_eq!( cells[0].density, 1.0);
    assert_eq!( cells[0].noise_level, 90.0);
}

#[tokio::test]
async fn test_aggregate_ignores_other_categories() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();

    let mut p1 = point_at("t1", 37.5, 127.0, now);
    let mut p2 = point_at("t2", 37.5, 127.0, now);
    p1.category = "traffic".into();
    p2.category = "traffic".into();
    store.append( &[p1, p2]).await.unwrap();

    assert!( store.aggregate_at( now, &seoul_query()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_aggregate_cell_boundaries() {
    let store = SnapshotStore::open_in_memory().await.unwrap();
    let now = EpochMillis::now();
    let t = now.minus( minutes(1));

    store.append( &[
        // just inside the 37.50/127.00 cell on either side
        point_at("a1", 37.5049, 127.0049, t),
        point_at("a2", 37.4951, 126.9951, t),
        // just across into the 37.51/127.00 cell
        point_at("b1", 37.5051, 127.0000, t),
        point_at("b2", 37.5149, 127.0049, t),
        // negative longitudes round away from zero
        point_at("c1", 37.7749, -122.4149, t),
        point_at("c2", 37.7701, -122.4051, t),
    ]).await.unwrap();

    let cells = store.aggregate_at( now, &seoul_query()).await.unwrap();
    let cells: Vec<(f64,f64,i64)> = cells.iter().map( |c| (c.lat, c.lon, c.count)).collect();
    assert_eq!( cells.len(), 2, "unexpected cells {cells:?}");
    assert!( (cells[0].0 - 37.50).abs() < 1e-9 && (cells[0].1 - 127.0).abs() < 1e-9 && cells[0].2 == 2);
    assert!( (cells[1].0 - 37.51).abs() < 1e-9 && (cells[1].1 - 127.0).abs() < 1e-9 && cells[1].2 == 2);

    let sf = AggregateQuery::new( BoundingBox::new( -123.0, 37.0, -122.0, 38.0), &AggregateConfig::default());
    let cells = store.aggregate_at( now, &sf).await.unwrap();
    assert_eq!( cells.len(), 1);
    assert!( (cells[0].lat - 37.77).abs() < 1e-9);
    assert!( (cells[0].lon + 122.41).abs() < 1e-9);

    // coarser grids merge the seoul cells
    let mut query = seoul_query();
    query.grid_size = 0.05;
    let cells = store.aggregate_at( now, &query).await.unwrap();
    assert_eq!( cells.len(), 1);
    assert_eq!( cells[0].count, 4);
    assert!( (cells[0].lat - 37.5).abs() < 1e-9 && (cells[0].lon - 127.0).abs() < 1e-9);
}
