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

//! the durable, append-only log of emission points
//!
//! points are stored with plain REAL lat/lon columns. Time and bounding box restrictions are served by the
//! `(category, observed_at)` and `(lat, lon)` indexes, grid snapping is done by SQLite itself in [`SnapshotStore::aggregate`].
//! All values are bound parameters

use std::{str::FromStr, time::Duration};
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::debug;

use noisemap_common::{
    BoundingBox,
    datetime::EpochMillis,
    geo::{grid_coord, is_valid_position},
};
use crate::{AggregateConfig, DensityCell, EmissionPoint, FLIGHT_CATEGORY, errors::StoreError};

pub type StoreResult<T> = std::result::Result<T,StoreError>;

const SCHEMA: [&str;3] = [
    "CREATE TABLE IF NOT EXISTS emission_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_id TEXT NOT NULL,
        category TEXT NOT NULL,
        region TEXT NOT NULL,
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        noise_level REAL NOT NULL,
        altitude INTEGER,
        speed INTEGER,
        observed_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_emission_points_category_time ON emission_points (category, observed_at)",
    "CREATE INDEX IF NOT EXISTS idx_emission_points_position ON emission_points (lat, lon)",
];

/// parameters of a density aggregation query
#[derive(Debug,Clone,Copy)]
pub struct AggregateQuery {
    pub bbox: BoundingBox<f64>,
    /// only points observed within this duration before `now` are counted
    pub window: Duration,
    pub grid_size: f64,
    pub min_count: u32,
    pub capacity: u32,
}

impl AggregateQuery {
    pub fn new (bbox: BoundingBox<f64>, defaults: &AggregateConfig)->Self {
        AggregateQuery {
            bbox,
            window: defaults.window,
            grid_size: defaults.grid_size,
            min_count: defaults.min_count,
            capacity: defaults.capacity
        }
    }
}

#[derive(FromRow,Debug)]
struct CellRow {
    lat_idx: i64,
    lon_idx: i64,
    n: i64,
}

pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    /// open (and if needed create) a file based store
    pub async fn open (db_url: &str)->StoreResult<Self> {
        let options = SqliteConnectOptions::from_str( db_url)?
            .create_if_missing( true)
            .journal_mode( SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections( 4)
            .connect_with( options).await?;

        Self::with_pool( pool).await
    }

    /// a store that lives only as long as its single connection, which we therefore never expire
    pub async fn open_in_memory ()->StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections( 1)
            .min_connections( 1)
            .idle_timeout( None)
            .max_lifetime( None)
            .connect( "sqlite::memory:").await?;

        Self::with_pool( pool).await
    }

    pub async fn with_pool (pool: SqlitePool)->StoreResult<Self> {
        for stmt in SCHEMA {
            sqlx::query( stmt).execute( &pool).await?;
        }
        Ok( SnapshotStore { pool })
    }

    /// persist a batch of points within a single transaction. If any point of the batch is invalid
    /// (non-finite or out of range coordinates, non-finite noise level) nothing gets stored
    pub async fn append (&self, points: &[EmissionPoint])->StoreResult<u64> {
        if let Some(p) = points.iter().find( |p| !is_storable( p)) {
            return Err( StoreError::InvalidPoint( format!("{} at ({},{}) noise {}", p.id, p.lat, p.lon, p.noise_level)))
        }

        let mut tx = self.pool.begin().await?;
        let mut n_rows = 0;

        for p in points {
            let res = sqlx::query(
                "INSERT INTO emission_points (source_id, category, region, lat, lon, noise_level, altitude, speed, observed_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
                .bind( p.id.as_str())
                .bind( p.category.as_str())
                .bind( p.region.as_str())
                .bind( p.lat)
                .bind( p.lon)
                .bind( p.noise_level)
                .bind( p.altitude)
                .bind( p.speed)
                .bind( p.timestamp.millis())
                .execute( &mut *tx).await?; // dropping the uncommitted tx rolls back
            n_rows += res.rows_affected();
        }

        tx.commit().await?;
        Ok(n_rows)
    }

    /// delete all points that are older than `max_age`, returning the number of deleted points
    pub async fn prune (&self, max_age: Duration)->StoreResult<u64> {
        self.prune_before( EpochMillis::now().minus( max_age)).await
    }

    pub async fn prune_before (&self, cutoff: EpochMillis)->StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query( "DELETE FROM emission_points WHERE observed_at < ?")
            .bind( cutoff.millis())
            .execute( &mut *tx).await?;
        tx.commit().await?;

        debug!("pruned {} points observed before {}", res.rows_affected(), cutoff);
        Ok( res.rows_affected())
    }

    /// grid aggregated flight points within the query window and bounding box, ordered by descending count
    pub async fn aggregate (&self, query: &AggregateQuery)->StoreResult<Vec<DensityCell>> {
        self.aggregate_at( EpochMillis::now(), query).await
    }

    pub async fn aggregate_at (&self, now: EpochMillis, query: &AggregateQuery)->StoreResult<Vec<DensityCell>> {
        if !(query.grid_size.is_finite() && query.grid_size > 0.0) {
            return Err( StoreError::InvalidQuery( format!("grid size {}", query.grid_size)))
        }

        let since = now.minus( query.window);
        let bbox = &query.bbox;

        let rows: Vec<CellRow> = sqlx::query_as(
            "SELECT CAST(ROUND(lat / ?) AS INTEGER) AS lat_idx,
                    CAST(ROUND(lon / ?) AS INTEGER) AS lon_idx,
                    COUNT(*) AS n
             FROM emission_points
             WHERE category = ? AND observed_at >= ?
               AND lon BETWEEN ? AND ? AND lat BETWEEN ? AND ?
             GROUP BY lat_idx, lon_idx
             HAVING COUNT(*) >= ?
             ORDER BY n DESC, lat_idx, lon_idx")
            .bind( query.grid_size)
            .bind( query.grid_size)
            .bind( FLIGHT_CATEGORY)
            .bind( since.millis())
            .bind( bbox.west)
            .bind( bbox.east)
            .bind( bbox.south)
            .bind( bbox.north)
            .bind( query.min_count as i64)
            .fetch_all( &self.pool).await?;

        Ok( rows.into_iter().map( |r| {
            DensityCell::new( grid_coord( r.lat_idx, query.grid_size), grid_coord( r.lon_idx, query.grid_size), r.n, query.capacity)
        }).collect())
    }

    /// close all pooled connections. Subsequent operations fail
    pub async fn close (&self) {
        self.pool.close().await
    }

    /// total number of stored points
    pub async fn count (&self)->StoreResult<i64> {
        let (n,): (i64,) = sqlx::query_as( "SELECT COUNT(*) FROM emission_points").fetch_one( &self.pool).await?;
        Ok(n)
    }
}

fn is_storable (p: &EmissionPoint)->bool {
    is_valid_position( p.lat, p.lon) && p.noise_level.is_finite()
}
