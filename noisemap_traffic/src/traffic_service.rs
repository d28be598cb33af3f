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

//! `GET /api/traffic` (optional `refresh=true` to bypass the cache)

use std::{sync::Arc, time::Duration};
use axum::{Json, Router, extract::{Query, State}, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tracing::warn;

use noisemap_common::datetime::{EpochMillis, ser_duration_as_fractional_secs};
use crate::{TrafficSample, cache::TrafficCache, errors::TrafficError};

#[derive(Clone)]
pub struct TrafficServiceState {
    pub cache: Arc<TrafficCache>,
    pub ttl: Duration,
}

pub fn router (state: TrafficServiceState)->Router {
    Router::new()
        .route( "/api/traffic", get( traffic_handler))
        .with_state( state)
}

#[derive(Deserialize,Debug,Default)]
struct TrafficParams {
    #[serde(default)]
    refresh: bool,
}

#[derive(Serialize)]
#[serde(rename_all="camelCase")]
struct TrafficResponse {
    cached: bool,
    #[serde(serialize_with="ser_duration_as_fractional_secs")]
    age: Duration,
    fetched_at: EpochMillis,
    count: usize,
    data: Arc<Vec<TrafficSample>>,
}

fn error_status (e: &TrafficError)->StatusCode {
    match e {
        TrafficError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY
    }
}

async fn traffic_handler (State(state): State<TrafficServiceState>, Query(params): Query<TrafficParams>)
    ->std::result::Result<Json<TrafficResponse>,(StatusCode,String)>
{
    let res = if params.refresh { state.cache.force_refresh().await } else { state.cache.get( state.ttl).await };

    match res {
        Ok(batch) => Ok( Json( TrafficResponse {
            cached: batch.freshness.is_cached(),
            age: batch.freshness.age(),
            fetched_at: batch.fetched_at,
            count: batch.samples.len(),
            data: batch.samples,
        })),
        Err(e) => {
            warn!("traffic query failed: {e}");
            Err( (error_status( &e), e.to_string()))
        }
    }
}
