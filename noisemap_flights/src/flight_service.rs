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

//! the HTTP and WebSocket surface of the flight pipeline
//!
//! - `GET /ws` : live subscriber channel (welcome, last known batch, then one message per flight cycle)
//! - `GET /api/noise` : the last known emission point batch
//! - `GET /api/heatmap` : density cells of the stored log (optional `west,south,east,north,window,grid,minCount`)
//! - `GET /api/stats` : subscriber and storage counts

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    Json, Router,
    extract::{ConnectInfo, Query, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use noisemap_common::{
    BoundingBox,
    datetime::{EpochMillis, parse_human_duration, ser_duration_as_fractional_secs},
};
use crate::{
    DensityCell, EmissionPoint, FlightsConfig,
    hub::BroadcastHub,
    store::{AggregateQuery, SnapshotStore},
};

#[derive(Clone)]
pub struct FlightServiceState {
    pub hub: Arc<BroadcastHub>,
    pub store: Arc<SnapshotStore>,
    pub config: Arc<FlightsConfig>,
}

pub fn router (state: FlightServiceState)->Router {
    Router::new()
        .route( "/ws", get( ws_handler))
        .route( "/api/noise", get( noise_handler))
        .route( "/api/heatmap", get( heatmap_handler))
        .route( "/api/stats", get( stats_handler))
        .with_state( state)
}

type ApiResult<T> = std::result::Result<Json<T>,(StatusCode,String)>;

fn internal_error<E: std::fmt::Display> (e: E)->(StatusCode,String) {
    warn!("request failed: {e}");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/* #region websocket ***************************************************************************/

async fn ws_handler (ws: WebSocketUpgrade, ConnectInfo(addr): ConnectInfo<SocketAddr>, State(state): State<FlightServiceState>)->Response {
    ws.on_upgrade( move |socket| handle_socket( socket, addr, state.hub)).into_response()
}

/// forward hub messages until either the client or the hub side closes
async fn handle_socket (ws: WebSocket, remote_addr: SocketAddr, hub: Arc<BroadcastHub>) {
    let mut subscription = match hub.subscribe() {
        Ok(sub) => sub,
        Err(e) => {
            warn!("failed to subscribe {remote_addr}: {e}");
            return
        }
    };
    let id = subscription.id;
    info!("subscriber {id} connected from {remote_addr}");

    let (mut ws_sender, mut ws_receiver) = ws.split();

    loop {
        tokio::select! {
            msg = subscription.rx.recv() => match msg {
                Some(msg) => {
                    if ws_sender.send( Message::text( msg.to_string())).await.is_err() { break }
                }
                None => break
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {} // clients have nothing to say
            }
        }
    }

    hub.unsubscribe( id);
    info!("subscriber {id} from {remote_addr} disconnected");
}

/* #endregion websocket */

/* #region REST ********************************************************************************/

#[derive(Serialize)]
#[serde(rename_all="camelCase")]
struct NoiseResponse {
    #[serde(skip_serializing_if="noisemap_common::is_none")]
    timestamp: Option<EpochMillis>,
    data: Arc<Vec<EmissionPoint>>,
}

async fn noise_handler (State(state): State<FlightServiceState>)->Json<NoiseResponse> {
    Json( NoiseResponse {
        timestamp: state.hub.last_update(),
        data: state.hub.last_known().unwrap_or_default(),
    })
}

#[derive(Deserialize,Debug,Default)]
#[serde(rename_all="camelCase")]
struct HeatmapParams {
    west: Option<f64>,
    south: Option<f64>,
    east: Option<f64>,
    north: Option<f64>,
    window: Option<String>,
    grid: Option<f64>,
    min_count: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all="camelCase")]
struct HeatmapResponse {
    generated_at: EpochMillis,
    #[serde(serialize_with="ser_duration_as_fractional_secs")]
    window: Duration,
    grid_size: f64,
    cells: Vec<DensityCell>,
}

fn heatmap_query (params: &HeatmapParams, config: &FlightsConfig)->std::result::Result<AggregateQuery,String> {
    let dflt = config.bbox;
    let bbox = BoundingBox::new(
        params.west.unwrap_or( dflt.west),
        params.south.unwrap_or( dflt.south),
        params.east.unwrap_or( dflt.east),
        params.north.unwrap_or( dflt.north)
    );
    if !bbox.is_valid() {
        return Err( format!("invalid bounding box {:?}", bbox.to_minmax_array()))
    }

    let mut query = AggregateQuery::new( bbox, &config.aggregate);
    if let Some(window) = &params.window {
        query.window = parse_human_duration( window)?;
    }
    if let Some(grid) = params.grid {
        if !(grid.is_finite() && grid > 0.0) { return Err( format!("invalid grid size {grid}")) }
        query.grid_size = grid;
    }
    if let Some(min_count) = params.min_count {
        query.min_count = min_count;
    }
    Ok(query)
}

async fn heatmap_handler (State(state): State<FlightServiceState>, Query(params): Query<HeatmapParams>)->ApiResult<HeatmapResponse> {
    let query = heatmap_query( &params, &state.config).map_err( |msg| (StatusCode::BAD_REQUEST, msg))?;
    let now = EpochMillis::now();
    let cells = state.store.aggregate_at( now, &query).await.map_err( internal_error)?;
    debug!("heatmap query {params:?} -> {} cells", cells.len());

    Ok( Json( HeatmapResponse { generated_at: now, window: query.window, grid_size: query.grid_size, cells }))
}

#[derive(Serialize)]
#[serde(rename_all="camelCase")]
struct StatsResponse {
    subscribers: usize,
    stored_points: i64,
    #[serde(skip_serializing_if="noisemap_common::is_none")]
    last_update: Option<EpochMillis>,
    last_batch_size: usize,
}

async fn stats_handler (State(state): State<FlightServiceState>)->ApiResult<StatsResponse> {
    let stored_points = state.store.count().await.map_err( internal_error)?;
    Ok( Json( StatsResponse {
        subscribers: state.hub.subscriber_count(),
        stored_points,
        last_update: state.hub.last_update(),
        last_batch_size: state.hub.last_known().map( |pts| pts.len()).unwrap_or(0),
    }))
}

/* #endregion REST */
