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

use std::{path::PathBuf, sync::Arc};
use anyhow::Result;
use clap::Parser;
use tracing::{info,warn};

use noisemap_common::{
    config::{config_dir, load_config_or_default},
    logging::init_tracing,
    server::{ServerConfig, spawn_server_task},
};
use noisemap_flights::{
    FlightsConfig,
    feed::{FlightFeed, OpenSkyFeed},
    flight_service::{self, FlightServiceState},
    hub::BroadcastHub,
    scheduler::IngestScheduler,
    store::SnapshotStore,
};
use noisemap_traffic::{
    TrafficConfig,
    cache::TrafficCache,
    live_source::DirectionsTrafficSource,
    traffic_service::{self, TrafficServiceState},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "live aircraft noise and traffic congestion server")]
pub struct Args {
    /// directory with server.ron, flights.ron and traffic.ron (default: $NOISEMAP_CONFIG_DIR or ./configs)
    #[arg(short,long)]
    pub config_dir: Option<PathBuf>,

    /// only serve stored data, do not start the ingest cycles
    #[arg(long)]
    pub no_ingest: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    init_tracing();
    let args = Args::parse();

    let dir = args.config_dir.unwrap_or_else( config_dir);
    let server_config: ServerConfig = load_config_or_default( &dir, "server")?;
    let flights_config: Arc<FlightsConfig> = Arc::new( load_config_or_default( &dir, "flights")?);
    let traffic_config: TrafficConfig = load_config_or_default( &dir, "traffic")?;

    //--- the flight pipeline
    let hub = Arc::new( BroadcastHub::new( flights_config.subscriber_capacity));
    let store = Arc::new( SnapshotStore::open( &flights_config.db_url).await?);
    let feed: Arc<dyn FlightFeed> = Arc::new( OpenSkyFeed::new( &flights_config)?);
    let mut scheduler = IngestScheduler::new( feed, hub.clone(), store.clone(), flights_config.clone());

    //--- the traffic overlay
    let ttl = traffic_config.ttl;
    let traffic_cache = Arc::new( TrafficCache::new( Arc::new( DirectionsTrafficSource::new( traffic_config)?)));

    let router = flight_service::router( FlightServiceState { hub, store: store.clone(), config: flights_config })
        .merge( traffic_service::router( TrafficServiceState { cache: traffic_cache, ttl }));

    if args.no_ingest {
        info!("ingest cycles disabled");
    } else {
        scheduler.start()?;
    }

    let server_task = spawn_server_task( &server_config, router);
    info!("noisemap server at {}", server_config.url());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("terminating"),
        res = server_task => warn!("server task ended: {res:?}")
    }

    scheduler.terminate();
    store.close().await;
    Ok(())
}
