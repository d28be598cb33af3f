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

//! the periodic driver of the flight pipeline
//!
//! two independent tasks: the flight cycle (fetch, estimate, publish, persist) and the retention cycle
//! (prune). Each tick is awaited before the next one can fire so cycles never overlap with themselves, and
//! all failures are logged and contained within the cycle they happened in

use std::{sync::Arc, time::Duration};
use tokio::{task::AbortHandle, time::{self, MissedTickBehavior}};
use tracing::{info,warn,error};

use noisemap_common::datetime::EpochMillis;
use crate::{
    FlightsConfig,
    errors::{FeedError,Result,op_failed},
    feed::FlightFeed,
    hub::BroadcastHub,
    noise::emission_points,
    store::SnapshotStore,
};

/// what happened in a single flight cycle
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FlightCycleOutcome {
    /// points were broadcast. `persisted` is false if the durable append failed
    Published { n_states: usize, n_points: usize, persisted: bool },
    /// the feed responded but there was no airborne aircraft in the box
    NoData { n_states: usize },
    /// fetch failed or timed out
    FeedFailed,
}

/// the objects a cycle operates on. Cheap to clone into the periodic tasks
#[derive(Clone)]
struct Pipeline {
    feed: Arc<dyn FlightFeed>,
    hub: Arc<BroadcastHub>,
    store: Arc<SnapshotStore>,
    config: Arc<FlightsConfig>,
}

impl Pipeline {
    async fn flight_cycle (&self)->FlightCycleOutcome {
        let cycle_time = EpochMillis::now();
        let fetched = match time::timeout( self.config.request_timeout, self.feed.fetch( &self.config.bbox)).await {
            Ok(res) => res,
            Err(_) => Err( FeedError::Timeout)
        };

        let states = match fetched {
            Ok(states) => states,
            Err(e) => {
                warn!("flight cycle: feed unavailable: {e}");
                return FlightCycleOutcome::FeedFailed
            }
        };

        let n_states = states.len();
        let points = emission_points( &states, &self.config.region, cycle_time);
        let n_points = points.len();
        if points.is_empty() {
            info!("flight cycle: {n_states} aircraft, no airborne positions");
            return FlightCycleOutcome::NoData { n_states }
        }

        // the broadcast goes out first, durability is best effort
        match self.hub.publish( points.clone()) {
            Ok(n_delivered) => info!("flight cycle: {n_states} aircraft, {n_points} points sent to {n_delivered} subscribers"),
            Err(e) => error!("flight cycle: failed to publish points: {e}")
        }

        let persisted = match self.store.append( &points).await {
            Ok(_) => true,
            Err(e) => {
                error!("flight cycle: failed to persist {n_points} points: {e}");
                false
            }
        };

        FlightCycleOutcome::Published { n_states, n_points, persisted }
    }

    async fn retention_cycle (&self)->Option<u64> {
        match self.store.prune( self.config.retention_max_age).await {
            Ok(n) => {
                info!("retention cycle: pruned {n} points");
                Some(n)
            }
            Err(e) => {
                error!("retention cycle: prune failed: {e}");
                None
            }
        }
    }
}

pub struct IngestScheduler {
    pipeline: Pipeline,
    tasks: Vec<AbortHandle>,
}

impl IngestScheduler {
    pub fn new (feed: Arc<dyn FlightFeed>, hub: Arc<BroadcastHub>, store: Arc<SnapshotStore>, config: Arc<FlightsConfig>)->Self {
        IngestScheduler { pipeline: Pipeline { feed, hub, store, config }, tasks: Vec::new() }
    }

    /// run a single flight cycle. Never fails, the outcome tells what happened
    pub async fn run_flight_cycle (&self)->FlightCycleOutcome {
        self.pipeline.flight_cycle().await
    }

    /// run a single retention cycle, returning the number of pruned points if it succeeded
    pub async fn run_retention_cycle (&self)->Option<u64> {
        self.pipeline.retention_cycle().await
    }

    pub fn is_running (&self)->bool { !self.tasks.is_empty() }

    /// spawn the periodic flight and retention tasks. Both run their first cycle immediately
    pub fn start (&mut self)->Result<()> {
        if self.is_running() {
            return Err( op_failed!("ingest scheduler already running"))
        }

        let config = &self.pipeline.config;
        info!("starting ingest scheduler for {} (flight interval {:?}, retention interval {:?})",
              config.region, config.flight_interval, config.retention_interval);

        let pipeline = self.pipeline.clone();
        let flight_task = spawn_periodic( config.flight_interval, move || {
            let pipeline = pipeline.clone();
            async move { pipeline.flight_cycle().await; }
        });

        let pipeline = self.pipeline.clone();
        let retention_task = spawn_periodic( config.retention_interval, move || {
            let pipeline = pipeline.clone();
            async move { pipeline.retention_cycle().await; }
        });

        self.tasks = vec![ flight_task, retention_task ];
        Ok(())
    }

    /// abort the periodic tasks. Cycles that are in flight are abandoned
    pub fn terminate (&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for IngestScheduler {
    fn drop (&mut self) {
        self.terminate();
    }
}

fn spawn_periodic<F,Fut> (interval: Duration, mut cycle: F)->AbortHandle
    where F: FnMut()->Fut + Send + 'static, Fut: Future<Output=()> + Send + 'static
{
    let period = interval.max( Duration::from_millis(1)); // tokio panics on zero periods
    let jh = tokio::spawn( async move {
        let mut ticker = time::interval( period);
        ticker.set_missed_tick_behavior( MissedTickBehavior::Delay);
        loop {
            ticker.tick().await; // first tick completes immediately
            cycle().await;
        }
    });
    jh.abort_handle()
}
