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

//! the time-boxed cache of the last traffic sample batch
//!
//! batches are replaced as a whole and only after a successful refresh. The slot lock is held during
//! refreshes so that concurrent stale queries trigger a single upstream refresh

use std::{sync::Arc, time::Duration};
use serde::Serialize;
use tokio::{sync::Mutex, time::Instant};
use tracing::{info,warn};

use noisemap_common::datetime::EpochMillis;
use crate::{TrafficSample, TrafficSource, errors::Result};

/// where a returned batch came from
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Freshness {
    Fresh,
    Cached { age: Duration },
}

impl Freshness {
    pub fn is_cached (&self)->bool { matches!( self, Freshness::Cached{..}) }

    pub fn age (&self)->Duration {
        match self {
            Freshness::Fresh => Duration::ZERO,
            Freshness::Cached { age } => *age
        }
    }
}

#[derive(Debug,Clone,Serialize)]
#[serde(rename_all="camelCase")]
pub struct TrafficBatch {
    pub fetched_at: EpochMillis,
    pub samples: Arc<Vec<TrafficSample>>,
    #[serde(skip)]
    pub freshness: Freshness,
}

struct CacheSlot {
    samples: Arc<Vec<TrafficSample>>,
    fetched_at: EpochMillis,
    refreshed: Instant,
}

pub struct TrafficCache {
    source: Arc<dyn TrafficSource>,
    slot: Mutex<Option<CacheSlot>>,
}

impl TrafficCache {
    pub fn new (source: Arc<dyn TrafficSource>)->Self {
        TrafficCache { source, slot: Mutex::new( None) }
    }

    /// the cached batch if it is younger than `ttl`, a freshly retrieved one otherwise
    pub async fn get (&self, ttl: Duration)->Result<TrafficBatch> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            let age = cached.refreshed.elapsed();
            if age < ttl {
                return Ok( TrafficBatch {
                    fetched_at: cached.fetched_at,
                    samples: cached.samples.clone(),
                    freshness: Freshness::Cached { age }
                })
            }
        }

        self.refresh( &mut slot).await
    }

    /// retrieve a new batch regardless of the age of the cached one
    pub async fn force_refresh (&self)->Result<TrafficBatch> {
        let mut slot = self.slot.lock().await;
        self.refresh( &mut slot).await
    }

    // on failure the slot keeps whatever batch it had
    async fn refresh (&self, slot: &mut Option<CacheSlot>)->Result<TrafficBatch> {
        match self.source.fetch_samples().await {
            Ok(samples) => {
                info!("refreshed traffic cache with {} samples", samples.len());
                let samples = Arc::new( samples);
                let fetched_at = EpochMillis::now();
                *slot = Some( CacheSlot { samples: samples.clone(), fetched_at, refreshed: Instant::now() });
                Ok( TrafficBatch { fetched_at, samples, freshness: Freshness::Fresh })
            }
            Err(e) => {
                warn!("traffic refresh failed: {e}");
                Err(e)
            }
        }
    }
}
