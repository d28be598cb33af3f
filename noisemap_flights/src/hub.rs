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

//! the registry of connected subscribers and the last known emission point batch
//!
//! subscribers are represented by bounded channels of pre-serialized messages. Publishing never waits on
//! a subscriber: if its channel is full the message is skipped for it, if it is closed the subscriber is
//! dropped from the registry

use std::{collections::HashMap, sync::{Arc,Mutex,MutexGuard,PoisonError}};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use noisemap_common::datetime::EpochMillis;
use crate::{EmissionPoint, errors::Result};

pub type SubscriberId = u64;

pub const WELCOME_TYPE: &str = "WELCOME";
pub const DATA_UPDATE_TYPE: &str = "NOISE_DATA_UPDATE";

#[derive(Serialize)]
#[serde(tag="type", rename_all="SCREAMING_SNAKE_CASE")]
enum HubMsg<'a> {
    #[serde(rename_all="camelCase")]
    Welcome { subscriber_id: SubscriberId, message: &'a str, timestamp: EpochMillis },

    #[serde(rename_all="camelCase")]
    NoiseDataUpdate { timestamp: EpochMillis, data: &'a [EmissionPoint] },
}

/// what a new subscriber gets back. Messages are complete JSON texts
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub rx: mpsc::Receiver<Arc<str>>,
}

struct LastKnown {
    points: Arc<Vec<EmissionPoint>>,
    msg: Arc<str>,
    timestamp: EpochMillis,
}

struct HubState {
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, mpsc::Sender<Arc<str>>>,
    last_known: Option<LastKnown>,
}

pub struct BroadcastHub {
    capacity: usize,
    state: Mutex<HubState>,
}

impl BroadcastHub {
    /// `capacity` is the number of messages we queue per subscriber
    pub fn new (capacity: usize)->Self {
        BroadcastHub {
            capacity: capacity.max(2), // we need room for welcome and sync message
            state: Mutex::new( HubState { next_id: 1, subscribers: HashMap::new(), last_known: None })
        }
    }

    // a panic while holding the lock cannot leave the state half updated, hence we don't propagate poisoning
    fn lock (&self)->MutexGuard<'_,HubState> {
        self.state.lock().unwrap_or_else( PoisonError::into_inner)
    }

    /// register a new subscriber and queue the welcome message, followed by the last published
    /// data message if there is one. Both are queued before any subsequent publish can get to this subscriber
    pub fn subscribe (&self)->Result<Subscription> {
        let (tx,rx) = mpsc::channel( self.capacity);
        let mut state = self.lock();

        let id = state.next_id;
        state.next_id += 1;

        let welcome = serde_json::to_string( &HubMsg::Welcome {
            subscriber_id: id,
            message: "connected to live noise updates",
            timestamp: EpochMillis::now()
        })?;
        let _ = tx.try_send( Arc::from( welcome)); // channel is new and has room

        if let Some(last_known) = &state.last_known {
            let _ = tx.try_send( last_known.msg.clone());
        }

        state.subscribers.insert( id, tx);
        debug!("subscriber {id} added, {} total", state.subscribers.len());

        Ok( Subscription { id, rx })
    }

    /// remove a subscriber. Returns true if it was still registered
    pub fn unsubscribe (&self, id: SubscriberId)->bool {
        let removed = self.lock().subscribers.remove( &id).is_some();
        if removed { debug!("subscriber {id} removed") }
        removed
    }

    /// replace the last known batch and send it to all current subscribers. Empty batches are ignored
    /// (they neither overwrite the last known state nor get sent). Returns the number of subscribers the
    /// message was delivered to
    ///
    /// sends do not block, hence they happen under the same lock as `subscribe`. A subscriber therefore
    /// gets each batch exactly once, either as its sync message or as an update
    pub fn publish (&self, points: Vec<EmissionPoint>)->Result<usize> {
        if points.is_empty() { return Ok(0) }

        let timestamp = EpochMillis::now();
        let msg: Arc<str> = Arc::from( serde_json::to_string( &HubMsg::NoiseDataUpdate { timestamp, data: &points })?);

        let mut state = self.lock();
        state.last_known = Some( LastKnown { points: Arc::new(points), msg: msg.clone(), timestamp });

        let mut n_delivered = 0;
        state.subscribers.retain( |id,tx| {
            match tx.try_send( msg.clone()) {
                Ok(()) => { n_delivered += 1; true }
                Err(TrySendError::Full(_)) => { debug!("subscriber {id} not ready, skipping update"); true }
                Err(TrySendError::Closed(_)) => { debug!("dropping closed subscriber {id}"); false }
            }
        });

        Ok(n_delivered)
    }

    pub fn subscriber_count (&self)->usize {
        self.lock().subscribers.len()
    }

    pub fn last_known (&self)->Option<Arc<Vec<EmissionPoint>>> {
        self.lock().last_known.as_ref().map( |lk| lk.points.clone())
    }

    pub fn last_update (&self)->Option<EpochMillis> {
        self.lock().last_known.as_ref().map( |lk| lk.timestamp)
    }
}
