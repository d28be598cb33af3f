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

use std::net::SocketAddr;
use axum::Router;
use serde::{Deserialize,Serialize};
use tokio::task::JoinHandle;
use tracing::{error,info};

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct ServerConfig {
    pub sock_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default()->Self {
        ServerConfig { sock_addr: SocketAddr::from(([127,0,0,1], 8080)) }
    }
}

impl ServerConfig {
    pub fn url(&self) -> String {
        format!("http://{}", self.sock_addr)
    }
}

/// spawn a task that serves `router` on the configured socket address.
/// Bind and serve errors terminate the task and are logged, the returned handle can be used to detect that
pub fn spawn_server_task (config: &ServerConfig, router: Router) -> JoinHandle<()> {
    let sock_addr = config.sock_addr;
    let router_svc = router.into_make_service_with_connect_info::<SocketAddr>();

    tokio::spawn( async move {
        match tokio::net::TcpListener::bind(sock_addr).await {
            Ok(listener) => {
                info!("serving http://{sock_addr}");
                if let Err(e) = axum::serve( listener, router_svc).await {
                    error!("server on {sock_addr} terminated: {e}");
                }
            }
            Err(e) => error!("failed to bind {sock_addr}: {e}")
        }
    })
}
