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

//! common utility functions for HTTP GET based data retrieval

use std::time::Duration;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::define_error;

define_error!{ pub NetError =
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    StatusError(StatusCode) : "unexpected response status {0}",
    ParseError(String) : "parse error: {0}",
    OpFailed(String) : "operation failed: {0}"
}

pub type Result<T> = std::result::Result<T, NetError>;

/// optional credentials for upstream services that support basic auth
#[derive(Debug,Clone)]
pub struct BasicAuth {
    pub user: String,
    pub password: Option<String>
}

impl BasicAuth {
    /// only create credentials if we have a user name
    pub fn from_opt (user: Option<String>, password: Option<String>)->Option<Self> {
        user.map( |user| BasicAuth { user, password })
    }
}

/// create a client that bounds every request by `timeout`. This is what all our upstream connectors use
pub fn build_client (timeout: Duration, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout( timeout)
        .user_agent( user_agent)
        .build()
        .map_err( |e| NetError::OpFailed( format!("failed to create http client: {e}")))
}

/// retrieve a JSON response from `url` and deserialize it into `T`
/// non-2xx responses are mapped to [`NetError::StatusError`], undeserializable bodies into [`NetError::ParseError`]
pub async fn get_json<T> (client: &Client, url: &str, query: &[(&str,String)], auth: Option<&BasicAuth>) -> Result<T>
    where T: DeserializeOwned
{
    let mut req = client.get( url).query( query);
    if let Some(auth) = auth {
        req = req.basic_auth( &auth.user, auth.password.as_ref());
    }

    let response = req.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err( NetError::StatusError(status))
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice::<T>( &bytes).map_err( |e| NetError::ParseError( e.to_string()))
}
