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

use thiserror::Error;
use noisemap_common::net::NetError;

pub type Result<T> = std::result::Result<T,NoisemapFlightsError>;

/// the ways an upstream fetch can fail. All of them are recoverable - the next cycle just tries again
#[derive(Error,Debug)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(String),

    #[error("feed responded with status {0}")]
    Status(u16),

    #[error("malformed feed response: {0}")]
    Malformed(String),

    #[error("feed request timed out")]
    Timeout,
}

impl From<NetError> for FeedError {
    fn from (e: NetError)->Self {
        match e {
            NetError::HttpError(ref re) if re.is_timeout() => FeedError::Timeout,
            NetError::HttpError(re) => FeedError::Http( re.to_string()),
            NetError::StatusError(status) => FeedError::Status( status.as_u16()),
            NetError::ParseError(msg) => FeedError::Malformed(msg),
            NetError::OpFailed(msg) => FeedError::Http(msg),
        }
    }
}

/// persistence failures of the durable log
#[derive(Error,Debug)]
pub enum StoreError {
    #[error("database error {0}")]
    Sqlx( #[from] sqlx::Error),

    #[error("invalid emission point {0}")]
    InvalidPoint(String),

    #[error("invalid query {0}")]
    InvalidQuery(String),
}

#[derive(Error,Debug)]
pub enum NoisemapFlightsError {
    #[error("feed error {0}")]
    FeedError( #[from] FeedError),

    #[error("store error {0}")]
    StoreError( #[from] StoreError),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::NoisemapFlightsError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
