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

pub type Result<T> = std::result::Result<T,TrafficError>;

#[derive(Error,Debug)]
pub enum TrafficError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("all {0} traffic routes failed")]
    AllRoutesFailed(usize),

    #[error("traffic request failed: {0}")]
    Http(String),

    #[error("traffic source responded with status {0}")]
    Status(u16),

    #[error("malformed traffic response: {0}")]
    Malformed(String),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl From<NetError> for TrafficError {
    fn from (e: NetError)->Self {
        match e {
            NetError::HttpError(re) => TrafficError::Http( re.to_string()),
            NetError::StatusError(status) => TrafficError::Status( status.as_u16()),
            NetError::ParseError(msg) => TrafficError::Malformed(msg),
            NetError::OpFailed(msg) => TrafficError::OpFailedError(msg),
        }
    }
}

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::TrafficError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
