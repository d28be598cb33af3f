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

use chrono::{DateTime, Utc};
use serde::{Serialize,Deserialize,Serializer,Deserializer};
use std::time::Duration;
use std::fmt;
use parse_duration::parse;

/// milliseconds since the unix epoch. This is what we store and what we send to clients
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub fn new(millis:i64)->Self { EpochMillis(millis) }

    /// `None` if the result is not a representable point in time
    pub fn from_secs(secs: i64)->Option<Self> {
        secs.checked_mul(1000)
            .filter( |ms| DateTime::<Utc>::from_timestamp_millis(*ms).is_some())
            .map( EpochMillis)
    }

    pub fn millis(&self)->i64 { self.0 }

    /// the point in time that lies `dur` before us (saturating)
    pub fn minus (&self, dur: Duration)->Self {
        EpochMillis( self.0.saturating_sub( duration_millis(dur)))
    }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt),
            None => write!(f, "<invalid:{}>", self.0)
        }
    }
}

#[inline]
fn duration_millis (dur: Duration)->i64 {
    i64::try_from( dur.as_millis()).unwrap_or(i64::MAX)
}

// as of Rust 1.87 the min,hour,day Duration ctors are experimental
// for simple use cases that do not require to handle leap seconds we therefore provide our own wrappers
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }
#[inline] pub fn days (n: u64)->Duration { Duration::from_secs(n * 86400) }

/// parse human readable durations such as "30s", "6h" or "7d"
pub fn parse_human_duration (s: &str)->Result<Duration,String> {
    parse( s.trim()).map_err( |e| format!("invalid duration '{s}': {e:?}"))
}

//--- support for serde

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse_human_duration( string.as_str()).map_err( serde::de::Error::custom)
    })
}

pub fn ser_duration_as_fractional_secs<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_f64( dur.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Interval {
        #[serde(deserialize_with="deserialize_duration")]
        dur: Duration
    }

    #[test]
    fn test_duration_strings() {
        let iv: Interval = ron::from_str(r#"(dur: "6h")"#).unwrap();
        assert_eq!( iv.dur, hours(6));

        let iv: Interval = ron::from_str(r#"(dur: "7d")"#).unwrap();
        assert_eq!( iv.dur, days(7));

        assert!( ron::from_str::<Interval>(r#"(dur: "soon")"#).is_err());
        assert_eq!( parse_human_duration(" 30s "), Ok(secs(30)));
    }

    #[test]
    fn test_epoch_arithmetic() {
        let t = EpochMillis::new(10_000);
        assert_eq!( t.minus( secs(4)).millis(), 6_000);
        assert_eq!( t.minus( millis(20_000)).millis(), -10_000);
        assert_eq!( EpochMillis::new(i64::MIN + 1).minus( secs(1)).millis(), i64::MIN);
    }

    #[test]
    fn test_from_secs() {
        assert_eq!( EpochMillis::from_secs( 1_700_000_100), Some( EpochMillis::new( 1_700_000_100_000)));
        assert_eq!( EpochMillis::from_secs( 9_300_000_000_000_000), None); // overflows
        assert_eq!( EpochMillis::from_secs( 9_000_000_000_000), None);     // beyond any calendar date
        assert_eq!( EpochMillis::from_secs( -1), Some( EpochMillis::new( -1000)));
    }
}
