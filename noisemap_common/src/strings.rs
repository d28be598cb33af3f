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

use std::borrow::Cow;
use regex::{Captures,Regex};
use lazy_static::lazy_static;

lazy_static! {
    static ref ENV_VAR_RE: Regex = Regex::new( r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// replace all `${VAR}` references in `s` with the value of the respective environment variable.
/// Undefined variables expand into empty strings, which lets callers treat them as missing values
pub fn env_expand (s: &str)->Cow<'_,str> {
    ENV_VAR_RE.replace_all( s, |caps: &Captures| {
        std::env::var( &caps[1]).unwrap_or_default()
    })
}

/// expand and turn blank results into `None`
pub fn env_expand_non_empty (s: &str)->Option<String> {
    let v = env_expand(s);
    let v = v.trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_expand() {
        // PATH is set in every test environment we run in
        let path = std::env::var("PATH").unwrap();
        assert_eq!( env_expand("${PATH}").as_ref(), path.as_str());
        assert_eq!( env_expand("no vars here").as_ref(), "no vars here");
        assert_eq!( env_expand("${NOISEMAP_SURELY_UNDEFINED_VAR}").as_ref(), "");
        assert!( env_expand_non_empty("${NOISEMAP_SURELY_UNDEFINED_VAR}").is_none());
    }
}
