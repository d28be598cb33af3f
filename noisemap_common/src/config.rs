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

//! locating and loading the RON config files of the application
//!
//! config files live in a single directory, which by default is either set by the `NOISEMAP_CONFIG_DIR`
//! environment variable or `./configs`. Files are looked up by their basename, e.g. `load_config(dir,"flights")`
//! reads `<dir>/flights.ron`

use std::{fs, path::{Path,PathBuf}};
use serde::de::DeserializeOwned;
use tracing::{info,warn};

use crate::define_error;

pub const CONFIG_DIR_ENV: &str = "NOISEMAP_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = "configs";

define_error!{ pub ConfigError =
    IOError(#[from] std::io::Error) : "config IO error: {0}",
    RonError(#[from] ron::error::SpannedError) : "config RON error: {0}",
    NotFound(String) : "config file not found: {0}"
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub fn config_dir ()->PathBuf {
    match std::env::var( CONFIG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from( dir),
        _ => PathBuf::from( DEFAULT_CONFIG_DIR)
    }
}

pub fn config_path (dir: &Path, name: &str)->PathBuf {
    dir.join( format!("{name}.ron"))
}

/// load the config from an explicit path
pub fn load_config_path<C,P> (path: P) -> Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( ConfigError::NotFound( path.display().to_string()))
    }
    let data = fs::read_to_string( path)?;
    Ok( ron::from_str( &data)? )
}

/// load the config with given basename from the config dir
pub fn load_config<C> (dir: &Path, name: &str) -> Result<C> where C: DeserializeOwned {
    let path = config_path( dir, name);
    let config = load_config_path( &path)?;
    info!("loaded config {}", path.display());
    Ok(config)
}

/// load a config file if it exists, fall back to the `Default` of the config type if it does not.
/// Malformed files are still reported as errors since silently replacing them would hide user mistakes
pub fn load_config_or_default<C> (dir: &Path, name: &str) -> Result<C> where C: DeserializeOwned + Default {
    match load_config( dir, name) {
        Err(ConfigError::NotFound(path)) => {
            warn!("no config file {path}, using defaults");
            Ok( C::default())
        }
        other => other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize,Default,Debug,PartialEq)]
    #[serde(default)]
    struct TestConfig {
        name: String,
        n: u32
    }

    #[test]
    fn test_load_path() {
        let dir = std::env::temp_dir().join( format!("noisemap_config_test_{}", std::process::id()));
        fs::create_dir_all( &dir).unwrap();
        let path = dir.join("test.ron");
        fs::write( &path, r#"(name: "x")"#).unwrap();

        let c: TestConfig = load_config_path( &path).unwrap();
        assert_eq!( c, TestConfig { name: "x".into(), n: 0 });

        let missing: Result<TestConfig> = load_config_path( dir.join("missing.ron"));
        assert!( matches!( missing, Err(ConfigError::NotFound(_))));
        let dflt: TestConfig = load_config_or_default( &dir, "missing").unwrap();
        assert_eq!( dflt, TestConfig::default());
        let c: TestConfig = load_config( &dir, "test").unwrap();
        assert_eq!( c.name, "x");

        fs::write( &path, r#"(name: "#).unwrap();
        let bad: Result<TestConfig> = load_config_path( &path);
        assert!( matches!( bad, Err(ConfigError::RonError(_))));

        fs::remove_dir_all( &dir).ok();
    }
}
