// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestLocalConfig {
    /// Number of entries reserved up front in every new context's store
    pub store_capacity: usize,
    pub request_id: RequestIdConfig,
}

impl Default for RequestLocalConfig {
    fn default() -> RequestLocalConfig {
        RequestLocalConfig {
            store_capacity: 16,
            request_id: RequestIdConfig::default(),
        }
    }
}

/// Controls how the HTTP middleware seeds a request identifier into each new
/// context.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestIdConfig {
    pub enabled: bool,
    /// Inbound header carrying the caller's request id. A UUID v4 is used
    /// when the header is missing.
    pub header: String,
    /// Store key the request id is written to
    pub key: String,
}

impl Default for RequestIdConfig {
    fn default() -> RequestIdConfig {
        RequestIdConfig {
            enabled: true,
            header: "x-request-id".to_string(),
            key: "requestid".to_string(),
        }
    }
}

impl RequestLocalConfig {
    /// Load the config from disk at the given path
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_string = path.as_ref().display().to_string();
        let contents =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IO(path_string.clone(), e))?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml(path_string, e))
    }

    /// Save the config to disk at the given output path
    pub fn save_config<P: AsRef<Path>>(&self, output_file: P) -> Result<(), ConfigError> {
        let path_string = output_file.as_ref().display().to_string();
        let serialized_config =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Yaml(path_string.clone(), e))?;
        fs::write(output_file.as_ref(), serialized_config)
            .map_err(|e| ConfigError::IO(path_string, e))
    }

    /// Parse the config from the serialized string
    pub fn parse_serialized_config(serialized_config: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(serialized_config)
            .map_err(|e| ConfigError::Yaml("config".to_string(), e))
    }
}
