// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the store and counter operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The operation was invoked outside of any `ContextManager::run` extent.
    #[error("RLS context not initialized")]
    NotInitialized,
    /// A counter operation found a non-numeric value under its key.
    #[error("Counter is not a number, was '{observed}'")]
    TypeMismatch { key: String, observed: &'static str },
    /// The counter result cannot be represented as a finite number.
    #[error("Counter {key} overflowed")]
    CounterOverflow { key: String },
}

/// Errors raised while loading or saving a `RequestLocalConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("Error (de)serializing {0}: {1}")]
    Yaml(String, #[source] serde_yaml::Error),
}
