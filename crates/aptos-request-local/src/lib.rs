// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Request-scoped key/value storage.
//!
//! [`ContextManager::run`] gives a unit of work (typically one inbound
//! request) its own [`ExecutionContext`]. Any code reached from that unit of
//! work, including code resumed after an `.await`, can read and mutate the
//! context's store through the free functions in this crate without the
//! context being passed around:
//!
//! ```no_run
//! # async fn example() -> aptos_request_local::Result<()> {
//! use aptos_request_local::{get, set, ContextManager};
//!
//! let manager = ContextManager::default();
//! let id = manager
//!     .run(async {
//!         set("id", "abc").await?;
//!         get("id").await
//!     })
//!     .await?;
//! assert_eq!(id, Some("abc".into()));
//! # Ok(())
//! # }
//! ```
//!
//! All operations on one context are serialized through that context's
//! [`SerializationLock`] in the order they first reach it, so concurrent
//! counter updates never lose increments.

mod config;
mod context;
mod error;
mod lock;
mod manager;
mod middleware;
mod ops;
mod store;

pub use config::{RequestIdConfig, RequestLocalConfig};
pub use context::{ContextId, ExecutionContext};
pub use error::{ConfigError, Error, Result};
pub use lock::SerializationLock;
pub use manager::{active_context, bind, spawn, ContextManager};
pub use middleware::request_local_middleware;
pub use ops::{copy, decr, decr_by, delete, get, incr, incr_by, set, try_update, update};
pub use store::{type_name, CounterOp, Store};
