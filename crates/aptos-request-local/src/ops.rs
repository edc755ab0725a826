// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Store and counter operations against the active context.
//!
//! Each call resolves the active context when it is made, not when the
//! returned future is first polled, so the future keeps targeting that
//! context even if another task drives it. Outside of any context the future
//! resolves to `Error::NotInitialized` without queuing. The operation itself
//! runs as one critical section under the context's lock.

use crate::{
    context::ExecutionContext,
    error::{Error, Result},
    manager::active_context,
};
use futures::future::Future;
use serde_json::{Number, Value};
use std::{collections::HashMap, sync::Arc};
use tracing::trace;

fn current() -> Result<Arc<ExecutionContext>> {
    active_context().ok_or(Error::NotInitialized)
}

fn collect_partial<I, K, V>(partial: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    partial
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Returns the value stored under `key`, or `None` if absent.
pub fn get(key: impl Into<String>) -> impl Future<Output = Result<Option<Value>>> {
    let key = key.into();
    let context = current();
    async move { Ok::<_, Error>(context?.get(&key).await) }
}

/// Stores `value` under `key`, replacing any previous value.
pub fn set(key: impl Into<String>, value: impl Into<Value>) -> impl Future<Output = Result<()>> {
    let (key, value) = (key.into(), value.into());
    let context = current();
    async move {
        context?.set(key, value).await;
        Ok::<_, Error>(())
    }
}

/// Removes `key`. Removing an absent key is not an error.
pub fn delete(key: impl Into<String>) -> impl Future<Output = Result<()>> {
    let key = key.into();
    let context = current();
    async move {
        context?.delete(&key).await;
        Ok::<_, Error>(())
    }
}

/// Merges every entry of `partial` into the store.
pub fn update<I, K, V>(partial: I) -> impl Future<Output = Result<()>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let partial = collect_partial(partial);
    let context = current();
    async move {
        context?.update(partial).await;
        Ok::<_, Error>(())
    }
}

/// Like [`update`], but silently does nothing outside of a context.
///
/// Meant for code paths that may or may not run within a request.
pub fn try_update<I, K, V>(partial: I) -> impl Future<Output = ()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let partial = collect_partial(partial);
    let context = active_context();
    async move {
        match context {
            Some(context) => context.update(partial).await,
            None => trace!("No request local context, skipping update"),
        }
    }
}

/// Returns an independent snapshot of every stored entry.
pub fn copy() -> impl Future<Output = Result<HashMap<String, Value>>> {
    let context = current();
    async move { Ok::<_, Error>(context?.copy().await) }
}

/// Atomically increments the counter under `key` by one.
pub fn incr(key: impl Into<String>) -> impl Future<Output = Result<Number>> {
    incr_by(key, 1)
}

/// Atomically increments the counter under `key` by `count`, treating an
/// absent key as zero.
pub fn incr_by(
    key: impl Into<String>,
    count: impl Into<Number>,
) -> impl Future<Output = Result<Number>> {
    let (key, count) = (key.into(), count.into());
    let context = current();
    async move { context?.incr_by(&key, count).await }
}

/// Atomically decrements the counter under `key` by one.
pub fn decr(key: impl Into<String>) -> impl Future<Output = Result<Number>> {
    decr_by(key, 1)
}

/// Atomically decrements the counter under `key` by `count`, treating an
/// absent key as zero.
pub fn decr_by(
    key: impl Into<String>,
    count: impl Into<Number>,
) -> impl Future<Output = Result<Number>> {
    let (key, count) = (key.into(), count.into());
    let context = current();
    async move { context?.decr_by(&key, count).await }
}
