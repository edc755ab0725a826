// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::Result,
    lock::SerializationLock,
    store::{CounterOp, Store},
};
use serde_json::{Number, Value};
use std::{
    collections::HashMap,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of an `ExecutionContext`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The isolated storage of one unit of work: a `Store` that is only ever
/// touched from inside its own `SerializationLock`.
///
/// Every operation below is one critical section, so it is atomic with
/// respect to every other operation on the same context. Contexts never share
/// a store or a lock.
#[derive(Debug)]
pub struct ExecutionContext {
    id: ContextId,
    store: SerializationLock<Store>,
}

impl ExecutionContext {
    pub fn new(store_capacity: usize) -> Self {
        Self {
            id: ContextId::next(),
            store: SerializationLock::new(Store::with_capacity(store_capacity)),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.store.run(|store| store.get(key).cloned()).await
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), value.into());
        self.store
            .run(move |store| {
                store.set(key, value);
            })
            .await
    }

    pub async fn delete(&self, key: &str) {
        self.store
            .run(|store| {
                store.delete(key);
            })
            .await
    }

    /// Merges every entry of `partial` into the store, leaving other keys as
    /// they are.
    pub async fn update<I, K, V>(&self, partial: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let partial: Vec<(String, Value)> = partial
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.store.run(move |store| store.merge(partial)).await
    }

    /// Returns a snapshot of the store that shares nothing with it.
    pub async fn copy(&self) -> HashMap<String, Value> {
        self.store.run(|store| store.snapshot()).await
    }

    pub async fn incr_by(&self, key: &str, count: impl Into<Number>) -> Result<Number> {
        self.update_counter(key, count.into(), CounterOp::Incr)
            .await
    }

    pub async fn decr_by(&self, key: &str, count: impl Into<Number>) -> Result<Number> {
        self.update_counter(key, count.into(), CounterOp::Decr)
            .await
    }

    async fn update_counter(&self, key: &str, count: Number, op: CounterOp) -> Result<Number> {
        self.store
            .run(|store| store.update_counter(key, &count, op))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_none, assert_ok_eq};
    use futures::future::join_all;
    use serde_json::json;

    #[test]
    fn test_ids_are_unique() {
        let first = ExecutionContext::new(0);
        let second = ExecutionContext::new(0);
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_operations() {
        let context = ExecutionContext::new(4);
        context.set("foo", "bar").await;
        context.update([("baz", json!("foo")), ("n", json!(3))]).await;
        assert_eq!(context.get("foo").await, Some(json!("bar")));

        context.delete("foo").await;
        assert_none!(context.get("foo").await);
        assert_ok_eq!(context.incr_by("n", 2).await, Number::from(5));
        assert_ok_eq!(context.decr_by("n", 10).await, Number::from(-5));

        let snapshot = context.copy().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["baz"], json!("foo"));
    }

    #[tokio::test]
    async fn test_contexts_are_isolated() {
        let first = ExecutionContext::new(0);
        let second = ExecutionContext::new(0);
        first.set("x", 1).await;

        assert_none!(second.get("x").await);
        assert!(second.copy().await.is_empty());
    }

    #[tokio::test]
    async fn test_operations_apply_in_issue_order() {
        let context = ExecutionContext::new(0);
        let writes = (0..=200).map(|i| context.set("ctr", i));
        let (_, last) = futures::join!(join_all(writes), context.get("ctr"));
        assert_eq!(last, Some(json!(200)));
    }
}
