// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Binds an `ExecutionContext` to a unit of work for its whole dynamic extent.
//!
//! The binding lives in a tokio task-local, so it survives every `.await`
//! inside the task that runs the unit of work. Tasks spawned from there do not
//! inherit task-locals on their own; use [`spawn`] or [`bind`] to carry the
//! active context across.

use crate::{config::RequestLocalConfig, context::ExecutionContext};
use futures::future::{Either, Future};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, debug_span, Instrument};

tokio::task_local! {
    static ACTIVE_CONTEXT: Arc<ExecutionContext>;
}

/// Creates execution contexts and runs units of work inside them.
///
/// Cheap to clone; an application builds one from its config and hands it to
/// whatever dispatches its units of work.
#[derive(Clone, Debug, Default)]
pub struct ContextManager {
    config: Arc<RequestLocalConfig>,
}

impl ContextManager {
    pub fn new(config: RequestLocalConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RequestLocalConfig {
        &self.config
    }

    fn create_context(&self) -> Arc<ExecutionContext> {
        let context = Arc::new(ExecutionContext::new(self.config.store_capacity));
        debug!(context_id = %context.id(), "Created request local context");
        context
    }

    /// Runs `unit_of_work` inside a fresh context and returns its output.
    ///
    /// Whatever the unit of work returns, errors included, is handed back
    /// untouched. Nested calls shadow the outer context until the inner unit
    /// of work completes.
    pub async fn run<F>(&self, unit_of_work: F) -> F::Output
    where
        F: Future,
    {
        let context = self.create_context();
        let span = debug_span!("request_local", context_id = %context.id());
        ACTIVE_CONTEXT
            .scope(context, unit_of_work)
            .instrument(span)
            .await
    }

    /// Synchronous counterpart of [`ContextManager::run`].
    pub fn run_sync<F, R>(&self, unit_of_work: F) -> R
    where
        F: FnOnce() -> R,
    {
        let context = self.create_context();
        let _entered = debug_span!("request_local", context_id = %context.id()).entered();
        ACTIVE_CONTEXT.sync_scope(context, unit_of_work)
    }
}

/// Returns the context bound to the calling code, if any.
pub fn active_context() -> Option<Arc<ExecutionContext>> {
    ACTIVE_CONTEXT.try_with(Arc::clone).ok()
}

/// Ties `future` to the currently active context, wherever it is later
/// polled. Without an active context the future is returned as is.
pub fn bind<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    match active_context() {
        Some(context) => Either::Left(ACTIVE_CONTEXT.scope(context, future)),
        None => Either::Right(future),
    }
}

/// Spawns `future` on the tokio runtime, carrying over the active context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(bind(future))
}
