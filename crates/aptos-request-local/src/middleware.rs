// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{config::RequestIdConfig, manager::ContextManager, ops};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

/// Runs the rest of the request pipeline inside a fresh request local
/// context. Install with `axum::middleware::from_fn_with_state`.
pub async fn request_local_middleware(
    State(manager): State<ContextManager>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = {
        let config = &manager.config().request_id;
        config.enabled.then(|| extract_request_id(config, &req))
    };

    manager
        .run(async move {
            if let Some((key, request_id)) = request_id {
                debug!(request_id = %request_id, "Seeding request id");
                ops::try_update([(key, request_id)]).await;
            }
            next.run(req).await
        })
        .await
}

fn extract_request_id(config: &RequestIdConfig, req: &Request) -> (String, String) {
    let request_id = req
        .headers()
        .get(config.header.as_str())
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    (config.key.clone(), request_id)
}
