/*
 * Responsibility
 * - Shared, read-only context handed to middleware and handlers (AppState)
 * - Clone is cheap (Arc / pooled client inside)
 */
use std::sync::Arc;

use auth_token::TokenCodec;

use crate::services::proxy::{RouteTable, Upstream};

#[derive(Clone, Debug)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub routes: Arc<RouteTable>,
    pub upstream: Upstream,
}

impl AppState {
    pub fn new(codec: Arc<TokenCodec>, routes: Arc<RouteTable>, upstream: Upstream) -> Self {
        Self {
            codec,
            routes,
            upstream,
        }
    }
}
