//! Authentication request handlers.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Query, State};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{LoginParams, RefreshRequest, TokenResponse};

/// Origin recorded in refresh credentials: the peer IP without its port.
fn origin(peer: SocketAddr) -> String {
    peer.ip().to_string()
}

/// `POST /auth/login?userId=`: issue a new token pair for a user.
pub async fn login_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<LoginParams>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state.service.login(params.user_id, &origin(peer)).await?;
    Ok(Json(pair.into()))
}

/// `POST /auth/refresh`: exchange a token pair for a new one.
pub async fn refresh_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let pair = state
        .service
        .refresh(&body.access_token, &body.refresh_token, &origin(peer))
        .await?;
    Ok(Json(pair.into()))
}
