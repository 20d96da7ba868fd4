// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local HTTP control API.
//!
//! Handlers read published state only. Work they trigger (a sync, a connect
//! attempt) runs in the background, so every request answers immediately
//! and device trouble never becomes a 5xx.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, Level};

use punch_api::{
    paths, EstadoResponse, InfoResponse, LastSyncResponse, PingDeviceResponse, ShutdownResponse,
    TriggerResponse,
};

use crate::context::AgentContext;

type Ctx = State<Arc<AgentContext>>;

/// Builds the control API router for `ctx`.
///
/// `POST /shutdown` is only routed when the agent's mode allows it.
pub fn router(ctx: Arc<AgentContext>) -> Router {
    let mut router = Router::new()
        .route(paths::ESTADO, get(estado))
        .route(paths::INFO, get(info_handler))
        .route(paths::PING_DEVICE, get(ping_device))
        .route(paths::SINCRONIZACION, get(last_sync))
        .route(paths::SINCRONIZAR, post(sincronizar))
        .route(paths::CONECTAR, post(conectar));
    if ctx.mode.allows_remote_shutdown() {
        router = router.route(paths::SHUTDOWN, post(shutdown));
    }

    let trace = TraceLayer::new_for_http().on_response(
        DefaultOnResponse::new()
            .level(Level::DEBUG)
            .latency_unit(LatencyUnit::Millis),
    );

    router
        .with_state(ctx)
        .layer(trace)
        .layer(CorsLayer::permissive())
}

async fn estado(State(ctx): Ctx) -> Json<EstadoResponse> {
    Json(EstadoResponse::new(&ctx.version, ctx.mode, ctx.is_connected()))
}

async fn info_handler(State(ctx): Ctx) -> Json<InfoResponse> {
    Json(InfoResponse::new(
        &ctx.version,
        ctx.mode,
        ctx.supervisor.endpoint(),
        ctx.is_connected(),
    ))
}

async fn ping_device(State(ctx): Ctx) -> Json<PingDeviceResponse> {
    Json(PingDeviceResponse::new(
        ctx.is_connected(),
        ctx.is_configured(),
    ))
}

async fn last_sync(State(ctx): Ctx) -> Json<LastSyncResponse> {
    Json(ctx.pipeline.last_outcome())
}

async fn sincronizar(State(ctx): Ctx) -> impl IntoResponse {
    let body = if !ctx.is_configured() {
        TriggerResponse::declined("no hay dispositivo configurado")
    } else if ctx.pipeline.spawn_sync() {
        TriggerResponse::accepted("sincronizacion iniciada")
    } else {
        TriggerResponse::declined("sincronizacion en curso")
    };
    (StatusCode::ACCEPTED, Json(body))
}

async fn conectar(State(ctx): Ctx) -> impl IntoResponse {
    let body = if !ctx.is_configured() {
        TriggerResponse::declined("no hay dispositivo configurado")
    } else if ctx.is_connected() {
        TriggerResponse::declined("dispositivo ya conectado")
    } else {
        ctx.supervisor.request_connect();
        TriggerResponse::accepted("conexion solicitada")
    };
    (StatusCode::ACCEPTED, Json(body))
}

async fn shutdown(State(ctx): Ctx) -> Json<ShutdownResponse> {
    if ctx.request_shutdown() {
        info!("shutdown requested over http");
    }
    Json(ShutdownResponse {
        message: "Agente detenido".to_string(),
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
