use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    channel::ChannelStatus,
    database::{self, Participant},
    error::AppError,
    gateway, ingest, raffle,
    session::{self, Session},
    state::State as AppState,
};

#[derive(Deserialize)]
pub struct SmsEvent {
    pub from: String,
    pub message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct DrawRequest {
    pub count: Option<usize>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
}

pub async fn sms_webhook_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<SmsEvent>,
) -> Result<Json<Value>, AppError> {
    let joined = state.channel.is_member(&event.from);

    let submission = ingest::submit(
        &state.pool,
        &state.config,
        &event.from,
        event.message.as_deref().unwrap_or_default(),
        event.timestamp,
        joined,
    )
    .await?;

    Ok(Json(json!({
        "status": "success",
        "registered": submission.newly_registered,
    })))
}

pub async fn sms_sync_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let added = gateway::run_sync(
        &state.pool,
        &state.config,
        state.channel.as_ref(),
        state.gateway.as_ref(),
    )
    .await?;

    Ok(Json(json!({ "status": "success", "added": added })))
}

pub async fn channel_status_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ChannelStatus> {
    Json(state.channel.status())
}

pub async fn participants_handler(
    State(state): State<Arc<AppState>>,
    Query(range): Query<TimeRange>,
) -> Result<Json<Vec<Participant>>, AppError> {
    let window = match (range.start_time, range.end_time) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };

    Ok(Json(database::list(&state.pool, window).await?))
}

pub async fn draw_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<DrawRequest>>,
) -> Result<Json<Vec<Participant>>, AppError> {
    let desired = body
        .and_then(|Json(request)| request.count)
        .unwrap_or(state.config.default_draw_count);

    let mut rng = StdRng::from_entropy();
    let outcome = raffle::draw(&state.pool, desired, &mut rng).await?;

    Ok(Json(outcome.winners))
}

pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    raffle::reset(&state.pool).await?;

    Ok(Json(json!({ "status": "success" })))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(session::login(&state.config, &request.phone)?))
}
