use chrono::{DateTime, Timelike, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{config::Config, database, error::AppError};

/// Outcome of one accepted submission. A duplicate phone is still a success,
/// it just did not create a row.
pub struct Submission {
    pub phone: String,
    pub newly_registered: bool,
    pub received_at: DateTime<Utc>,
}

/// The entry gate. Everything that writes a participant row goes through
/// here, whether it came from the webhook or the gateway sync.
pub async fn submit(
    pool: &SqlitePool,
    config: &Config,
    origin: &str,
    payload: &str,
    arrival: Option<DateTime<Utc>>,
    channel_joined: bool,
) -> Result<Submission, AppError> {
    let phone = origin.trim();
    if phone.is_empty() {
        return Err(AppError::EmptyPhone);
    }

    if payload != config.accepted_code {
        info!(%phone, %payload, "rejected entry with unrecognized code");
        return Err(AppError::InvalidCode);
    }

    let received_at = arrival.unwrap_or_else(Utc::now);

    // The window is advisory. Out-of-hours entries are recorded and logged,
    // never rejected.
    let hour = received_at.hour();
    if hour < config.window_open_hour || hour >= config.window_close_hour {
        warn!(%phone, hour, "entry outside the configured window, accepting anyway");
    }

    let newly_registered =
        database::insert_if_absent(pool, phone, payload, received_at, channel_joined).await?;

    if newly_registered {
        info!(%phone, channel_joined, "registered new participant");
    } else {
        info!(%phone, "duplicate entry, keeping the original registration");
    }

    Ok(Submission {
        phone: phone.to_string(),
        newly_registered,
        received_at,
    })
}
