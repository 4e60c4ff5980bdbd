//! SMS gateway polling.
//!
//! The real deployment would pull queued messages from a local GSM modem or a
//! provider API. Here the gateway sits behind a trait and the shipped
//! implementation replays a fixed batch, which is enough to exercise the
//! whole ingestion path end to end.
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::{channel::ChannelVerifier, config::Config, error::AppError, ingest};

/// One inbound message pulled from the gateway.
#[derive(Debug, Clone)]
pub struct InboundSms {
    pub from: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub trait SmsGateway: Send + Sync {
    /// Fetch whatever messages the gateway has queued since the last poll.
    fn fetch(&self) -> Vec<InboundSms>;
}

/// Replays the same batch of valid entries on every poll. Dedup in the store
/// makes repeated polls harmless.
pub struct MockGateway;

impl SmsGateway for MockGateway {
    fn fetch(&self) -> Vec<InboundSms> {
        (1..=8)
            .map(|digit: u32| InboundSms {
                from: format!("0912{}", digit.to_string().repeat(7)),
                message: "9".to_string(),
                timestamp: Utc::now(),
            })
            .collect()
    }
}

/// Drain the gateway through the entry gate. Returns how many participants
/// the poll actually added.
pub async fn run_sync(
    pool: &SqlitePool,
    config: &Config,
    channel: &dyn ChannelVerifier,
    gateway: &dyn SmsGateway,
) -> Result<usize, AppError> {
    let messages = gateway.fetch();
    let mut added = 0;

    for message in messages {
        let joined = channel.is_member(&message.from);

        match ingest::submit(
            pool,
            config,
            &message.from,
            &message.message,
            Some(message.timestamp),
            joined,
        )
        .await
        {
            Ok(submission) if submission.newly_registered => {
                #[cfg(feature = "verbose")]
                tracing::info!(phone = %submission.phone, "gateway sync added participant");

                added += 1;
            }
            Ok(_) => {}
            Err(AppError::InvalidCode | AppError::EmptyPhone) => {
                warn!(from = %message.from, "gateway message failed the entry gate, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(added)
}
