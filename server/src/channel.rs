use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

/// Snapshot served to the admin view. The core consumes this, it never
/// computes membership itself.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatus {
    pub connected: bool,
    pub channel: String,
    pub last_sync: DateTime<Utc>,
}

/// External channel-membership checker.
///
/// The ingestion path only ever reads the boolean this hands back, so a real
/// bot integration slots in behind the same trait.
pub trait ChannelVerifier: Send + Sync {
    /// Check (or refresh) channel membership for a phone number.
    fn is_member(&self, phone: &str) -> bool;

    fn status(&self) -> ChannelStatus;
}

/// Stand-in checker. Reports roughly 70% of phones as joined, which is what
/// the bot we are replacing observed in practice.
pub struct SimulatedChannel {
    channel: String,
}

impl SimulatedChannel {
    pub fn new(channel: String) -> Self {
        Self { channel }
    }
}

impl ChannelVerifier for SimulatedChannel {
    fn is_member(&self, _phone: &str) -> bool {
        rand::thread_rng().gen_bool(0.7)
    }

    fn status(&self) -> ChannelStatus {
        ChannelStatus {
            connected: true,
            channel: self.channel.clone(),
            last_sync: Utc::now(),
        }
    }
}
