use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{config::Config, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

/// Claim handed out at login. The role is resolved exactly once here, the UI
/// never re-derives it by comparing phone numbers.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub phone: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

/// Cosmetic demo login, not a security boundary. The OTP screens live
/// entirely in the frontend.
pub fn login(config: &Config, phone: &str) -> Result<Session, AppError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::EmptyPhone);
    }

    let role = if phone == config.admin_phone {
        Role::Admin
    } else {
        Role::Viewer
    };

    Ok(Session {
        phone: phone.to_string(),
        role,
        issued_at: Utc::now(),
    })
}
