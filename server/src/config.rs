use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub accepted_code: String,
    pub window_open_hour: u32,
    pub window_close_hour: u32,
    pub default_draw_count: usize,
    pub channel_name: String,
    pub admin_phone: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RAFFLE_PORT", "3000"),
            database_url: try_load("RAFFLE_DATABASE_URL", "sqlite://raffle.db?mode=rwc"),
            accepted_code: try_load("RAFFLE_CODE", "9"),
            window_open_hour: try_load("RAFFLE_WINDOW_OPEN", "19"),
            window_close_hour: try_load("RAFFLE_WINDOW_CLOSE", "21"),
            default_draw_count: try_load("RAFFLE_DRAW_COUNT", "5"),
            channel_name: try_load("RAFFLE_CHANNEL", "@my_raffle_channel"),
            admin_phone: try_load("RAFFLE_ADMIN_PHONE", "09120000000"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
