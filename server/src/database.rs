//! # SQLite
//!
//! Single-table store for participants.
//!
//! ## Requirements
//!
//! - One row per phone number, enforced by the store itself
//! - Small dataset, a few thousand entries per event at most
//! - Range scans by arrival time for the admin list view
//!
//! ## Implementation
//!
//! - `phone` carries a UNIQUE index, `INSERT OR IGNORE` turns repeat texts
//!   into no-ops without a read-before-write
//! - `received_at` is stored as ISO-8601 text, lexicographic order matches
//!   chronological order so BETWEEN and ORDER BY work directly on it
//! - Winner marks are plain integer flags, flipped only by the draw and the
//!   reset, never by ingestion
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool, sqlite::SqlitePoolOptions};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS participants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        phone TEXT NOT NULL UNIQUE,
        code TEXT NOT NULL,
        received_at TEXT NOT NULL,
        is_winner INTEGER NOT NULL DEFAULT 0,
        channel_joined INTEGER NOT NULL DEFAULT 0
    );
";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub phone: String,
    pub code: String,
    pub received_at: DateTime<Utc>,
    pub is_winner: bool,
    pub channel_joined: bool,
}

pub async fn init_pool(database_url: &str) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
        .unwrap();

    sqlx::query(SCHEMA).execute(&pool).await.unwrap();

    pool
}

/// Insert-if-absent keyed by phone. Returns whether a new row was created;
/// a duplicate phone leaves the existing row untouched and returns false.
pub async fn insert_if_absent(
    pool: &SqlitePool,
    phone: &str,
    code: &str,
    received_at: DateTime<Utc>,
    channel_joined: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO participants (phone, code, received_at, is_winner, channel_joined)
         VALUES (?, ?, ?, 0, ?)",
    )
    .bind(phone)
    .bind(code)
    .bind(received_at)
    .bind(channel_joined)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All participants, newest first, optionally restricted to an arrival range.
pub async fn list(
    pool: &SqlitePool,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<Participant>, sqlx::Error> {
    match range {
        Some((start, end)) => {
            sqlx::query_as::<_, Participant>(
                "SELECT * FROM participants
                 WHERE received_at BETWEEN ? AND ?
                 ORDER BY received_at DESC",
            )
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Participant>(
                "SELECT * FROM participants ORDER BY received_at DESC",
            )
            .fetch_all(pool)
            .await
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // One connection, otherwise each pooled connection would see its own
    // empty in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(SCHEMA).execute(&pool).await.unwrap();

    pool
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_noop() {
        let pool = test_pool().await;

        let first = insert_if_absent(&pool, "09121111111", "9", at_hour(19), false)
            .await
            .unwrap();
        let second = insert_if_absent(&pool, "09121111111", "9", at_hour(20), true)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);

        let rows = list(&pool, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].received_at, at_hour(19));
        assert!(!rows[0].channel_joined);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let pool = test_pool().await;

        insert_if_absent(&pool, "09121111111", "9", at_hour(19), false)
            .await
            .unwrap();
        insert_if_absent(&pool, "09122222222", "9", at_hour(21), false)
            .await
            .unwrap();
        insert_if_absent(&pool, "09123333333", "9", at_hour(20), false)
            .await
            .unwrap();

        let rows = list(&pool, None).await.unwrap();
        let phones: Vec<&str> = rows.iter().map(|p| p.phone.as_str()).collect();

        assert_eq!(phones, ["09122222222", "09123333333", "09121111111"]);
    }

    #[tokio::test]
    async fn test_list_range_filters_by_arrival() {
        let pool = test_pool().await;

        insert_if_absent(&pool, "09121111111", "9", at_hour(10), false)
            .await
            .unwrap();
        insert_if_absent(&pool, "09122222222", "9", at_hour(19), false)
            .await
            .unwrap();
        insert_if_absent(&pool, "09123333333", "9", at_hour(23), false)
            .await
            .unwrap();

        let rows = list(&pool, Some((at_hour(18), at_hour(21)))).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phone, "09122222222");
    }
}
