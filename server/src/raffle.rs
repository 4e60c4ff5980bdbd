use rand::{Rng, seq::SliceRandom};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, warn};

use crate::{database::Participant, error::AppError};

pub struct DrawOutcome {
    pub winners: Vec<Participant>,
    pub used_fallback: bool,
}

/// Pool of draw candidates under the current policy.
///
/// Channel members who have not won are preferred. When they cannot cover the
/// requested count the whole pool is swapped for every unwon participant, all
/// or nothing, never a mix of the two.
pub async fn select_pool(
    tx: &mut Transaction<'_, Sqlite>,
    desired: usize,
) -> Result<(Vec<Participant>, bool), AppError> {
    let primary = sqlx::query_as::<_, Participant>(
        "SELECT * FROM participants WHERE is_winner = 0 AND channel_joined = 1",
    )
    .fetch_all(&mut **tx)
    .await?;

    if primary.len() >= desired {
        return Ok((primary, false));
    }

    let fallback =
        sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE is_winner = 0")
            .fetch_all(&mut **tx)
            .await?;

    if fallback.is_empty() {
        return Err(AppError::NoEligibleParticipants);
    }

    Ok((fallback, true))
}

/// Draw up to `desired` winners without replacement and mark them.
///
/// Pool selection and winner marking share one transaction, so concurrent
/// draws cannot hand the same participant to two callers and a failed mark
/// rolls the whole draw back instead of leaving a partial winner set.
pub async fn draw(
    pool: &SqlitePool,
    desired: usize,
    rng: &mut (impl Rng + Send),
) -> Result<DrawOutcome, AppError> {
    let mut tx = pool.begin().await?;

    let (mut candidates, used_fallback) = select_pool(&mut tx, desired).await?;
    if used_fallback {
        warn!(
            candidates = candidates.len(),
            desired, "not enough channel members, drawing from all unwon participants"
        );
    }

    candidates.shuffle(rng);
    candidates.truncate(desired);

    for winner in &candidates {
        let result = sqlx::query("UPDATE participants SET is_winner = 1 WHERE id = ? AND is_winner = 0")
            .bind(winner.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::PartialDrawFailure);
        }
    }

    tx.commit().await?;

    info!(winners = candidates.len(), used_fallback, "draw complete");

    let winners = candidates
        .into_iter()
        .map(|mut participant| {
            participant.is_winner = true;
            participant
        })
        .collect();

    Ok(DrawOutcome {
        winners,
        used_fallback,
    })
}

/// Clear every winner mark, returning the pool to its pre-draw state.
pub async fn reset(pool: &SqlitePool) -> Result<u64, AppError> {
    let result = sqlx::query("UPDATE participants SET is_winner = 0")
        .execute(pool)
        .await?;

    info!(cleared = result.rows_affected(), "winner marks cleared");

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use chrono::{TimeZone, Utc};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::database::{self, test_pool};

    async fn seed(pool: &SqlitePool, phones: &[(&str, bool)]) {
        let received_at = Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap();

        for &(phone, joined) in phones {
            database::insert_if_absent(pool, phone, "9", received_at, joined)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_fallback_when_channel_members_short() {
        let pool = test_pool().await;
        seed(
            &pool,
            &[
                ("A", true),
                ("B", true),
                ("C", true),
                ("D", false),
                ("E", false),
            ],
        )
        .await;

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = draw(&pool, 5, &mut rng).await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.winners.len(), 5);
        assert!(outcome.winners.iter().all(|w| w.is_winner));

        let marked = database::list(&pool, None)
            .await
            .unwrap()
            .iter()
            .filter(|p| p.is_winner)
            .count();
        assert_eq!(marked, 5);
    }

    #[tokio::test]
    async fn test_no_fallback_when_channel_members_suffice() {
        let pool = test_pool().await;
        seed(&pool, &[("A", true), ("B", true), ("C", true), ("D", false)]).await;

        let mut rng = StdRng::seed_from_u64(2);
        let outcome = draw(&pool, 2, &mut rng).await.unwrap();

        assert!(!outcome.used_fallback);
        assert_eq!(outcome.winners.len(), 2);
        assert!(outcome.winners.iter().all(|w| w.channel_joined));
    }

    #[tokio::test]
    async fn test_draw_without_replacement() {
        let pool = test_pool().await;
        seed(
            &pool,
            &[
                ("A", true),
                ("B", true),
                ("C", true),
                ("D", true),
                ("E", true),
            ],
        )
        .await;

        let mut rng = StdRng::seed_from_u64(3);

        let first = draw(&pool, 3, &mut rng).await.unwrap();
        let second = draw(&pool, 2, &mut rng).await.unwrap();

        let mut ids: HashSet<i64> = HashSet::new();
        for winner in first.winners.iter().chain(second.winners.iter()) {
            assert!(ids.insert(winner.id), "participant drawn twice");
        }
        assert_eq!(ids.len(), 5);

        // Everyone has won, nothing left to draw from.
        let exhausted = draw(&pool, 1, &mut rng).await;
        assert!(matches!(exhausted, Err(AppError::NoEligibleParticipants)));
    }

    #[tokio::test]
    async fn test_empty_store_draw_mutates_nothing() {
        let pool = test_pool().await;

        let mut rng = StdRng::seed_from_u64(4);
        let result = draw(&pool, 5, &mut rng).await;

        assert!(matches!(result, Err(AppError::NoEligibleParticipants)));
        assert!(database::list(&pool, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_round_trip() {
        let pool = test_pool().await;
        seed(&pool, &[("A", true), ("B", true), ("C", true)]).await;

        let mut rng = StdRng::seed_from_u64(5);
        draw(&pool, 3, &mut rng).await.unwrap();

        let cleared = reset(&pool).await.unwrap();
        assert_eq!(cleared, 3);
        assert!(
            database::list(&pool, None)
                .await
                .unwrap()
                .iter()
                .all(|p| !p.is_winner)
        );

        // Prior winners are fair game again after a reset.
        let outcome = draw(&pool, 3, &mut rng).await.unwrap();
        assert_eq!(outcome.winners.len(), 3);
    }

    #[tokio::test]
    async fn test_shuffle_is_roughly_uniform() {
        let pool = test_pool().await;
        seed(&pool, &[("A", true), ("B", true), ("C", true)]).await;

        let mut rng = StdRng::seed_from_u64(6);
        let mut wins: HashMap<i64, u32> = HashMap::new();

        for _ in 0..300 {
            let outcome = draw(&pool, 1, &mut rng).await.unwrap();
            *wins.entry(outcome.winners[0].id).or_default() += 1;
            reset(&pool).await.unwrap();
        }

        // Expect ~100 wins each. A comparator-style pseudo-shuffle skews far
        // outside these bounds.
        assert_eq!(wins.len(), 3);
        for count in wins.values() {
            assert!((60..=140).contains(count), "win count {count} out of range");
        }
    }
}
