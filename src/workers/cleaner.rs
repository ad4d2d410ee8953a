use std::thread;
use std::time::Duration;

use diesel::prelude::*;

use crate::config::CleanerConfig;
use crate::data::repositories::CardRepository;
use crate::db::DbPool;
use crate::workers::scheduler::PeriodicJob;

/// Deletes orphaned cards batch by batch until a batch comes back empty.
pub fn sweep_orphans(
    conn: &mut SqliteConnection,
    batch_size: i64,
    pause: Duration,
) -> QueryResult<usize> {
    let mut total = 0;
    loop {
        let deleted = CardRepository::delete_orphans(conn, batch_size)?;
        if deleted == 0 {
            return Ok(total);
        }
        total += deleted;
        log::debug!("Deleted {} orphaned cards", deleted);

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }
}

/// Periodic safety net for cards that lost their last membership.
pub struct OrphanCleaner {
    pool: DbPool,
    batch_size: i64,
    pause: Duration,
}

impl OrphanCleaner {
    pub fn new(pool: DbPool, config: &CleanerConfig) -> Self {
        Self {
            pool,
            batch_size: config.batch_size,
            pause: config.pause,
        }
    }
}

impl PeriodicJob for OrphanCleaner {
    fn name(&self) -> &'static str {
        "orphan-cleaner"
    }

    fn run_once(&self) -> anyhow::Result<usize> {
        let mut conn = self.pool.get()?;
        Ok(sweep_orphans(&mut conn, self.batch_size, self.pause)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::NewCard;
    use crate::data::repositories::WordSetRepository;
    use crate::db::test_connection;
    use crate::features::testing::{default_word_set, seed_user};

    fn card(conn: &mut SqliteConnection, word: &str) -> i32 {
        CardRepository::create(
            conn,
            &NewCard {
                original_word: word,
                translation: "",
                original_context: None,
                translation_context: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn sweeps_all_orphans_across_batches() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        let set = default_word_set(&mut conn, user.id);

        let kept = card(&mut conn, "kept");
        WordSetRepository::link_cards(&mut conn, set.id, &[kept]).unwrap();
        let orphans: Vec<i32> = (0..5).map(|i| card(&mut conn, &format!("orphan{i}"))).collect();

        let deleted = sweep_orphans(&mut conn, 2, Duration::ZERO).unwrap();
        assert_eq!(deleted, orphans.len());
        assert!(CardRepository::get(&mut conn, kept).is_ok());
        for orphan in orphans {
            assert!(CardRepository::get(&mut conn, orphan).optional().unwrap().is_none());
        }
    }

    #[test]
    fn nothing_to_sweep() {
        let mut conn = test_connection();
        assert_eq!(sweep_orphans(&mut conn, 100, Duration::ZERO).unwrap(), 0);
    }
}
