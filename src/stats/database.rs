use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, DatabaseConnection};

use super::{RoundSummary, StatsSink};
use crate::entities::game_info;

/// Writes one `game_info` row per completed round.
#[derive(Debug, Clone)]
pub struct DatabaseSink {
    db: DatabaseConnection,
}

impl DatabaseSink {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatsSink for DatabaseSink {
    async fn record(&self, summary: RoundSummary) -> anyhow::Result<()> {
        let row = game_info::ActiveModel {
            maze_no: NotSet,
            number_of_players: Set(i32::try_from(summary.player_count)
                .context("player count does not fit the number_of_players column")?),
            time_taken: Set(i64::try_from(summary.elapsed_secs)
                .context("elapsed time does not fit the time_taken column")?),
            completed_at: Set(Utc::now().fixed_offset()),
        };

        let inserted = row
            .insert(&self.db)
            .await
            .context("insert into game_info failed")?;

        tracing::info!(
            maze_no = inserted.maze_no,
            players = inserted.number_of_players,
            time_taken = inserted.time_taken,
            "Round summary stored"
        );
        Ok(())
    }
}
