use sea_orm_migration::prelude::*;

/// Creates the `game_info` table holding one row per completed dungeon round.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum GameInfo {
    Table,
    MazeNo,
    NumberOfPlayers,
    TimeTaken,
    CompletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameInfo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameInfo::MazeNo)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameInfo::NumberOfPlayers).integer().not_null())
                    .col(ColumnDef::new(GameInfo::TimeTaken).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameInfo::CompletedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_info_completed_at")
                    .table(GameInfo::Table)
                    .col(GameInfo::CompletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameInfo::Table).to_owned())
            .await
    }
}
