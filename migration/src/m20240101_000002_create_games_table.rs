use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_players_table::Players;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Games::GameType).string_len(8).not_null())
                    // {size, data} document, kept apart from the relational columns
                    .col(ColumnDef::new(Games::Board).json().not_null())
                    .col(ColumnDef::new(Games::CurrentPlayerId).integer().not_null())
                    .col(ColumnDef::new(Games::WinnerPlayerId).integer().null())
                    .col(ColumnDef::new(Games::FirstPlayerId).integer().not_null())
                    .col(ColumnDef::new(Games::SecondPlayerId).integer().null())
                    .col(
                        ColumnDef::new(Games::LastActivity)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_first_player")
                            .from(Games::Table, Games::FirstPlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_second_player")
                            .from(Games::Table, Games::SecondPlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    GameType,
    Board,
    CurrentPlayerId,
    WinnerPlayerId,
    FirstPlayerId,
    SecondPlayerId,
    LastActivity,
}
