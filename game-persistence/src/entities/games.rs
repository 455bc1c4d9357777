use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub game_type: String,
    /// `{size, data}` board document.
    pub board: Json,
    pub current_player_id: i32,
    pub winner_player_id: Option<i32>,
    pub first_player_id: i32,
    pub second_player_id: Option<i32>,
    pub last_activity: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::FirstPlayerId",
        to = "super::players::Column::Id"
    )]
    FirstPlayer,
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::SecondPlayerId",
        to = "super::players::Column::Id"
    )]
    SecondPlayer,
}

impl ActiveModelBehavior for ActiveModel {}
