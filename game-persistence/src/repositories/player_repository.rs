use chrono::Utc;
use game_core::Player;
use game_types::PlayerId;
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, SqlErr,
};
use tracing::debug;

use crate::entities::{players, prelude::*};
use crate::errors::{DbResultExt, PersistenceError};

/// Player storage bound to one open transaction.
pub struct PlayerRepository<'a> {
    transaction: &'a DatabaseTransaction,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(transaction: &'a DatabaseTransaction) -> Self {
        Self { transaction }
    }

    pub(crate) fn model_to_player(model: players::Model) -> Player {
        Player::restore(model.id, model.nickname, model.password_hash, model.score)
    }

    /// Inserts a never-persisted player and assigns the generated id to it.
    pub async fn insert(&self, player: &mut Player) -> Result<(), PersistenceError> {
        if player.is_persisted() {
            return Err(PersistenceError::AlreadyPersisted);
        }

        let model = players::ActiveModel {
            id: NotSet,
            nickname: Set(player.nickname().to_string()),
            password_hash: Set(player.password_hash().to_string()),
            score: Set(player.score()),
            created_at: Set(Utc::now()),
        };

        let result = Players::insert(model)
            .exec(self.transaction)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => PersistenceError::DuplicateNickname,
                _ => PersistenceError::Database {
                    context: "insert player",
                    source: err,
                },
            })?;

        player.assign_id(result.last_insert_id);
        debug!(player_id = player.id(), nickname = player.nickname(), "Player inserted");
        Ok(())
    }

    pub async fn get_by_nickname(&self, nickname: &str) -> Result<Player, PersistenceError> {
        Players::find()
            .filter(players::Column::Nickname.eq(nickname))
            .one(self.transaction)
            .await
            .context("get player by nickname")?
            .map(Self::model_to_player)
            .ok_or(PersistenceError::PlayerNotFound)
    }

    pub async fn get_by_id(&self, id: PlayerId) -> Result<Player, PersistenceError> {
        Players::find_by_id(id)
            .one(self.transaction)
            .await
            .context("get player by id")?
            .map(Self::model_to_player)
            .ok_or(PersistenceError::PlayerNotFound)
    }

    /// Writes back nickname, credential and score of a persisted player.
    pub async fn save(&self, player: &Player) -> Result<(), PersistenceError> {
        if !player.is_persisted() {
            return Err(PersistenceError::NotPersisted);
        }

        let model = players::ActiveModel {
            id: Unchanged(player.id()),
            nickname: Set(player.nickname().to_string()),
            password_hash: Set(player.password_hash().to_string()),
            score: Set(player.score()),
            created_at: NotSet,
        };

        match Players::update(model).exec(self.transaction).await {
            Ok(_) => {
                debug!(player_id = player.id(), score = player.score(), "Player saved");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(PersistenceError::PlayerNotFound),
            Err(source) => Err(PersistenceError::Database {
                context: "update player",
                source,
            }),
        }
    }
}
