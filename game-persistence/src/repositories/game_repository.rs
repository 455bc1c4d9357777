use std::str::FromStr;

use game_core::{Game, GameParts, Player, Slot};
use game_types::{GameId, GameType, PlayerId};
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    DatabaseTransaction, DbErr, EntityTrait,
};
use tracing::debug;

use crate::board_document::BoardDocument;
use crate::entities::{games, prelude::*};
use crate::errors::{DbResultExt, PersistenceError};
use crate::repositories::PlayerRepository;

/// Game storage bound to one open transaction. A game is loaded together
/// with both of its slot players.
pub struct GameRepository<'a> {
    transaction: &'a DatabaseTransaction,
}

impl<'a> GameRepository<'a> {
    pub fn new(transaction: &'a DatabaseTransaction) -> Self {
        Self { transaction }
    }

    pub async fn get_by_id(&self, id: GameId) -> Result<Game, PersistenceError> {
        let model = Games::find_by_id(id)
            .one(self.transaction)
            .await
            .context("get game by id")?
            .ok_or(PersistenceError::GameNotFound)?;

        let first_player = self.load_slot_player(model.first_player_id).await?;
        let second_player = match model.second_player_id {
            Some(player_id) => Some(self.load_slot_player(player_id).await?),
            None => None,
        };

        let game_type = GameType::from_str(&model.game_type)
            .map_err(|err| PersistenceError::CorruptRecord(err.to_string()))?;
        let board = BoardDocument::from_json(model.board)
            .and_then(BoardDocument::into_board)
            .map_err(|err| PersistenceError::CorruptRecord(err.to_string()))?;

        let current = slot_of(model.current_player_id, &first_player, second_player.as_ref())
            .ok_or_else(|| {
                PersistenceError::CorruptRecord(format!(
                    "current player {} is not seated in game {}",
                    model.current_player_id, model.id
                ))
            })?;
        let winner = match model.winner_player_id {
            Some(winner_id) => Some(
                slot_of(winner_id, &first_player, second_player.as_ref()).ok_or_else(|| {
                    PersistenceError::CorruptRecord(format!(
                        "winner {winner_id} is not seated in game {}",
                        model.id
                    ))
                })?,
            ),
            None => None,
        };

        Game::from_parts(GameParts {
            id: model.id,
            game_type,
            board,
            first_player,
            second_player,
            current,
            winner,
            last_activity: model.last_activity,
        })
        .map_err(|err| PersistenceError::CorruptRecord(err.to_string()))
    }

    /// Inserts the game when it has no id yet (assigning one), updates it otherwise.
    /// Seated players must already be persisted.
    pub async fn save(&self, game: &mut Game) -> Result<(), PersistenceError> {
        let first_player_id = persisted_id(game.first_player())?;
        let second_player_id = game.second_player().map(persisted_id).transpose()?;
        let current_player_id = game
            .current_player()
            .map(Player::id)
            .ok_or_else(|| PersistenceError::CorruptRecord("current slot is empty".to_string()))?;
        let winner_player_id = game.winner().map(Player::id);

        let mut model = games::ActiveModel {
            id: NotSet,
            game_type: Set(game.game_type().as_str().to_string()),
            board: Set(BoardDocument::from(game.board()).into_json()),
            current_player_id: Set(current_player_id),
            winner_player_id: Set(winner_player_id),
            first_player_id: Set(first_player_id),
            second_player_id: Set(second_player_id),
            last_activity: Set(game.last_activity()),
        };

        if game.id() == 0 {
            let result = Games::insert(model)
                .exec(self.transaction)
                .await
                .context("insert game")?;
            game.assign_id(result.last_insert_id);
            debug!(game_id = game.id(), "Game inserted");
            return Ok(());
        }

        model.id = Unchanged(game.id());
        match Games::update(model).exec(self.transaction).await {
            Ok(_) => {
                debug!(game_id = game.id(), "Game saved");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(PersistenceError::GameNotFound),
            Err(source) => Err(PersistenceError::Database {
                context: "update game",
                source,
            }),
        }
    }

    async fn load_slot_player(&self, player_id: PlayerId) -> Result<Player, PersistenceError> {
        PlayerRepository::new(self.transaction)
            .get_by_id(player_id)
            .await
            .map_err(|err| match err {
                PersistenceError::PlayerNotFound => PersistenceError::CorruptRecord(format!(
                    "seated player {player_id} does not exist"
                )),
                other => other,
            })
    }
}

fn persisted_id(player: &Player) -> Result<PlayerId, PersistenceError> {
    if player.is_persisted() {
        Ok(player.id())
    } else {
        Err(PersistenceError::NotPersisted)
    }
}

fn slot_of(player_id: PlayerId, first: &Player, second: Option<&Player>) -> Option<Slot> {
    if first.id() == player_id {
        Some(Slot::First)
    } else if second.is_some_and(|player| player.id() == player_id) {
        Some(Slot::Second)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use game_core::{Board, MoveOutcome};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, TransactionTrait};

    async fn setup_test_db() -> DatabaseConnection {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seat_players(tx: &DatabaseTransaction) -> (Player, Player) {
        let repo = PlayerRepository::new(tx);
        let mut alice = Player::new("Alice", "securepassword").unwrap();
        let mut bobby = Player::new("Bobby", "securepassword").unwrap();
        repo.insert(&mut alice).await.unwrap();
        repo.insert(&mut bobby).await.unwrap();
        (alice, bobby)
    }

    #[tokio::test]
    async fn test_save_and_load_waiting_game() {
        let db = setup_test_db().await;
        let tx = db.begin().await.unwrap();
        let (alice, _) = seat_players(&tx).await;
        let repo = GameRepository::new(&tx);

        let mut game = Game::new(GameType::PlayerVsPlayer, Board::new(5).unwrap(), alice);
        repo.save(&mut game).await.unwrap();
        assert_ne!(game.id(), 0);

        let loaded = repo.get_by_id(game.id()).await.unwrap();
        assert_eq!(loaded.game_type(), GameType::PlayerVsPlayer);
        assert_eq!(loaded.board().size(), 5);
        assert_eq!(loaded.first_player().nickname(), "Alice");
        assert!(loaded.second_player().is_none());
        assert_eq!(loaded.current_slot(), Slot::First);
        assert!(!loaded.is_ready());
    }

    #[tokio::test]
    async fn test_update_round_trips_moves_and_winner() {
        let db = setup_test_db().await;
        let tx = db.begin().await.unwrap();
        let (alice, bobby) = seat_players(&tx).await;
        let repo = GameRepository::new(&tx);

        let mut game = Game::new(GameType::PlayerVsAgent, Board::new(5).unwrap(), alice.clone());
        repo.save(&mut game).await.unwrap();
        let game_id = game.id();

        game.join(bobby.clone()).unwrap();
        game.make_move(0, 0, &alice).unwrap();
        game.make_move(1, 0, &bobby).unwrap();
        repo.save(&mut game).await.unwrap();
        assert_eq!(game.id(), game_id);

        let mut loaded = repo.get_by_id(game_id).await.unwrap();
        assert!(loaded.is_ready());
        assert_eq!(loaded.current_slot(), Slot::First);
        assert_eq!(loaded.board().owner(0, 0), Some(alice.id()));
        assert_eq!(loaded.board().owner(1, 0), Some(bobby.id()));

        loaded.make_move(0, 1, &alice).unwrap();
        loaded.make_move(1, 1, &bobby).unwrap();
        assert_eq!(
            loaded.make_move(0, 2, &alice).unwrap(),
            MoveOutcome::Won(Slot::First)
        );
        repo.save(&mut loaded).await.unwrap();

        let finished = repo.get_by_id(game_id).await.unwrap();
        assert_eq!(finished.winner_slot(), Some(Slot::First));
        assert_eq!(finished.winner().map(Player::id), Some(alice.id()));
        assert_eq!(finished.game_type(), GameType::PlayerVsAgent);
    }

    #[tokio::test]
    async fn test_unknown_game_is_not_found() {
        let db = setup_test_db().await;
        let tx = db.begin().await.unwrap();
        let repo = GameRepository::new(&tx);

        let result = repo.get_by_id(404).await;
        assert!(matches!(result, Err(PersistenceError::GameNotFound)));
    }

    #[tokio::test]
    async fn test_save_requires_persisted_players() {
        let db = setup_test_db().await;
        let tx = db.begin().await.unwrap();
        let repo = GameRepository::new(&tx);

        let fresh = Player::new("Alice", "securepassword").unwrap();
        let mut game = Game::new(GameType::PlayerVsPlayer, Board::new(3).unwrap(), fresh);
        assert!(matches!(
            repo.save(&mut game).await,
            Err(PersistenceError::NotPersisted)
        ));
        assert_eq!(game.id(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_board_document() {
        let db = setup_test_db().await;
        let tx = db.begin().await.unwrap();
        let (alice, _) = seat_players(&tx).await;
        let repo = GameRepository::new(&tx);

        let mut game = Game::new(GameType::PlayerVsPlayer, Board::new(3).unwrap(), alice);
        repo.save(&mut game).await.unwrap();

        let backend = tx.get_database_backend();
        tx.execute(Statement::from_sql_and_values(
            backend,
            "UPDATE games SET board = ? WHERE id = ?",
            [r#"{"size": 3, "data": [[0]]}"#.into(), game.id().into()],
        ))
        .await
        .unwrap();

        assert!(matches!(
            repo.get_by_id(game.id()).await,
            Err(PersistenceError::CorruptRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_dangling_current_player() {
        let db = setup_test_db().await;
        let tx = db.begin().await.unwrap();
        let (alice, bobby) = seat_players(&tx).await;
        let repo = GameRepository::new(&tx);

        let mut game = Game::new(GameType::PlayerVsPlayer, Board::new(3).unwrap(), alice);
        repo.save(&mut game).await.unwrap();

        // bobby never joined, so he cannot hold the turn
        let backend = tx.get_database_backend();
        tx.execute(Statement::from_sql_and_values(
            backend,
            "UPDATE games SET current_player_id = ? WHERE id = ?",
            [bobby.id().into(), game.id().into()],
        ))
        .await
        .unwrap();

        assert!(matches!(
            repo.get_by_id(game.id()).await,
            Err(PersistenceError::CorruptRecord(_))
        ));
    }
}
