use chrono::{DateTime, Utc};
use game_types::{GameId, GameStateDto, GameType};
use tracing::debug;

use crate::{Board, GameError, Player};

/// Contiguous cells needed to win. A deployment constant, independent of
/// the board size.
pub const WIN_LENGTH: usize = 3;

/// One of the two player positions in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Only the creator has joined.
    Created,
    /// Both slots are filled and nobody has won yet.
    Ready,
    /// A winner is set; the game accepts no further moves.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The turn passed to the player in the given slot.
    TurnPassed(Slot),
    /// The mover completed a line and won.
    Won(Slot),
}

/// Everything needed to rebuild a game read back from storage.
#[derive(Debug, Clone)]
pub struct GameParts {
    pub id: GameId,
    pub game_type: GameType,
    pub board: Board,
    pub first_player: Player,
    pub second_player: Option<Player>,
    pub current: Slot,
    pub winner: Option<Slot>,
    pub last_activity: DateTime<Utc>,
}

/// A two-player match: the board, both seats, whose turn it is and who won.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    game_type: GameType,
    board: Board,
    first_player: Player,
    second_player: Option<Player>,
    current: Slot,
    winner: Option<Slot>,
    last_activity: DateTime<Utc>,
}

impl Game {
    pub fn new(game_type: GameType, board: Board, first_player: Player) -> Self {
        Self {
            id: 0,
            game_type,
            board,
            first_player,
            second_player: None,
            current: Slot::First,
            winner: None,
            last_activity: Utc::now(),
        }
    }

    /// Parses a wire game type, mapping unknown names to `InvalidGameType`.
    pub fn parse_type(value: &str) -> Result<GameType, GameError> {
        value.parse().map_err(|_| GameError::InvalidGameType {
            given: value.to_string(),
        })
    }

    /// Rebuilds a stored game. Slot pointers must name an occupied slot.
    pub fn from_parts(parts: GameParts) -> Result<Self, GameError> {
        let second_missing = parts.second_player.is_none();
        if second_missing && (parts.current == Slot::Second || parts.winner.is_some()) {
            return Err(GameError::InvalidState);
        }

        Ok(Self {
            id: parts.id,
            game_type: parts.game_type,
            board: parts.board,
            first_player: parts.first_player,
            second_player: parts.second_player,
            current: parts.current,
            winner: parts.winner,
            last_activity: parts.last_activity,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn assign_id(&mut self, id: GameId) {
        self.id = id;
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn player(&self, slot: Slot) -> Option<&Player> {
        match slot {
            Slot::First => Some(&self.first_player),
            Slot::Second => self.second_player.as_ref(),
        }
    }

    fn player_mut(&mut self, slot: Slot) -> Option<&mut Player> {
        match slot {
            Slot::First => Some(&mut self.first_player),
            Slot::Second => self.second_player.as_mut(),
        }
    }

    pub fn first_player(&self) -> &Player {
        &self.first_player
    }

    pub fn second_player(&self) -> Option<&Player> {
        self.second_player.as_ref()
    }

    pub fn current_slot(&self) -> Slot {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.current)
    }

    pub fn winner_slot(&self) -> Option<Slot> {
        self.winner
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.and_then(|slot| self.player(slot))
    }

    /// Mutable access to the winner, for crediting the win.
    pub fn winner_mut(&mut self) -> Option<&mut Player> {
        let slot = self.winner?;
        self.player_mut(slot)
    }

    pub fn has_winner(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.second_player.is_some()
    }

    pub fn status(&self) -> GameStatus {
        if self.winner.is_some() {
            GameStatus::Finished
        } else if self.is_ready() {
            GameStatus::Ready
        } else {
            GameStatus::Created
        }
    }

    pub fn join(&mut self, player: Player) -> Result<(), GameError> {
        if self.second_player.is_some() {
            return Err(GameError::FullGame);
        }

        if self.first_player.same_identity(&player) {
            return Err(GameError::CantJoinSameGame);
        }

        debug!(game_id = self.id, player_id = player.id(), "Second player joined");
        self.second_player = Some(player);
        self.last_activity = Utc::now();
        Ok(())
    }

    /// Places a piece for `player`, who must hold the current turn.
    ///
    /// A winning move leaves the turn with the winner and ends the game.
    pub fn make_move(
        &mut self,
        row: i32,
        col: i32,
        player: &Player,
    ) -> Result<MoveOutcome, GameError> {
        if !self.is_ready() {
            return Err(GameError::GameNotReady);
        }

        if self.winner.is_some() {
            return Err(GameError::GameFinished);
        }

        let is_current = self
            .current_player()
            .is_some_and(|current| current.same_identity(player));
        if !is_current {
            return Err(GameError::NotYourTurn);
        }

        self.board.place(row, col, player.id())?;
        self.last_activity = Utc::now();

        if self.board.check_win(row, col, player.id(), WIN_LENGTH) {
            self.winner = Some(self.current);
            debug!(game_id = self.id, player_id = player.id(), "Winning move");
            return Ok(MoveOutcome::Won(self.current));
        }

        if let Some(next) = self.slot_of(player).map(Slot::other) {
            self.current = next;
        }
        Ok(MoveOutcome::TurnPassed(self.current))
    }

    fn slot_of(&self, player: &Player) -> Option<Slot> {
        [Slot::First, Slot::Second].into_iter().find(|slot| {
            self.player(*slot)
                .is_some_and(|occupant| occupant.same_identity(player))
        })
    }
}

impl From<&Game> for GameStateDto {
    fn from(game: &Game) -> Self {
        let board = game
            .board
            .rows()
            .map(|row| {
                row.iter()
                    .map(|owner| (*owner != crate::board::EMPTY_CELL).then_some(*owner))
                    .collect()
            })
            .collect();

        GameStateDto {
            id: game.id,
            game_type: game.game_type,
            current_player: game.current_player().map_or(0, Player::id),
            winner: game.winner().map(Player::id),
            size: game.board.size(),
            board,
        }
    }
}
