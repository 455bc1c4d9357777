use thiserror::Error;

use crate::board::MIN_BOARD_SIZE;

/// Every way a domain operation can be refused.
///
/// Messages are user-facing: the HTTP layer renders them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("board size must be at least {min}x{min}", min = MIN_BOARD_SIZE)]
    InvalidSize { size: i32 },
    #[error("invalid position ({row}, {col})")]
    OutOfBounds { row: i32, col: i32 },
    #[error("position ({row}, {col}) is already occupied")]
    AlreadyOccupied { row: i32, col: i32 },
    #[error("nickname must be between 3 and 20 characters long")]
    InvalidNickname,
    #[error("password must be between 6 and 20 characters long")]
    InvalidPassword,
    #[error("invalid game type")]
    InvalidGameType { given: String },
    #[error("invalid board")]
    InvalidBoard,
    #[error("game state is inconsistent")]
    InvalidState,
    #[error("game is full")]
    FullGame,
    #[error("can't join to the same game")]
    CantJoinSameGame,
    #[error("game is not ready")]
    GameNotReady,
    #[error("it's not your turn")]
    NotYourTurn,
    #[error("game is already finished")]
    GameFinished,
}
