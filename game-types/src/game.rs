use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameType {
    #[serde(rename = "pvp")]
    PlayerVsPlayer,
    #[serde(rename = "pva")]
    PlayerVsAgent,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::PlayerVsPlayer => "pvp",
            GameType::PlayerVsAgent => "pva",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names neither `pvp` nor `pva`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGameType(pub String);

impl fmt::Display for UnknownGameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown game type '{}'", self.0)
    }
}

impl std::error::Error for UnknownGameType {}

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pvp" => Ok(GameType::PlayerVsPlayer),
            "pva" => Ok(GameType::PlayerVsAgent),
            other => Err(UnknownGameType(other.to_string())),
        }
    }
}

/// Client-facing snapshot of a game.
///
/// `board[row][col]` is the owning player's id, or `null` for an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameStateDto {
    pub id: GameId,
    #[serde(rename = "type")]
    pub game_type: GameType,
    pub current_player: PlayerId,
    pub winner: Option<PlayerId>,
    pub size: usize,
    pub board: Vec<Vec<Option<PlayerId>>>,
}

/// `game_type` stays a raw string so an unknown type is reported as a domain
/// error rather than a body decode failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateGameRequest {
    pub game_type: String,
    pub board_size: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MoveRequest {
    pub row: i32,
    pub col: i32,
}
