use game_core::{Board, GameError};
use game_types::PlayerId;
use sea_orm::entity::prelude::Json;
use serde::{Deserialize, Serialize};

/// Persisted form of a [`Board`]: `{"size": n, "data": [[owner; n]; n]}`
/// with `0` for empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub size: usize,
    pub data: Vec<Vec<PlayerId>>,
}

impl BoardDocument {
    pub fn into_json(self) -> Json {
        serde_json::json!({ "size": self.size, "data": self.data })
    }

    pub fn from_json(value: Json) -> Result<Self, GameError> {
        serde_json::from_value(value).map_err(|_| GameError::InvalidBoard)
    }

    pub fn into_board(self) -> Result<Board, GameError> {
        if self.data.len() != self.size {
            return Err(GameError::InvalidBoard);
        }
        Board::from_rows(self.data)
    }
}

impl From<&Board> for BoardDocument {
    fn from(board: &Board) -> Self {
        Self {
            size: board.size(),
            data: board.rows().map(<[PlayerId]>::to_vec).collect(),
        }
    }
}
