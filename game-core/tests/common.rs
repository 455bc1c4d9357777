#![allow(dead_code)]

use game_core::{Board, Game, Player};
use game_types::{GameType, PlayerId};

/// Creates a player that looks as if it had been saved with the given id
pub fn create_test_player(id: PlayerId, nickname: &str) -> Player {
    let mut player = Player::new(nickname, "securepassword").expect("valid test player");
    player.assign_id(id);
    player
}

/// Creates a game on a square board with only the first seat taken
pub fn create_waiting_game(size: i32) -> Game {
    let board = Board::new(size).expect("valid test board");
    Game::new(GameType::PlayerVsPlayer, board, create_test_player(1, "Alice"))
}

/// Creates a standard 5x5 game with Alice (id 1) and Bob (id 2) seated
pub fn create_standard_game() -> Game {
    let mut game = create_waiting_game(5);
    game.join(create_test_player(2, "Bobby"))
        .expect("second player joins");
    game
}

/// Plays moves alternately starting from whoever holds the turn
pub fn play_moves(game: &mut Game, moves: &[(i32, i32)]) {
    for &(row, col) in moves {
        let mover = game
            .current_player()
            .cloned()
            .expect("ready game has a current player");
        game.make_move(row, col, &mover)
            .unwrap_or_else(|e| panic!("move ({row}, {col}) rejected: {e}"));
    }
}

/// Asserts a cell is owned by the given player
pub fn assert_cell_owner(game: &Game, row: i32, col: i32, expected: PlayerId) {
    assert_eq!(
        game.board().owner(row, col),
        Some(expected),
        "Expected ({}, {}) to be owned by {}",
        row,
        col,
        expected
    );
}
