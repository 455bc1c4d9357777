mod common;

use common::*;
use game_core::{GameError, GameStatus, MoveOutcome, Player, Slot, WIN_LENGTH};
use game_types::GameStateDto;

#[test]
fn test_game_lifecycle() {
    let mut game = create_waiting_game(5);
    assert_eq!(game.status(), GameStatus::Created);

    game.join(create_test_player(2, "Bobby")).unwrap();
    assert_eq!(game.status(), GameStatus::Ready);

    play_moves(&mut game, &[(2, 0), (0, 0), (2, 1), (0, 1), (2, 2)]);
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.winner().map(Player::id), Some(1));
}

#[test]
fn test_win_length_is_fixed_constant() {
    assert_eq!(WIN_LENGTH, 3);

    // three in a row already wins on a large board
    let mut game = create_waiting_game(15);
    game.join(create_test_player(2, "Bobby")).unwrap();
    play_moves(&mut game, &[(7, 7), (0, 0), (8, 8), (0, 14)]);

    let alice = game.first_player().clone();
    assert_eq!(
        game.make_move(9, 9, &alice),
        Ok(MoveOutcome::Won(Slot::First))
    );
}

#[test]
fn test_two_in_a_row_does_not_win() {
    let mut game = create_standard_game();
    play_moves(&mut game, &[(0, 0), (4, 4), (0, 1)]);

    assert!(!game.has_winner());
    assert_eq!(game.current_slot(), Slot::Second);
}

#[test]
fn test_second_player_can_win() {
    let mut game = create_standard_game();
    play_moves(&mut game, &[(0, 0), (4, 0), (0, 4), (4, 1), (2, 2), (4, 2)]);

    assert_eq!(game.winner().map(Player::id), Some(2));
    assert_eq!(game.current_slot(), Slot::Second);
}

#[test]
fn test_not_your_turn_after_own_move() {
    let mut game = create_standard_game();
    play_moves(&mut game, &[(1, 1)]);

    let alice = game.first_player().clone();
    assert_eq!(game.make_move(1, 2, &alice), Err(GameError::NotYourTurn));
    assert_cell_owner(&game, 1, 1, 1);
    assert!(!game.board().is_occupied(1, 2));
}

#[test]
fn test_outsider_cannot_move() {
    let mut game = create_standard_game();
    let outsider = create_test_player(3, "Carol");
    assert_eq!(game.make_move(0, 0, &outsider), Err(GameError::NotYourTurn));
}

#[test]
fn test_full_game_rejects_third_player() {
    let mut game = create_standard_game();
    assert_eq!(
        game.join(create_test_player(3, "Carol")),
        Err(GameError::FullGame)
    );
    assert_eq!(
        game.join(create_test_player(1, "Alice")),
        Err(GameError::FullGame)
    );
}

#[test]
fn test_state_dto_after_win() {
    let mut game = create_standard_game();
    game.assign_id(5);
    play_moves(&mut game, &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);

    let dto = GameStateDto::from(&game);
    assert_eq!(dto.winner, Some(1));
    assert_eq!(dto.current_player, 1);
    assert_eq!(dto.board[1][1], Some(2));
    assert_eq!(dto.board.len(), 5);
    assert!(dto.board.iter().all(|row| row.len() == 5));
}
