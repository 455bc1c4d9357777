use std::sync::Arc;

use game_core::{Board, Game, MoveOutcome, Player};
use game_persistence::{DatabaseManager, PersistenceError, PlayerRepository, UnitOfWork};
use game_types::{
    CreateGameRequest, GameId, GameStateDto, LoginRequest, MoveRequest, RegisterRequest,
    TokenResponse,
};
use serde::Serialize;
use tracing::{error, info};
use warp::http::StatusCode;

use crate::auth::{AuthenticatedPlayer, JwtService};
use crate::errors::ApiError;

fn respond<T: Serialize>(
    result: Result<T, ApiError>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, warp::Rejection> {
    match result {
        Ok(body) => Ok(warp::reply::with_status(
            warp::reply::json(&body),
            StatusCode::OK,
        )),
        Err(err) => Ok(err.to_reply()),
    }
}

/// Ends the unit of work for a handler outcome: commits on success and on
/// not-found, rolls back on anything else.
async fn finish<T>(mut uow: UnitOfWork, outcome: Result<T, ApiError>) -> Result<T, ApiError> {
    match outcome {
        Ok(value) => {
            uow.complete(None).await?;
            Ok(value)
        }
        Err(err) if err.is_not_found() => {
            uow.complete(None).await?;
            Err(err)
        }
        Err(err) => {
            if let Err(completion) = uow.complete(Some(&err)).await {
                if completion.db_error().is_some() {
                    error!(error = %completion, "Rollback failed");
                }
            }
            Err(err)
        }
    }
}

async fn load_principal(
    players: &PlayerRepository<'_>,
    principal: &AuthenticatedPlayer,
) -> Result<Player, ApiError> {
    players
        .get_by_nickname(&principal.nickname)
        .await
        .map_err(|err| match err {
            PersistenceError::PlayerNotFound => ApiError::Unauthorized(err.to_string()),
            other => other.into(),
        })
}

pub async fn handle_register(
    request: RegisterRequest,
    database: Arc<DatabaseManager>,
    jwt_service: Arc<JwtService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    respond(register(request, &database, &jwt_service).await)
}

async fn register(
    request: RegisterRequest,
    database: &DatabaseManager,
    jwt_service: &JwtService,
) -> Result<TokenResponse, ApiError> {
    let mut player = Player::new(request.nickname, &request.password)?;

    let uow = UnitOfWork::begin(database).await?;
    let outcome = async {
        uow.player_repository()?.insert(&mut player).await?;
        Ok::<_, ApiError>(())
    }
    .await;
    finish(uow, outcome).await?;

    info!(player_id = player.id(), nickname = player.nickname(), "Player registered");
    let token = jwt_service.sign(player.nickname())?;
    Ok(TokenResponse { token })
}

pub async fn handle_login(
    request: LoginRequest,
    database: Arc<DatabaseManager>,
    jwt_service: Arc<JwtService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    respond(login(request, &database, &jwt_service).await)
}

async fn login(
    request: LoginRequest,
    database: &DatabaseManager,
    jwt_service: &JwtService,
) -> Result<TokenResponse, ApiError> {
    let uow = UnitOfWork::begin(database).await?;
    let outcome = async {
        Ok::<_, ApiError>(
            uow.player_repository()?
                .get_by_nickname(&request.nickname)
                .await?,
        )
    }
    .await;

    let player = finish(uow, outcome).await.map_err(|err| match err {
        ApiError::NotFound(message) => ApiError::Unauthorized(message),
        other => other,
    })?;

    if !player.verify_password(&request.password) {
        info!(nickname = player.nickname(), "Rejected login with bad credentials");
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = jwt_service.sign(player.nickname())?;
    Ok(TokenResponse { token })
}

pub async fn handle_create_game(
    principal: AuthenticatedPlayer,
    request: CreateGameRequest,
    database: Arc<DatabaseManager>,
    max_board_size: i32,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = async {
        let uow = UnitOfWork::begin(&database).await?;
        let outcome = create_game(&uow, &principal, request, max_board_size).await;
        finish(uow, outcome).await
    }
    .await;

    respond(result)
}

async fn create_game(
    uow: &UnitOfWork,
    principal: &AuthenticatedPlayer,
    request: CreateGameRequest,
    max_board_size: i32,
) -> Result<GameStateDto, ApiError> {
    let player = load_principal(&uow.player_repository()?, principal).await?;

    if request.board_size > max_board_size {
        return Err(ApiError::BadRequest(format!(
            "board size must be at most {max_board_size}x{max_board_size}"
        )));
    }
    let board = Board::new(request.board_size)?;
    let game_type = Game::parse_type(&request.game_type)?;

    let mut game = Game::new(game_type, board, player);
    uow.game_repository()?.save(&mut game).await?;

    info!(
        game_id = game.id(),
        nickname = %principal.nickname,
        size = request.board_size,
        "Game created"
    );
    Ok(GameStateDto::from(&game))
}

pub async fn handle_get_game(
    game_id: GameId,
    principal: AuthenticatedPlayer,
    database: Arc<DatabaseManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = async {
        let uow = UnitOfWork::begin(&database).await?;
        let outcome = get_game(&uow, &principal, game_id).await;
        finish(uow, outcome).await
    }
    .await;

    respond(result)
}

async fn get_game(
    uow: &UnitOfWork,
    principal: &AuthenticatedPlayer,
    game_id: GameId,
) -> Result<GameStateDto, ApiError> {
    load_principal(&uow.player_repository()?, principal).await?;
    let game = uow.game_repository()?.get_by_id(game_id).await?;
    Ok(GameStateDto::from(&game))
}

pub async fn handle_join_game(
    game_id: GameId,
    principal: AuthenticatedPlayer,
    database: Arc<DatabaseManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = async {
        let uow = UnitOfWork::begin(&database).await?;
        let outcome = join_game(&uow, &principal, game_id).await;
        finish(uow, outcome).await
    }
    .await;

    respond(result)
}

async fn join_game(
    uow: &UnitOfWork,
    principal: &AuthenticatedPlayer,
    game_id: GameId,
) -> Result<GameStateDto, ApiError> {
    let player = load_principal(&uow.player_repository()?, principal).await?;
    let games = uow.game_repository()?;

    let mut game = games.get_by_id(game_id).await?;
    game.join(player)?;
    games.save(&mut game).await?;

    info!(game_id, nickname = %principal.nickname, "Player joined game");
    Ok(GameStateDto::from(&game))
}

pub async fn handle_make_move(
    game_id: GameId,
    principal: AuthenticatedPlayer,
    request: MoveRequest,
    database: Arc<DatabaseManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = async {
        let uow = UnitOfWork::begin(&database).await?;
        let outcome = make_move(&uow, &principal, game_id, request).await;
        finish(uow, outcome).await
    }
    .await;

    respond(result)
}

/// Applies a move and, on a win, credits the winner in the same transaction.
async fn make_move(
    uow: &UnitOfWork,
    principal: &AuthenticatedPlayer,
    game_id: GameId,
    request: MoveRequest,
) -> Result<GameStateDto, ApiError> {
    let players = uow.player_repository()?;
    let games = uow.game_repository()?;

    let player = load_principal(&players, principal).await?;
    let mut game = games.get_by_id(game_id).await?;

    let outcome = game.make_move(request.row, request.col, &player)?;
    if let MoveOutcome::Won(_) = outcome {
        if let Some(winner) = game.winner_mut() {
            winner.add_score();
            players.save(winner).await?;
            info!(game_id, player_id = winner.id(), score = winner.score(), "Game won");
        }
    }
    games.save(&mut game).await?;

    Ok(GameStateDto::from(&game))
}
