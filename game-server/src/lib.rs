use std::convert::Infallible;
use std::sync::Arc;

use game_persistence::DatabaseManager;
use game_types::GameId;
use serde::de::DeserializeOwned;
use warp::Filter;

use crate::auth::{JwtService, with_principal};
use crate::config::Config;

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;

const MAX_BODY_BYTES: u64 = 16 * 1024;

fn json_body<T: DeserializeOwned + Send>()
-> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn create_routes(
    database: Arc<DatabaseManager>,
    jwt_service: Arc<JwtService>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let database_filter = warp::any().map({
        let database = database.clone();
        move || database.clone()
    });

    let jwt_filter = warp::any().map({
        let jwt_service = jwt_service.clone();
        move || jwt_service.clone()
    });

    let max_board_size = config.max_board_size;
    let principal = with_principal(jwt_service.clone());

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    let register = warp::path!("api" / "v1" / "register")
        .and(warp::post())
        .and(json_body())
        .and(database_filter.clone())
        .and(jwt_filter.clone())
        .and_then(handlers::handle_register);

    let login = warp::path!("api" / "v1" / "login")
        .and(warp::post())
        .and(json_body())
        .and(database_filter.clone())
        .and(jwt_filter.clone())
        .and_then(handlers::handle_login);

    let create_game = warp::path!("api" / "v1" / "games")
        .and(warp::post())
        .and(principal.clone())
        .and(json_body())
        .and(database_filter.clone())
        .and(warp::any().map(move || max_board_size))
        .and_then(handlers::handle_create_game);

    let get_game = warp::path!("api" / "v1" / "games" / GameId)
        .and(warp::get())
        .and(principal.clone())
        .and(database_filter.clone())
        .and_then(handlers::handle_get_game);

    let join_game = warp::path!("api" / "v1" / "games" / GameId / "join")
        .and(warp::put())
        .and(principal.clone())
        .and(database_filter.clone())
        .and_then(handlers::handle_join_game);

    let make_move = warp::path!("api" / "v1" / "games" / GameId / "move")
        .and(warp::put())
        .and(principal)
        .and(json_body())
        .and(database_filter)
        .and_then(handlers::handle_make_move);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(register)
        .or(login)
        .or(create_game)
        .or(get_game)
        .or(join_game)
        .or(make_move)
        .with(cors)
        .recover(errors::handle_rejection)
        .with(warp::log("gomoku"))
}
