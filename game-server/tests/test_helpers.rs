#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::Arc;

use game_persistence::DatabaseManager;
use game_server::auth::JwtService;
use game_server::config::Config;
use game_server::create_routes;
use game_types::{ErrorResponse, GameStateDto, TokenResponse};
use serde::de::DeserializeOwned;
use warp::Filter;
use warp::http::Response;
use warp::hyper::body::Bytes;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "securepassword";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_ttl_minutes: 120,
        max_board_size: 19,
        shutdown_timeout_seconds: 1,
    }
}

/// A started in-memory database plus the full filter chain over it.
pub struct TestApp {
    pub database: Arc<DatabaseManager>,
    pub jwt_service: Arc<JwtService>,
    pub config: Arc<Config>,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Arc::new(test_config());
        let database = Arc::new(DatabaseManager::new(config.database_url.clone()));
        database.start().await.unwrap();
        let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_ttl()));

        Self {
            database,
            jwt_service,
            config,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone + 'static {
        create_routes(
            self.database.clone(),
            self.jwt_service.clone(),
            self.config.clone(),
        )
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &str) -> Response<Bytes> {
        self.send("POST", path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Option<&str>) -> Response<Bytes> {
        self.send("PUT", path, token, body).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response<Bytes> {
        self.send("GET", path, token, None).await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Response<Bytes> {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request
                .header("content-type", "application/json")
                .body(body.to_string());
        }
        request.reply(&self.routes()).await
    }

    /// Registers a player and returns its token.
    pub async fn register(&self, nickname: &str) -> String {
        let body = serde_json::json!({ "nickname": nickname, "password": TEST_PASSWORD });
        let response = self
            .post("/api/v1/register", None, &body.to_string())
            .await;
        assert_eq!(response.status(), 200, "register {nickname} failed");
        parse::<TokenResponse>(&response).token
    }

    pub async fn create_game(&self, token: &str, game_type: &str, size: i32) -> GameStateDto {
        let body = serde_json::json!({ "game_type": game_type, "board_size": size });
        let response = self.post("/api/v1/games/", Some(token), &body.to_string()).await;
        assert_eq!(response.status(), 200);
        parse(&response)
    }

    pub async fn join(&self, token: &str, game_id: i32) -> Response<Bytes> {
        self.put(&format!("/api/v1/games/{game_id}/join"), Some(token), None)
            .await
    }

    pub async fn make_move(&self, token: &str, game_id: i32, row: i32, col: i32) -> Response<Bytes> {
        let body = serde_json::json!({ "row": row, "col": col }).to_string();
        self.put(&format!("/api/v1/games/{game_id}/move"), Some(token), Some(&body))
            .await
    }

    /// Two registered players seated in a fresh 5x5 game, first player to move.
    pub async fn ready_game(&self) -> (String, String, GameStateDto) {
        let alice = self.register("Alice").await;
        let bobby = self.register("Bobby").await;
        let game = self.create_game(&alice, "pvp", 5).await;

        let response = self.join(&bobby, game.id).await;
        assert_eq!(response.status(), 200);
        (alice, bobby, parse(&response))
    }
}

pub fn parse<T: DeserializeOwned>(response: &Response<Bytes>) -> T {
    serde_json::from_slice(response.body()).unwrap_or_else(|err| {
        panic!(
            "unexpected body {:?}: {err}",
            String::from_utf8_lossy(response.body())
        )
    })
}

pub fn error_message(response: &Response<Bytes>) -> String {
    parse::<ErrorResponse>(response).error
}
