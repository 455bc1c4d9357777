pub mod board_document;
pub mod connection;
pub mod entities;
pub mod errors;
pub mod repositories;
pub mod unit_of_work;

pub use board_document::BoardDocument;
pub use errors::{PersistenceError, UnitOfWorkError};
pub use repositories::{GameRepository, PlayerRepository};
pub use unit_of_work::UnitOfWork;

use errors::DbResultExt;
use sea_orm::DatabaseConnection;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Owns the store's connection pool between `start` and `stop`.
pub struct DatabaseManager {
    database_url: String,
    connection: RwLock<Option<DatabaseConnection>>,
}

impl DatabaseManager {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            connection: RwLock::new(None),
        }
    }

    /// Connects, migrates and pings the store. Calling it on a started
    /// manager replaces the previous pool.
    pub async fn start(&self) -> Result<(), PersistenceError> {
        info!("Starting database...");

        let connection = connection::connect_and_migrate(&self.database_url)
            .await
            .context("database connection open")?;
        connection.ping().await.context("ping database")?;

        *self.connection.write().await = Some(connection);
        info!("Database started");
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping database...");

        let Some(connection) = self.connection.write().await.take() else {
            return;
        };
        if let Err(err) = connection.close().await {
            error!(error = %err, "error closing database connection");
        }
        info!("database connection closed");
    }

    pub async fn acquire(&self) -> Result<DatabaseConnection, PersistenceError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(PersistenceError::ConnectionUnavailable)
    }

    pub async fn is_started(&self) -> bool {
        self.connection.read().await.is_some()
    }
}
