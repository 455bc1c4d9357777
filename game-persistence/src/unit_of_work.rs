use std::fmt::Display;

use sea_orm::{DatabaseTransaction, DbErr, TransactionTrait};
use tracing::{debug, warn};

use crate::errors::DbResultExt;
use crate::{DatabaseManager, GameRepository, PersistenceError, PlayerRepository, UnitOfWorkError};

/// One request-scoped transaction shared by the repositories handed out from it.
///
/// Every unit must end with exactly one [`UnitOfWork::complete`]. A unit that is
/// dropped without completing is rolled back by the driver.
pub struct UnitOfWork {
    transaction: Option<DatabaseTransaction>,
}

impl UnitOfWork {
    pub async fn begin(database: &DatabaseManager) -> Result<Self, PersistenceError> {
        let connection = database.acquire().await?;
        let transaction = connection.begin().await.context("begin transaction")?;

        debug!("Unit of work started");
        Ok(Self {
            transaction: Some(transaction),
        })
    }

    pub fn player_repository(&self) -> Result<PlayerRepository<'_>, PersistenceError> {
        self.transaction().map(PlayerRepository::new)
    }

    pub fn game_repository(&self) -> Result<GameRepository<'_>, PersistenceError> {
        self.transaction().map(GameRepository::new)
    }

    pub fn is_completed(&self) -> bool {
        self.transaction.is_none()
    }

    /// Rolls back when `failure` is given, commits otherwise.
    ///
    /// A failure is always reported back wrapped, so callers can surface the
    /// original cause. Committing an already completed unit is a no-op.
    pub async fn complete(
        &mut self,
        failure: Option<&(dyn Display + Sync)>,
    ) -> Result<(), UnitOfWorkError> {
        let transaction = self.transaction.take();

        match (failure, transaction) {
            (Some(failure), Some(transaction)) => {
                let cause = failure.to_string();
                let err = match transaction.rollback().await {
                    Ok(()) => UnitOfWorkError::RolledBack { cause },
                    Err(source) => UnitOfWorkError::RollbackFailed { cause, source },
                };
                warn!(error = %err, "Unit of work rolled back");
                Err(err)
            }
            (Some(failure), None) => Err(UnitOfWorkError::AlreadyCompleted {
                cause: failure.to_string(),
            }),
            (None, Some(transaction)) => {
                transaction
                    .commit()
                    .await
                    .map_err(|source| UnitOfWorkError::CommitFailed { source })?;
                debug!("Unit of work committed");
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    fn transaction(&self) -> Result<&DatabaseTransaction, PersistenceError> {
        self.transaction
            .as_ref()
            .ok_or(PersistenceError::TransactionCompleted)
    }
}

impl UnitOfWorkError {
    /// The store-level failure behind this error, if any.
    pub fn db_error(&self) -> Option<&DbErr> {
        match self {
            Self::RollbackFailed { source, .. } | Self::CommitFailed { source } => Some(source),
            Self::RolledBack { .. } | Self::AlreadyCompleted { .. } => None,
        }
    }
}
