use game_core::GameError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database connection closed")]
    ConnectionUnavailable,

    #[error("player not found")]
    PlayerNotFound,

    #[error("game is not found")]
    GameNotFound,

    #[error("player with same nickname already exists")]
    DuplicateNickname,

    #[error("cannot insert player with existing ID")]
    AlreadyPersisted,

    #[error("cannot save player without an ID")]
    NotPersisted,

    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    #[error("transaction is already completed")]
    TransactionCompleted,

    #[error(transparent)]
    Domain(#[from] GameError),

    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: DbErr,
    },
}

impl PersistenceError {
    /// Not-found sentinels are successful empty reads at the transaction level.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PlayerNotFound | Self::GameNotFound)
    }
}

/// Outcome of [`crate::UnitOfWork::complete`] when the unit did not commit cleanly.
#[derive(Debug, Error)]
pub enum UnitOfWorkError {
    #[error("detected error and rolled transaction back: {cause}")]
    RolledBack { cause: String },

    #[error("detected error but transaction is already completed: {cause}")]
    AlreadyCompleted { cause: String },

    #[error("detected error but rollback failed for some reason: {cause}")]
    RollbackFailed {
        cause: String,
        #[source]
        source: DbErr,
    },

    #[error("commit failed due to error: {source}")]
    CommitFailed {
        #[source]
        source: DbErr,
    },
}

pub(crate) trait DbResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, PersistenceError>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn context(self, context: &'static str) -> Result<T, PersistenceError> {
        self.map_err(|source| PersistenceError::Database { context, source })
    }
}
