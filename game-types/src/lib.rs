pub mod auth;
pub mod errors;
pub mod game;

// Re-export all types
pub use auth::*;
pub use errors::*;
pub use game::*;

/// Surrogate key of a persisted player; `0` means not yet persisted.
pub type PlayerId = i32;

/// Surrogate key of a persisted game; `0` means not yet persisted.
pub type GameId = i32;
