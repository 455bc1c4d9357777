pub mod board;
pub mod errors;
pub mod game;
pub mod player;

// Re-export main components
pub use board::*;
pub use errors::*;
pub use game::*;
pub use player::*;
