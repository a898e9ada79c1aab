//! Player records.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{PlayerError, PlayerResult};
pub use manager::{MAX_NICK_LEN, PlayerManager};
pub use models::{NewPlayer, Player, PlayerId, PlayerUpdate};
