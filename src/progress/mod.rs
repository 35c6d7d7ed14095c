mod document;
mod game_state;
mod store;

pub use document::{Mode, ProgressDocument, QuestResults};
pub use game_state::{ActiveQuest, CompletedQuest, GameState, PlayerStats, Position, Settings};
pub use store::{ProgressStore, SaveFile};
