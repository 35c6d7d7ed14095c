pub mod config;
pub mod events;
pub mod npc;
pub mod progress;
pub mod quest;
pub mod session;
pub mod sync;
pub mod unlock;

pub use events::{EventBus, EventKind, GameEvent};
pub use session::Session;
