pub mod grader;
pub mod loader;
pub mod types;
pub mod validator;

pub use grader::{normalize, score, Answer};
pub use loader::{load_catalog, load_level, load_segment};
pub use types::{Catalog, GameQuest, Level, NpcConfig, QuestId, QuestionRef, Quiz, Segment, SegmentKind};
pub use validator::{validate_catalog, Severity, ValidationError};
