pub mod profile;
pub mod seed;
pub mod store;
pub mod types;

pub use profile::{FoodLog, UserProfileStore};
pub use store::{KnowledgeStore, LearnedKnowledge};
pub use types::*;
