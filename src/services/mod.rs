pub mod llm;
pub mod search;
pub mod voice;
