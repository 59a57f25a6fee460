pub mod aggregator;
pub mod answer;
pub mod dietary;
pub mod lexical;
pub mod web;

pub use aggregator::KnowledgeAggregator;
pub use answer::{Answer, Provenance};
pub use dietary::{DietaryIndex, ReferenceRecord};
pub use web::WebResearcher;
