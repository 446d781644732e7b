//! Chat intent classification and entity extraction.

mod classifier;
mod entities;
mod taxonomy;

pub use classifier::{IntentClassifier, INTENT_CACHE_NAMESPACE};
pub use entities::EntityExtractor;
pub use taxonomy::{IntentDefinition, TAXONOMY};
