//! Feature encoding for symptom submissions

pub mod encoder;
pub mod vocabulary;

pub use encoder::{FeatureEncoder, FeatureVector};
pub use vocabulary::{normalize_symptom, SymptomSet, SymptomVocabulary};
