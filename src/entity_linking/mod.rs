//! Entity resolution for free-text names
//!
//! Normalization, company-vs-person classification and person deduplication
//! used while assembling the relationship graph.

pub mod classifier;
pub mod lexicon;
pub mod normalize;
pub mod resolver;

pub use classifier::{CompanyNameSet, EntityClassifier};
pub use lexicon::{EntityLexicon, LexiconOverrides};
pub use normalize::normalize_person_name;
pub use resolver::{same_identity, PersonRegistry};
