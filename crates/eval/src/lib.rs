//! ListingSmith Quality Evaluator
//!
//! Heuristic checks over generated listing content: length ceilings,
//! keyword presence, unlisted amenities, readability and split confidence.

mod evaluator;
mod readability;
mod seo;
mod types;

pub use evaluator::evaluate;
pub use readability::{count_syllables, readability};
pub use seo::{seo_matches, unlisted_amenities};
pub use types::{
    Check, CheckResult, EvaluationReport, Grade, KeywordStats, ReadabilityMetrics,
};
