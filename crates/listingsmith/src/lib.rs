//! ListingSmith
//!
//! Generates SEO-oriented real estate listing HTML from a JSON property
//! description: validate, compose the prompt, run one completion, split the
//! answer into seven sections, then optionally score it.

pub mod output;
pub mod workflow;

pub use output::{read_input, write_atomic, write_output, write_report};
pub use workflow::{evaluate_html, GenerationOptions, ListingGenerator, RunOutput};
