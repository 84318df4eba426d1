//! ListingSmith listing model
//!
//! Input validation, prompt composition, section parsing and HTML rendering

pub mod prompt;
pub mod render;
pub mod sections;
pub mod types;
pub mod validate;

// Re-export main types
pub use prompt::{compose_prompt, Prompt, SYSTEM_PROMPT};
pub use render::{escape_html, render_document, render_fragment, to_ascii_safe};
pub use sections::{
    parse_sections, strip_tags, visible_len, Fragment, GeneratedContent, LengthLimit, Section,
    SplitMode,
};
pub use types::{Features, Language, Location, PropertyListing, Tone};
pub use validate::{parse_listing, validate_listing};
