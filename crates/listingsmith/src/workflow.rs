use listingsmith_common::Result;
use listingsmith_eval::{evaluate, EvaluationReport};
use listingsmith_listing::{
    compose_prompt, parse_sections, render_document, render_fragment, to_ascii_safe,
    GeneratedContent, PropertyListing, Section, SplitMode,
};
use listingsmith_llm::{complete_with_retry, CompletionClient, RetryPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Generation options, one set per invocation
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Wrap the fragments in a standalone HTML document
    pub document: bool,
    /// Transliterate the output to ASCII
    pub ascii_safe: bool,
    /// Run the quality evaluator
    pub evaluate: bool,
    /// Cut title and meta description to their ceilings
    pub truncate: bool,
    pub retry: RetryPolicy,
}

/// Generation result
#[derive(Debug)]
pub struct RunOutput {
    /// Final output text
    pub html: String,
    pub content: GeneratedContent,
    pub report: Option<EvaluationReport>,
    /// Sections still above their ceiling in the emitted content
    pub over_limit: Vec<Section>,
}

/// Runs the validate-compose-complete-parse pipeline for one listing
pub struct ListingGenerator {
    client: Arc<dyn CompletionClient>,
}

impl ListingGenerator {
    /// Create new generator
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Generate listing content for a validated listing
    pub async fn generate(
        &self,
        listing: &PropertyListing,
        options: &GenerationOptions,
    ) -> Result<RunOutput> {
        info!(
            "Generating listing: {}, {} ({}, tone: {}, model: {})",
            listing.location.neighborhood,
            listing.location.city,
            listing.language.code(),
            listing.tone.name(),
            self.client.model()
        );

        // Step 1: Prompt
        let prompt = compose_prompt(listing);
        debug!("Prompt composed - {} chars", prompt.user.len());

        // Step 2: Completion
        let raw = complete_with_retry(
            self.client.as_ref(),
            &prompt.system,
            &prompt.user,
            options.retry,
        )
        .await?;
        info!("Completion received - {} chars", raw.len());

        // Step 3: Sections
        let mut content = parse_sections(&raw)?;

        if options.truncate {
            content = content.truncated();
        }

        let over_limit = content.over_limit();
        if !over_limit.is_empty() {
            let names: Vec<&str> = over_limit.iter().map(|s| s.name()).collect();
            warn!("Section(s) over their length ceiling: {}", names.join(", "));
        }

        // Step 4: Evaluation
        let report = options.evaluate.then(|| evaluate(&content, listing));

        // Step 5: Rendering
        let mut html = if options.document {
            render_document(&content, listing)
        } else {
            render_fragment(&content)
        };
        if options.ascii_safe {
            html = to_ascii_safe(&html);
        }

        Ok(RunOutput {
            html,
            content,
            report,
            over_limit,
        })
    }
}

/// Score previously generated HTML against its source listing
///
/// Accepts either the seven-fragment output or a full document; the
/// sections are recovered the same way as from a completion.
pub fn evaluate_html(html: &str, listing: &PropertyListing) -> Result<EvaluationReport> {
    info!(
        "Evaluating existing content: {} chars ({})",
        html.len(),
        listing.language.code()
    );

    let content = parse_sections(html)?;
    if content.split() != SplitMode::Tagged {
        warn!("Section wrappers not found; sections were assigned by position");
    }

    Ok(evaluate(&content, listing))
}
