use listingsmith_listing::{
    strip_tags, GeneratedContent, Language, LengthLimit, PropertyListing, Section, SplitMode,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::readability::readability;
use crate::seo::{seo_matches, unlisted_amenities};
use crate::types::{Check, CheckResult, EvaluationReport, KeywordStats};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "meta", "input", "wbr"];

static ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*?(/?)>").expect("element pattern")
});

/// Score generated content against the source listing
///
/// Pure heuristics; the report annotates the output and never blocks it.
pub fn evaluate(content: &GeneratedContent, listing: &PropertyListing) -> EvaluationReport {
    let prose = format!(
        "{} {}",
        strip_tags(content.text(Section::Description)),
        strip_tags(content.text(Section::Neighborhood))
    );
    let metrics = readability(&prose, listing.language == Language::En);

    let visible = all_visible_text(content);
    let keywords = KeywordStats::new(
        seo_matches(&visible, listing.language),
        visible.split_whitespace().count(),
    );

    let checks = vec![
        max_chars_check(Check::TitleLength, content, Section::Title),
        max_chars_check(Check::MetaDescriptionLength, content, Section::MetaDescription),
        description_length(content),
        key_feature_count(content),
        location_keyword(content, listing),
        unlisted_features(content, listing),
        seo_keywords(keywords.keyword_count, listing),
        readability_check(metrics.flesch_reading_ease, metrics.total_words),
        split_confidence(content),
        html_balance(content),
    ];

    for result in &checks {
        debug!(
            "Check {}: {} ({:.2}) - {}",
            result.check,
            if result.passed { "pass" } else { "fail" },
            result.fraction,
            result.detail
        );
    }

    let report = EvaluationReport::from_checks(checks, metrics, keywords);
    info!(
        "Evaluation finished - Score: {}/100 ({}), {} check(s) failed",
        report.score,
        report.grade,
        report.failed().count()
    );

    report
}

fn max_chars(section: Section) -> usize {
    match section.limit() {
        LengthLimit::MaxChars(max) | LengthLimit::CharRange(_, max) => max,
        _ => usize::MAX,
    }
}

/// 1 within the limit, then loses the overflow share of the limit
fn overflow_fraction(len: usize, max: usize) -> f64 {
    if len <= max {
        1.0
    } else {
        (1.0 - (len - max) as f64 / max as f64).max(0.0)
    }
}

fn max_chars_check(check: Check, content: &GeneratedContent, section: Section) -> CheckResult {
    let len = content.get(section).char_count();
    let max = max_chars(section);

    CheckResult::new(
        check,
        len <= max,
        overflow_fraction(len, max),
        format!("{}/{} chars", len, max),
    )
}

fn description_length(content: &GeneratedContent) -> CheckResult {
    let len = content.get(Section::Description).char_count();
    let (min, max) = match Section::Description.limit() {
        LengthLimit::CharRange(min, max) => (min, max),
        _ => (0, usize::MAX),
    };

    let fraction = if len < min {
        len as f64 / min as f64
    } else {
        overflow_fraction(len, max)
    };

    CheckResult::new(
        Check::DescriptionLength,
        (min..=max).contains(&len),
        fraction,
        format!("{} chars (expected {}-{})", len, min, max),
    )
}

fn key_feature_count(content: &GeneratedContent) -> CheckResult {
    let count = content.get(Section::KeyFeatures).item_count();
    let (min, max) = match Section::KeyFeatures.limit() {
        LengthLimit::Items(min, max) => (min, max),
        _ => (0, usize::MAX),
    };

    let distance = if count < min {
        min - count
    } else {
        count.saturating_sub(max)
    };

    CheckResult::new(
        Check::KeyFeatureCount,
        distance == 0,
        1.0 - 0.25 * distance as f64,
        format!("{} item(s) (expected {}-{})", count, min, max),
    )
}

fn location_keyword(content: &GeneratedContent, listing: &PropertyListing) -> CheckResult {
    let haystack = format!(
        "{} {}",
        strip_tags(content.text(Section::Title)),
        strip_tags(content.text(Section::Description))
    )
    .to_lowercase();

    let found: Vec<&str> = listing
        .location_keywords()
        .into_iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .collect();

    if found.is_empty() {
        CheckResult::new(
            Check::LocationKeyword,
            false,
            0.0,
            format!(
                "none of {} in title or description",
                listing.location_keywords().join(", ")
            ),
        )
    } else {
        CheckResult::new(
            Check::LocationKeyword,
            true,
            1.0,
            format!("found {}", found.join(", ")),
        )
    }
}

fn unlisted_features(content: &GeneratedContent, listing: &PropertyListing) -> CheckResult {
    let text = all_visible_text(content);
    let findings = unlisted_amenities(&text, &listing.features);

    let detail = if findings.is_empty() {
        "no unlisted amenities mentioned".to_string()
    } else {
        format!("mentions unlisted: {}", findings.join(", "))
    };

    CheckResult::new(
        Check::UnlistedFeatures,
        findings.is_empty(),
        1.0 - findings.len() as f64 / 3.0,
        detail,
    )
}

fn seo_keywords(matches: usize, listing: &PropertyListing) -> CheckResult {
    CheckResult::new(
        Check::SeoKeywords,
        matches > 0,
        0.2 * matches as f64,
        format!("{} {} SEO phrase(s)", matches, listing.language.code()),
    )
}

fn readability_check(flesch: f64, words: usize) -> CheckResult {
    let fraction = if flesch >= 60.0 {
        1.0
    } else if flesch >= 30.0 {
        2.0 / 3.0
    } else {
        1.0 / 3.0
    };

    CheckResult::new(
        Check::Readability,
        flesch >= 30.0,
        fraction,
        format!("Flesch {:.1} over {} words", flesch, words),
    )
}

fn split_confidence(content: &GeneratedContent) -> CheckResult {
    match content.split() {
        SplitMode::Tagged => CheckResult::new(
            Check::SplitConfidence,
            true,
            1.0,
            "sections recovered from HTML wrappers",
        ),
        SplitMode::Ordinal { surplus_blocks } => CheckResult::new(
            Check::SplitConfidence,
            false,
            0.0,
            format!(
                "sections assigned by position ({} surplus block(s)); boundaries may be wrong",
                surplus_blocks
            ),
        ),
    }
}

fn html_balance(content: &GeneratedContent) -> CheckResult {
    let unbalanced: Vec<&str> = content
        .fragments()
        .iter()
        .filter(|f| !is_balanced(&f.content))
        .map(|f| f.section.name())
        .collect();

    if unbalanced.is_empty() {
        CheckResult::new(Check::HtmlBalance, true, 1.0, "all inner markup balanced")
    } else {
        CheckResult::new(
            Check::HtmlBalance,
            false,
            0.0,
            format!("unbalanced tags in {}", unbalanced.join(", ")),
        )
    }
}

/// Every non-void open tag has a matching close tag
fn is_balanced(html: &str) -> bool {
    let mut depth: HashMap<String, i32> = HashMap::new();

    for caps in ELEMENT_RE.captures_iter(html) {
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();
        let name = caps[2].to_lowercase();

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            continue;
        }

        let entry = depth.entry(name).or_insert(0);
        *entry += if closing { -1 } else { 1 };
        if *entry < 0 {
            return false;
        }
    }

    depth.values().all(|d| *d == 0)
}

fn all_visible_text(content: &GeneratedContent) -> String {
    content
        .fragments()
        .iter()
        .map(|f| strip_tags(&f.content))
        .collect::<Vec<_>>()
        .join("\n")
}
