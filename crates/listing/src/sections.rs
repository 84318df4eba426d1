//! The seven output sections and the parser that recovers them from model text.
//!
//! One table drives the prompt contract, the parser and the evaluator, so the
//! order and the length limits cannot drift apart.

use listingsmith_common::{ListingSmithError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// One of the seven required HTML fragments, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Title,
    MetaDescription,
    H1,
    Description,
    KeyFeatures,
    Neighborhood,
    CallToAction,
}

/// Declared size constraint of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthLimit {
    /// At most this many characters
    MaxChars(usize),
    /// Between min and max characters, inclusive
    CharRange(usize, usize),
    /// Between min and max list items, inclusive
    Items(usize, usize),
    Unbounded,
}

impl Section {
    /// All sections in output order
    pub const ALL: [Section; 7] = [
        Section::Title,
        Section::MetaDescription,
        Section::H1,
        Section::Description,
        Section::KeyFeatures,
        Section::Neighborhood,
        Section::CallToAction,
    ];

    /// Snake-case name used in errors and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::MetaDescription => "meta_description",
            Self::H1 => "h1",
            Self::Description => "description",
            Self::KeyFeatures => "key_features",
            Self::Neighborhood => "neighborhood",
            Self::CallToAction => "call_to_action",
        }
    }

    /// Human label, also accepted as a leading marker in untagged output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::MetaDescription => "Meta description",
            Self::H1 => "H1",
            Self::Description => "Description",
            Self::KeyFeatures => "Key features",
            Self::Neighborhood => "Neighborhood",
            Self::CallToAction => "Call to action",
        }
    }

    pub fn limit(&self) -> LengthLimit {
        match self {
            Self::Title => LengthLimit::MaxChars(60),
            Self::MetaDescription => LengthLimit::MaxChars(155),
            Self::Description => LengthLimit::CharRange(500, 700),
            Self::KeyFeatures => LengthLimit::Items(3, 5),
            Self::H1 | Self::Neighborhood | Self::CallToAction => LengthLimit::Unbounded,
        }
    }

    /// Wrap inner content in this section's HTML element
    pub fn wrap(&self, content: &str) -> String {
        match self {
            Self::Title => format!("<title>{}</title>", content),
            Self::MetaDescription => format!(
                r#"<meta name="description" content="{}">"#,
                content.replace('"', "&quot;")
            ),
            Self::H1 => format!("<h1>{}</h1>", content),
            Self::Description => format!(r#"<section id="description">{}</section>"#, content),
            Self::KeyFeatures => format!(r#"<ul id="key-features">{}</ul>"#, content),
            Self::Neighborhood => format!(r#"<section id="neighborhood">{}</section>"#, content),
            Self::CallToAction => format!(r#"<p class="call-to-action">{}</p>"#, content),
        }
    }

    fn pattern(&self) -> &'static Regex {
        &SECTION_PATTERNS[*self as usize]
    }

    /// Inner content of this section's first wrapper in `text`
    fn capture(&self, text: &str) -> Option<String> {
        match self {
            Self::MetaDescription => self
                .pattern()
                .captures_iter(text)
                .find_map(|c| meta_description_content(&c[1])),
            _ => self
                .pattern()
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

static SECTION_PATTERNS: LazyLock<[Regex; 7]> = LazyLock::new(|| {
    [
        r"(?is)<title(?:\s[^>]*)?>(.*?)</title>",
        // attributes of any <meta> tag; the description one is picked afterwards
        r"(?is)<meta\s([^>]*)>",
        r"(?is)<h1(?:\s[^>]*)?>(.*?)</h1>",
        r#"(?is)<section\s+id\s*=\s*"description"\s*>(.*?)</section>"#,
        r#"(?is)<ul\s+id\s*=\s*"key-features"\s*>(.*?)</ul>"#,
        r#"(?is)<section\s+id\s*=\s*"neighbou?rhood"\s*>(.*?)</section>"#,
        r#"(?is)<p\s+class\s*=\s*"call-to-action"\s*>(.*?)</p>"#,
    ]
    .map(|p| Regex::new(p).expect("section pattern"))
});

static META_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']description["']"#).expect("meta name pattern")
});
// Greedy: runs to the last quote, so stray inner quotes stay in the content
static META_CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*"(.*)""#).expect("meta content pattern")
});

/// Content of a description meta tag, whatever the attribute order
fn meta_description_content(attrs: &str) -> Option<String> {
    if !META_NAME_RE.is_match(attrs) {
        return None;
    }

    let rest = META_NAME_RE.replace(attrs, "");
    let rest = rest.trim_end().trim_end_matches('/');
    META_CONTENT_RE
        .captures(rest)
        .map(|c| c[1].trim().to_string())
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li[\s>]").expect("list item pattern"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("bullet pattern"));
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#+\s*)?(?:\d+[.)]\s*)?\**\s*(?:title|meta[ _-]?description|h1|heading|description|key[ _-]?features|neighbou?rhood|call[ _-]?to[ _-]?action)\s*\**\s*(?::\s*\**\s*|$)",
    )
    .expect("label pattern")
});

/// Remove HTML tags and surrounding whitespace
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").trim().to_string()
}

/// Character count of the visible text
pub fn visible_len(html: &str) -> usize {
    strip_tags(html).chars().count()
}

/// How the sections were recovered from the raw response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SplitMode {
    /// Every section came from its explicit HTML wrapper
    Tagged,
    /// No wrappers found; sections were assigned by position
    Ordinal {
        /// Blocks beyond seven that were folded into the last section
        surplus_blocks: usize,
    },
}

impl SplitMode {
    pub fn is_confident(&self) -> bool {
        matches!(self, Self::Tagged)
    }
}

/// One section's inner content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub section: Section,
    /// Inner HTML; for key features this is the `<li>` list
    pub content: String,
}

impl Fragment {
    /// Visible characters
    pub fn char_count(&self) -> usize {
        visible_len(&self.content)
    }

    /// Number of `<li>` items
    pub fn item_count(&self) -> usize {
        LIST_ITEM_RE.find_iter(&self.content).count()
    }

    /// Whether the fragment exceeds a declared ceiling
    pub fn over_limit(&self) -> bool {
        match self.section.limit() {
            LengthLimit::MaxChars(max) | LengthLimit::CharRange(_, max) => self.char_count() > max,
            LengthLimit::Items(_, max) => self.item_count() > max,
            LengthLimit::Unbounded => false,
        }
    }

    /// Wrapped HTML element
    pub fn to_html(&self) -> String {
        self.section.wrap(&self.content)
    }
}

/// The seven generated fragments, always complete and in output order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    fragments: Vec<Fragment>,
    split: SplitMode,
}

impl GeneratedContent {
    /// Build from content in [`Section::ALL`] order
    pub fn new(contents: [String; 7], split: SplitMode) -> Self {
        let fragments = Section::ALL
            .into_iter()
            .zip(contents)
            .map(|(section, content)| Fragment { section, content })
            .collect();

        Self { fragments, split }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn get(&self, section: Section) -> &Fragment {
        &self.fragments[section as usize]
    }

    /// Inner content of a section
    pub fn text(&self, section: Section) -> &str {
        &self.get(section).content
    }

    pub fn split(&self) -> SplitMode {
        self.split
    }

    /// Sections exceeding their declared ceiling
    pub fn over_limit(&self) -> Vec<Section> {
        self.fragments
            .iter()
            .filter(|f| f.over_limit())
            .map(|f| f.section)
            .collect()
    }

    /// New content with title and meta description cut to their ceilings
    ///
    /// Cuts happen at a word boundary when one exists. Other sections are
    /// carried over unchanged.
    pub fn truncated(&self) -> Self {
        let fragments = self
            .fragments
            .iter()
            .map(|fragment| match fragment.section.limit() {
                LengthLimit::MaxChars(max) if fragment.char_count() > max => {
                    let cut = truncate_at_word(&strip_tags(&fragment.content), max);
                    debug!(
                        "Truncated {} from {} to {} chars",
                        fragment.section,
                        fragment.char_count(),
                        cut.chars().count()
                    );
                    Fragment {
                        section: fragment.section,
                        content: cut,
                    }
                }
                _ => fragment.clone(),
            })
            .collect();

        Self {
            fragments,
            split: self.split,
        }
    }
}

fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let hard: String = text.chars().take(max_chars).collect();
    let cut = match hard.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &hard[..idx],
        _ => hard.as_str(),
    };

    cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}

/// Split raw model output into the seven sections
///
/// Explicit HTML wrappers win whenever at least one is present. Without any
/// wrapper the text is split into blocks and assigned by position, which is a
/// best-effort heuristic recorded as [`SplitMode::Ordinal`].
pub fn parse_sections(raw: &str) -> Result<GeneratedContent> {
    let text = strip_code_fences(raw);

    let tagged: Vec<Option<String>> = Section::ALL
        .iter()
        .map(|section| section.capture(&text))
        .collect();

    if tagged.iter().any(Option::is_some) {
        let missing: Vec<&str> = Section::ALL
            .iter()
            .zip(&tagged)
            .filter(|(_, content)| content.as_deref().map_or(true, str::is_empty))
            .map(|(section, _)| section.name())
            .collect();

        if !missing.is_empty() {
            warn!("Model output is missing tagged sections: {}", missing.join(", "));
            return Err(ListingSmithError::incomplete(missing));
        }

        let contents: Vec<String> = tagged.into_iter().flatten().collect();
        let contents: [String; 7] = contents
            .try_into()
            .map_err(|_| anyhow::anyhow!("section count mismatch"))?;

        debug!("Parsed 7 tagged sections");
        return Ok(GeneratedContent::new(contents, SplitMode::Tagged));
    }

    parse_ordinal(&text)
}

fn parse_ordinal(text: &str) -> Result<GeneratedContent> {
    let mut blocks = split_blocks(text);

    if blocks.len() < Section::ALL.len() {
        let missing: Vec<&str> = Section::ALL[blocks.len()..].iter().map(|s| s.name()).collect();
        warn!(
            "Untagged model output has {} block(s), expected 7",
            blocks.len()
        );
        return Err(ListingSmithError::incomplete(missing));
    }

    let surplus_blocks = blocks.len() - Section::ALL.len();
    if surplus_blocks > 0 {
        let tail = blocks.split_off(Section::ALL.len());
        if let Some(last) = blocks.last_mut() {
            for block in tail {
                last.push_str("\n\n");
                last.push_str(&block);
            }
        }
    }

    let contents: Vec<String> = Section::ALL
        .iter()
        .zip(blocks)
        .map(|(section, block)| {
            let block = strip_label(&block);
            match section {
                Section::KeyFeatures => bullets_to_items(&block),
                _ => block,
            }
        })
        .collect();

    let contents: [String; 7] = contents
        .try_into()
        .map_err(|_| anyhow::anyhow!("section count mismatch"))?;

    warn!(
        "Sections assigned by position ({} surplus block(s)); verify section boundaries",
        surplus_blocks
    );
    Ok(GeneratedContent::new(
        contents,
        SplitMode::Ordinal { surplus_blocks },
    ))
}

fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Blank-line separated blocks; consecutive bullet-only blocks merge into one list
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut previous_was_list = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut current, &mut blocks, &mut previous_was_list);
        } else {
            current.push(line.trim_end());
        }
    }
    flush_block(&mut current, &mut blocks, &mut previous_was_list);

    blocks
}

fn flush_block(lines: &mut Vec<&str>, blocks: &mut Vec<String>, previous_was_list: &mut bool) {
    if lines.is_empty() {
        return;
    }

    let is_list = lines.iter().all(|l| BULLET_RE.is_match(l));
    let block = lines.join("\n");
    match blocks.last_mut() {
        Some(last) if is_list && *previous_was_list => {
            last.push('\n');
            last.push_str(&block);
        }
        _ => blocks.push(block),
    }

    *previous_was_list = is_list;
    lines.clear();
}

/// Drop a leading "Title:" / "1." / "## Key features" marker
fn strip_label(block: &str) -> String {
    let mut lines = block.lines();
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let stripped_first = match LABEL_RE.find(first) {
        Some(m) => first[m.end()..].trim().to_string(),
        None => first.trim().to_string(),
    };

    let mut out = Vec::with_capacity(rest.len() + 1);
    if !stripped_first.is_empty() {
        out.push(stripped_first);
    }
    out.extend(rest.iter().map(|l| l.trim().to_string()));
    out.join("\n")
}

fn bullets_to_items(block: &str) -> String {
    block
        .lines()
        .map(|line| BULLET_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{}</li>", line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn tagged_response() -> String {
        [
            "<title>Charming 2-Bedroom Apartment for Sale in Alfama, Lisbon</title>",
            r#"<meta name="description" content="Discover this 85 m² 2-bedroom apartment for sale in Alfama, Lisbon.">"#,
            "<h1>2-Bedroom Apartment in Alfama</h1>",
            r#"<section id="description">A bright home in the heart of Alfama.</section>"#,
            r#"<ul id="key-features"><li>2 bedrooms</li><li>85 m²</li><li>Alfama</li></ul>"#,
            r#"<section id="neighborhood">Alfama is Lisbon's oldest district.</section>"#,
            r#"<p class="call-to-action">Book a viewing today.</p>"#,
        ]
        .join("\n")
    }

    #[test]
    fn test_section_order_and_names() {
        let names: Vec<&str> = Section::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "meta_description",
                "h1",
                "description",
                "key_features",
                "neighborhood",
                "call_to_action"
            ]
        );
    }

    #[test]
    fn test_wrap_matches_expected_markup() {
        assert_eq!(Section::Title.wrap("Test content"), "<title>Test content</title>");
        assert_eq!(
            Section::MetaDescription.wrap("Test content"),
            r#"<meta name="description" content="Test content">"#
        );
        assert_eq!(
            Section::Description.wrap("Test content"),
            r#"<section id="description">Test content</section>"#
        );
        assert_eq!(
            Section::MetaDescription.wrap(r#"The "best" flat"#),
            r#"<meta name="description" content="The &quot;best&quot; flat">"#
        );
    }

    #[test]
    fn test_parse_tagged_sections_in_order() {
        let content = parse_sections(&tagged_response()).unwrap();

        assert_eq!(content.split(), SplitMode::Tagged);
        assert_eq!(content.fragments().len(), 7);
        for (fragment, section) in content.fragments().iter().zip(Section::ALL) {
            assert_eq!(fragment.section, section);
            assert!(!fragment.content.is_empty());
        }
        assert_eq!(
            content.text(Section::Title),
            "Charming 2-Bedroom Apartment for Sale in Alfama, Lisbon"
        );
        assert_eq!(content.get(Section::KeyFeatures).item_count(), 3);
    }

    #[test]
    fn test_tagged_sections_out_of_order_are_reordered() {
        let mut lines: Vec<String> = tagged_response().lines().map(String::from).collect();
        lines.reverse();
        let content = parse_sections(&lines.join("\n")).unwrap();
        assert_eq!(content.text(Section::H1), "2-Bedroom Apartment in Alfama");
        assert_eq!(content.fragments()[0].section, Section::Title);
    }

    #[test]
    fn test_missing_tagged_section_is_named() {
        let raw: String = tagged_response()
            .lines()
            .filter(|l| !l.starts_with("<h1>"))
            .collect::<Vec<_>>()
            .join("\n");

        let err = parse_sections(&raw).unwrap_err();
        assert_matches!(
            err,
            ListingSmithError::IncompleteGeneration { ref missing } if missing == &vec!["h1".to_string()]
        );
    }

    #[test]
    fn test_meta_description_with_inner_quotes() {
        let raw = tagged_response().replace(
            "Discover this 85 m²",
            r#"Discover this "charming" 85 m²"#,
        );

        let content = parse_sections(&raw).unwrap();
        let meta = content.get(Section::MetaDescription);

        assert!(meta.content.starts_with(r#"Discover this "charming" 85 m²"#));
        assert!(meta.to_html().contains("this &quot;charming&quot; 85"));
    }

    #[test]
    fn test_meta_description_attribute_order() {
        let raw = tagged_response().replace(
            r#"<meta name="description" content="Discover this 85 m² 2-bedroom apartment for sale in Alfama, Lisbon.">"#,
            r#"<meta content="Discover this 85 m² apartment in Alfama." name='description' />"#,
        );

        let content = parse_sections(&raw).unwrap();
        assert_eq!(
            content.text(Section::MetaDescription),
            "Discover this 85 m² apartment in Alfama."
        );
    }

    #[test]
    fn test_other_meta_tags_are_skipped() {
        let raw = format!(
            "<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width\">\n{}",
            tagged_response()
        );

        let content = parse_sections(&raw).unwrap();
        assert!(content.text(Section::MetaDescription).starts_with("Discover this 85"));
    }

    #[test]
    fn test_title_and_h1_with_attributes() {
        let raw = tagged_response()
            .replace("<h1>", r#"<h1 class="hero">"#)
            .replace("<title>", r#"<title lang="en">"#);

        let content = parse_sections(&raw).unwrap();
        assert_eq!(content.text(Section::H1), "2-Bedroom Apartment in Alfama");
        assert!(content.text(Section::Title).starts_with("Charming"));
    }

    #[test]
    fn test_code_fences_are_ignored() {
        let raw = format!("```html\n{}\n```", tagged_response());
        assert!(parse_sections(&raw).is_ok());
    }

    #[test]
    fn test_ordinal_fallback() {
        let raw = "Title: Sunny Flat in Alfama\n\n\
                   Meta description: A sunny flat for sale in Alfama.\n\n\
                   Sunny Flat in Alfama, Lisbon\n\n\
                   A long description paragraph.\n\n\
                   - 2 bedrooms\n- 85 m²\n\n- Quiet street\n\n\
                   Alfama is full of history.\n\n\
                   Call to action: Contact us today.";

        let content = parse_sections(raw).unwrap();

        assert_eq!(content.split(), SplitMode::Ordinal { surplus_blocks: 0 });
        assert!(!content.split().is_confident());
        assert_eq!(content.text(Section::Title), "Sunny Flat in Alfama");
        assert_eq!(content.text(Section::MetaDescription), "A sunny flat for sale in Alfama.");
        assert_eq!(
            content.text(Section::KeyFeatures),
            "<li>2 bedrooms</li><li>85 m²</li><li>Quiet street</li>"
        );
        assert_eq!(content.text(Section::CallToAction), "Contact us today.");
    }

    #[test]
    fn test_ordinal_short_output_names_missing_tail() {
        let raw = "One\n\nTwo\n\nThree\n\nFour\n\nFive";
        let err = parse_sections(raw).unwrap_err();
        assert_matches!(
            err,
            ListingSmithError::IncompleteGeneration { ref missing }
                if missing == &vec!["neighborhood".to_string(), "call_to_action".to_string()]
        );
    }

    #[test]
    fn test_ordinal_surplus_is_folded_into_last_section() {
        let raw = "1\n\n2\n\n3\n\n4\n\n- a\n\n6\n\n7\n\n8";
        let content = parse_sections(raw).unwrap();
        assert_eq!(content.split(), SplitMode::Ordinal { surplus_blocks: 1 });
        assert_eq!(content.text(Section::CallToAction), "7\n\n8");
    }

    #[test]
    fn test_empty_response_is_incomplete() {
        let err = parse_sections("   \n").unwrap_err();
        assert_matches!(err, ListingSmithError::IncompleteGeneration { ref missing } if missing.len() == 7);
    }

    #[test]
    fn test_limits_and_truncation() {
        let long_title = "Spacious and bright two bedroom apartment for sale in the heart of Alfama";
        assert!(long_title.chars().count() > 60);

        let mut contents: [String; 7] = Default::default();
        contents[0] = long_title.to_string();
        contents[1] = "Short meta".to_string();
        let content = GeneratedContent::new(contents, SplitMode::Tagged);

        assert_eq!(content.over_limit(), vec![Section::Title]);

        let truncated = content.truncated();
        let title = truncated.text(Section::Title);
        assert!(title.chars().count() <= 60);
        assert!(long_title.starts_with(title));
        assert!(!title.ends_with(' '));
        assert_eq!(truncated.text(Section::MetaDescription), "Short meta");
        // original is untouched
        assert_eq!(content.text(Section::Title), long_title);
    }

    #[test]
    fn test_visible_len_counts_characters_not_bytes() {
        assert_eq!(visible_len("<b>São</b> Jorge "), 9);
    }
}
