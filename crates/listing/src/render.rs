use crate::sections::{GeneratedContent, Section};
use crate::types::PropertyListing;

/// Replacement table for `to_ascii_safe`
#[rustfmt::skip]
const ASCII_REPLACEMENTS: &[(char, &str)] = &[
    // Portuguese & Spanish characters
    ('ã', "a~"), ('á', "a"), ('à', "a"), ('â', "a"), ('ç', "c"), ('é', "e"), ('ê', "e"),
    ('è', "e"), ('í', "i"), ('ó', "o"), ('ô', "o"), ('õ', "o~"), ('ú', "u"), ('ü', "u"),
    ('ñ', "n~"),
    // Uppercase
    ('Ã', "A~"), ('Á', "A"), ('À', "A"), ('Â', "A"), ('Ç', "C"), ('É', "E"), ('Ê', "E"),
    ('È', "E"), ('Í', "I"), ('Ó', "O"), ('Ô', "O"), ('Õ', "O~"), ('Ú', "U"), ('Ü', "U"),
    ('Ñ', "N~"),
    // Symbols
    ('²', "2"), ('³', "3"), ('€', "EUR"), ('º', "o"), ('ª', "a"), ('¿', "?"), ('¡', "!"),
];

/// The seven wrapped fragments, one per line, in fixed order
pub fn render_fragment(content: &GeneratedContent) -> String {
    content
        .fragments()
        .iter()
        .map(|f| f.to_html())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A minimal standalone HTML document
///
/// Title and meta description live in `<head>`, the other five sections in
/// `<body>`.
pub fn render_document(content: &GeneratedContent, listing: &PropertyListing) -> String {
    let head_sections = [Section::Title, Section::MetaDescription];

    let head: Vec<String> = head_sections
        .iter()
        .map(|s| format!("    {}", content.get(*s).to_html()))
        .collect();
    let body: Vec<String> = content
        .fragments()
        .iter()
        .filter(|f| !head_sections.contains(&f.section))
        .map(|f| format!("    {}", f.to_html()))
        .collect();

    let place = format!(
        "{}, {}",
        listing.location.neighborhood, listing.location.city
    );

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n    \
         <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <meta name=\"geo.placename\" content=\"{place}\">\n\
         {head}\n\
         </head>\n\
         <body>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        lang = listing.language.code(),
        place = escape_html(&place),
        head = head.join("\n"),
        body = body.join("\n"),
    )
}

/// Escape a literal value for HTML text or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Transliterate to pure ASCII for terminals with encoding issues
///
/// Known accented letters and symbols use the replacement table; any other
/// non-ASCII character becomes `?`.
pub fn to_ascii_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some((_, replacement)) = ASCII_REPLACEMENTS.iter().find(|(k, _)| *k == c) {
            out.push_str(replacement);
        } else {
            out.push('?');
        }
    }
    out
}
