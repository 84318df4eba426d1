/// Typographic characters that break some terminals, with ASCII replacements
///
/// Accented letters are left alone; only punctuation-like characters change.
const TYPOGRAPHIC_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),   // left single quotation mark
    ('\u{2019}', "'"),   // right single quotation mark
    ('\u{201c}', "\""),  // left double quotation mark
    ('\u{201d}', "\""),  // right double quotation mark
    ('\u{2013}', "-"),   // en dash
    ('\u{2014}', "-"),   // em dash
    ('\u{2026}', "..."), // horizontal ellipsis
    ('\u{00a0}', " "),   // non-breaking space
    ('\u{20ac}', "EUR"), // euro sign
];

/// Normalize model output: trim, then replace typographic characters
pub fn normalize_text(text: &str) -> String {
    let text = text.trim();
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match TYPOGRAPHIC_REPLACEMENTS.iter().find(|(k, _)| *k == c) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(c),
        }
    }

    out
}
