//! Prompt composition
//!
//! A pure, deterministic formatter from a validated listing to the
//! instructions sent to the model. The output contract is generated from the
//! section table so the parser and the prompt always agree.

use std::fmt::Write;

use crate::sections::{LengthLimit, Section};
use crate::types::{Language, PropertyListing, Tone};

/// System message shared by every request
pub const SYSTEM_PROMPT: &str = "You are an expert real estate copywriter and SEO specialist. \
    You write accurate, persuasive property listings. \
    You only state facts that appear in the property data you are given. \
    You respond with HTML only, without markdown code fences, explanations or apologies.";

const NOT_SPECIFIED: &str = "not specified";

/// The composed request for one listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt for a validated listing
pub fn compose_prompt(listing: &PropertyListing) -> Prompt {
    let mut user = String::new();

    let _ = writeln!(
        user,
        "Write SEO-optimized real estate listing content in {} ({}) for the property below.",
        listing.language.display_name(),
        listing.language.code()
    );
    user.push('\n');

    user.push_str("PROPERTY DATA (the only facts you may use):\n");
    user.push_str(&facts_block(listing));
    user.push('\n');

    let _ = writeln!(user, "TONE: {} - {}", listing.tone.name(), tone_guidance(listing.tone));
    user.push('\n');

    user.push_str(
        "OUTPUT FORMAT: respond with exactly these 7 HTML elements, in this order, \
         each starting on a new line, and nothing else:\n",
    );
    for (i, section) in Section::ALL.iter().enumerate() {
        let _ = writeln!(
            user,
            "{}. {}: {} - {}",
            i + 1,
            section.label(),
            section.wrap("..."),
            section_rule(*section)
        );
    }
    user.push('\n');

    user.push_str("RULES:\n");
    user.push_str(
        "- Use only the property data above. Never invent rooms, amenities, views, \
         distances, prices or dates.\n",
    );
    user.push_str(&format!(
        "- A fact marked \"{NOT_SPECIFIED}\" is unknown: do not mention it at all, \
         neither as present nor as absent.\n"
    ));
    user.push_str("- Mention the neighborhood and the city in the title and in the description.\n");
    user.push_str("- Respect every character limit; count characters of visible text only.\n");
    user.push_str("- Do not use markdown, code fences or any text outside the 7 elements.\n");
    user.push('\n');

    user.push_str("LANGUAGE CONVENTIONS:\n");
    user.push_str(&language_conventions(listing));

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn facts_block(listing: &PropertyListing) -> String {
    let location = &listing.location;
    let features = &listing.features;

    let rows: Vec<(&str, String)> = vec![
        ("Neighborhood", location.neighborhood.clone()),
        ("City", location.city.clone()),
        ("Region", text_or_unknown(location.region.as_deref())),
        ("Country", location.country.clone()),
        ("Bedrooms", format!("{} bedroom(s)", features.bedrooms)),
        (
            "Bathrooms",
            features
                .bathrooms
                .map(|n| format!("{} bathroom(s)", n))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        ),
        ("Area", format!("{} m²", features.area)),
        ("Price", listing.price.to_string()),
        ("Balcony", flag(features.balcony)),
        ("Elevator", flag(features.elevator)),
        ("Parking", flag(features.parking)),
        ("Garden", flag(features.garden)),
        ("Furnished", flag(features.furnished)),
        (
            "Year built",
            features
                .year_built
                .map(|y| y.to_string())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        ),
    ];

    rows.into_iter()
        .map(|(label, value)| format!("- {}: {}\n", label, value))
        .collect()
}

fn text_or_unknown(value: Option<&str>) -> String {
    value.unwrap_or(NOT_SPECIFIED).to_string()
}

fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => NOT_SPECIFIED.to_string(),
    }
}

fn section_rule(section: Section) -> String {
    let base = match section {
        Section::Title => "a compelling page title with the property type and location",
        Section::MetaDescription => "a search snippet that invites the click",
        Section::H1 => "the main on-page heading",
        Section::Description => "an engaging description in one or more paragraphs",
        Section::KeyFeatures => "the most relevant listed facts as <li> items",
        Section::Neighborhood => "what the area offers, without invented distances",
        Section::CallToAction => "one sentence inviting the reader to arrange a viewing",
    };

    match section.limit() {
        LengthLimit::MaxChars(max) => format!("{base}; at most {max} characters"),
        LengthLimit::CharRange(min, max) => format!("{base}; {min} to {max} characters"),
        LengthLimit::Items(min, max) => format!("{base}; {min} to {max} items"),
        LengthLimit::Unbounded => base.to_string(),
    }
}

fn tone_guidance(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "professional and precise, no exclamation marks",
        Tone::Friendly => "warm and welcoming, addressing the reader directly",
        Tone::Luxury => "refined and exclusive, emphasising quality and lifestyle",
        Tone::Investor => "factual and numbers-focused, emphasising value and location",
    }
}

fn language_conventions(listing: &PropertyListing) -> String {
    let bedrooms = listing.features.bedrooms;
    let city = &listing.location.city;
    let neighborhood = &listing.location.neighborhood;

    match listing.language {
        Language::En => format!(
            "- Write in English. Describe the layout as \"{bedrooms}-bedroom apartment\".\n\
             - Use SEO phrases such as \"apartment for sale in {city}\", \
             \"{bedrooms}-bedroom apartment in {neighborhood}\" and \"property for sale in {city}\".\n\
             - Write areas as \"m²\".\n"
        ),
        Language::Pt => format!(
            "- Write in European Portuguese (pt-PT), not Brazilian Portuguese.\n\
             - Use T-notation for the layout: \"T{bedrooms}\" (for example \"Apartamento T{bedrooms}\").\n\
             - Use SEO phrases such as \"apartamento T{bedrooms} à venda em {city}\" and \
             \"imóvel em {neighborhood}\".\n\
             - Write areas as \"m²\".\n"
        ),
        Language::Es => format!(
            "- Write in Spanish from Spain.\n\
             - Describe the layout as \"{bedrooms} dormitorios\" (\"1 dormitorio\" when there is one).\n\
             - Use SEO phrases such as \"piso en venta en {city}\", \
             \"apartamento de {bedrooms} dormitorios en {neighborhood}\" and \"propiedad en {city}\".\n\
             - Write areas as \"m²\".\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_listing;
    use serde_json::json;

    fn listing(language: &str) -> PropertyListing {
        validate_listing(&json!({
            "location": {"neighborhood": "Alfama", "city": "Lisbon", "country": "Portugal"},
            "features": {"bedrooms": 2, "area": 85, "balcony": false},
            "price": 320000,
            "language": language
        }))
        .unwrap()
    }

    #[test]
    fn test_prompt_embeds_listing_facts() {
        let prompt = compose_prompt(&listing("en"));

        for needle in ["Alfama", "Lisbon", "2 bedroom(s)", "85", "320000", "Portugal"] {
            assert!(prompt.user.contains(needle), "prompt is missing {needle}");
        }
        assert_eq!(prompt.system, SYSTEM_PROMPT);
    }

    #[test]
    fn test_unknown_fields_are_marked_not_specified() {
        let prompt = compose_prompt(&listing("en"));

        assert!(prompt.user.contains("- Balcony: no\n"));
        assert!(prompt.user.contains("- Elevator: not specified\n"));
        assert!(prompt.user.contains("- Bathrooms: not specified\n"));
        assert!(prompt.user.contains("- Region: not specified\n"));
    }

    #[test]
    fn test_output_contract_lists_sections_in_order() {
        let prompt = compose_prompt(&listing("en"));

        let positions: Vec<usize> = Section::ALL
            .iter()
            .map(|s| prompt.user.find(&s.wrap("...")).expect("section in prompt"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(prompt.user.contains("at most 60 characters"));
        assert!(prompt.user.contains("at most 155 characters"));
        assert!(prompt.user.contains("500 to 700 characters"));
        assert!(prompt.user.contains("3 to 5 items"));
    }

    #[test]
    fn test_language_conventions() {
        let pt = compose_prompt(&listing("pt"));
        assert!(pt.user.contains("\"T2\""));
        assert!(pt.user.contains("European Portuguese"));

        let es = compose_prompt(&listing("es"));
        assert!(es.user.contains("2 dormitorios"));

        let en = compose_prompt(&listing("en"));
        assert!(en.user.contains("2-bedroom apartment"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        assert_eq!(compose_prompt(&listing("es")), compose_prompt(&listing("es")));
    }
}
