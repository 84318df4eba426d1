//! Keyword heuristics: per-language SEO phrases and amenity mentions

use listingsmith_listing::{Features, Language};
use regex::Regex;
use std::sync::LazyLock;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("seo pattern"))
        .collect()
}

static SEO_EN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"apartment for sale",
        r"property (?:for sale )?in \w+",
        r"\d+-bedroom",
        r"real estate",
    ])
});

static SEO_PT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"apartamento(?: T\d+)? à venda",
        r"\bT\d+\b",
        r"imóvel em \w+",
        r"propriedade",
    ])
});

static SEO_ES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"apartamento en venta",
        r"propiedad en \w+",
        r"apartamento de \d+ dormitorios?",
        r"inmueble",
        r"piso en venta",
    ])
});

/// Number of SEO phrase occurrences for the language
pub fn seo_matches(text: &str, language: Language) -> usize {
    let patterns = match language {
        Language::En => &*SEO_EN,
        Language::Pt => &*SEO_PT,
        Language::Es => &*SEO_ES,
    };

    patterns.iter().map(|re| re.find_iter(text).count()).sum()
}

/// An amenity the model might mention, with its listing field
pub struct Amenity {
    pub name: &'static str,
    pattern: Regex,
    field: fn(&Features) -> Option<bool>,
}

impl Amenity {
    /// Whether the listing states this amenity as present
    pub fn is_listed(&self, features: &Features) -> bool {
        (self.field)(features) == Some(true)
    }

    pub fn is_mentioned(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn amenity(
    name: &'static str,
    words: &[&str],
    field: fn(&Features) -> Option<bool>,
) -> Amenity {
    let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
    Amenity {
        name,
        pattern: Regex::new(&pattern).expect("amenity pattern"),
        field,
    }
}

/// Amenities checked for unlisted mentions, with en/pt/es synonyms
pub static AMENITIES: LazyLock<Vec<Amenity>> = LazyLock::new(|| {
    vec![
        amenity(
            "balcony",
            &["balcony", "balconies", "varandas?", "balc[oó]n", "balcones"],
            |f| f.balcony,
        ),
        amenity(
            "elevator",
            &["elevators?", "lifts?", "elevador(?:es)?", "ascensor(?:es)?"],
            |f| f.elevator,
        ),
        amenity(
            "parking",
            &[
                "parking",
                "garages?",
                "estacionamento",
                "garage[mn]s?",
                "aparcamiento",
                "garaje",
            ],
            |f| f.parking,
        ),
        amenity(
            "garden",
            &["gardens?", "jardi[mn]s?", "jardín", "jardines"],
            |f| f.garden,
        ),
        amenity(
            "furnished",
            &["furnished", "mobilado", "mobiliado", "amueblado"],
            |f| f.furnished,
        ),
        amenity(
            "pool",
            &["pool", "swimming pool", "piscinas?"],
            |_| None,
        ),
    ]
});

/// Amenities mentioned in the text but not listed as present
pub fn unlisted_amenities(text: &str, features: &Features) -> Vec<&'static str> {
    AMENITIES
        .iter()
        .filter(|a| a.is_mentioned(text) && !a.is_listed(features))
        .map(|a| a.name)
        .collect()
}
