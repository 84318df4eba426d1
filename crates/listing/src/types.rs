use serde::{Deserialize, Serialize};

/// Output language of the generated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Pt,
    Es,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 3] = [Language::En, Language::Pt, Language::Es];

    /// Parse an ISO 639-1 code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "pt" => Some(Self::Pt),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// ISO 639-1 code, also used as the HTML `lang` attribute
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
            Self::Es => "es",
        }
    }

    /// Language name as written in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Pt => "European Portuguese",
            Self::Es => "Spanish (Spain)",
        }
    }
}

/// Writing tone requested for the copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    #[default]
    Friendly,
    Luxury,
    Investor,
}

impl Tone {
    /// All supported tones
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Friendly, Tone::Luxury, Tone::Investor];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "formal" => Some(Self::Formal),
            "friendly" => Some(Self::Friendly),
            "luxury" => Some(Self::Luxury),
            "investor" => Some(Self::Investor),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Friendly => "friendly",
            Self::Luxury => "luxury",
            Self::Investor => "investor",
        }
    }
}

/// Where the property is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub neighborhood: String,
    pub city: String,
    /// District or region, when given
    pub region: Option<String>,
    pub country: String,
}

/// Physical features of the property
///
/// Every `Option` is `None` when the input did not state the value. A `None`
/// is "not specified", never "no".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Always positive
    pub bedrooms: u32,
    pub bathrooms: Option<u32>,
    /// Square metres, always positive
    pub area: u32,
    pub balcony: Option<bool>,
    pub elevator: Option<bool>,
    pub parking: Option<bool>,
    pub year_built: Option<u32>,
    pub furnished: Option<bool>,
    pub garden: Option<bool>,
}

/// A validated property listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyListing {
    pub location: Location,
    pub features: Features,
    /// Asking price, always positive
    pub price: u64,
    pub language: Language,
    #[serde(default)]
    pub tone: Tone,
}

impl PropertyListing {
    /// Location names usable as SEO keywords, most specific first
    pub fn location_keywords(&self) -> Vec<&str> {
        let mut keywords = vec![self.location.neighborhood.as_str(), self.location.city.as_str()];
        if let Some(region) = &self.location.region {
            keywords.push(region.as_str());
        }
        keywords.retain(|k| !k.trim().is_empty());
        keywords
    }
}
