//! Input validation
//!
//! Turns untyped input JSON into a [`PropertyListing`]. Every failure names the
//! dotted key path that caused it.

use listingsmith_common::{ListingSmithError, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{Features, Language, Location, PropertyListing, Tone};

/// Top-level keys that must be present, checked in this order
pub const REQUIRED_KEYS: [&str; 4] = ["location", "features", "price", "language"];

/// Parse JSON text and validate it
pub fn parse_listing(text: &str) -> Result<PropertyListing> {
    let value: Value = serde_json::from_str(text)?;
    validate_listing(&value)
}

/// Validate parsed input JSON
pub fn validate_listing(value: &Value) -> Result<PropertyListing> {
    let root = value
        .as_object()
        .ok_or_else(|| ListingSmithError::validation("$", "must be a JSON object"))?;

    for key in REQUIRED_KEYS {
        if root.get(key).map_or(true, Value::is_null) {
            return Err(ListingSmithError::validation(key, "is required"));
        }
    }

    let language = parse_language(&root["language"])?;
    let location = parse_location(object_at(root, "location", "location")?)?;
    let features = parse_features(object_at(root, "features", "features")?)?;
    let price = positive(require_count(root, "price", "price")?, "price")?;

    let tone = match root.get("tone") {
        None | Some(Value::Null) => Tone::default(),
        Some(value) => {
            let name = value
                .as_str()
                .ok_or_else(|| ListingSmithError::validation("tone", "must be a string"))?;
            Tone::from_name(name).ok_or_else(|| {
                ListingSmithError::validation(
                    "tone",
                    format!(
                        "must be one of {}, got '{}'",
                        Tone::ALL.map(|t| t.name()).join(", "),
                        name
                    ),
                )
            })?
        }
    };

    debug!(
        "Validated listing: {}, {} ({} bedrooms, {} m2, language={})",
        location.neighborhood,
        location.city,
        features.bedrooms,
        features.area,
        language.code()
    );

    Ok(PropertyListing {
        location,
        features,
        price,
        language,
        tone,
    })
}

fn parse_language(value: &Value) -> Result<Language> {
    let code = value
        .as_str()
        .ok_or_else(|| ListingSmithError::validation("language", "must be a string"))?;

    Language::from_code(code).ok_or_else(|| {
        ListingSmithError::validation(
            "language",
            format!("must be 'en', 'pt', or 'es', got '{}'", code),
        )
    })
}

fn parse_location(obj: &Map<String, Value>) -> Result<Location> {
    Ok(Location {
        neighborhood: require_text(obj, "neighborhood", "location.neighborhood")?,
        city: require_text(obj, "city", "location.city")?,
        region: optional_text(obj, "region", "location.region")?,
        country: require_text(obj, "country", "location.country")?,
    })
}

fn parse_features(obj: &Map<String, Value>) -> Result<Features> {
    let bedrooms = require_count(obj, "bedrooms", "features.bedrooms")?;
    let area = require_count(obj, "area", "features.area")?;

    Ok(Features {
        bedrooms: narrow(positive(bedrooms, "features.bedrooms")?, "features.bedrooms")?,
        bathrooms: optional_count(obj, "bathrooms", "features.bathrooms")?
            .map(|n| narrow(n, "features.bathrooms"))
            .transpose()?,
        area: narrow(positive(area, "features.area")?, "features.area")?,
        balcony: optional_flag(obj, "balcony", "features.balcony")?,
        elevator: optional_flag(obj, "elevator", "features.elevator")?,
        parking: optional_flag(obj, "parking", "features.parking")?,
        year_built: optional_count(obj, "year_built", "features.year_built")?
            .map(|n| narrow(n, "features.year_built"))
            .transpose()?,
        furnished: optional_flag(obj, "furnished", "features.furnished")?,
        garden: optional_flag(obj, "garden", "features.garden")?,
    })
}

fn object_at<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| ListingSmithError::validation(path, "must be an object"))
}

fn require_text(obj: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    optional_text(obj, key, path)?
        .ok_or_else(|| ListingSmithError::validation(path, "is required"))
}

fn optional_text(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ListingSmithError::validation(path, "cannot be empty"))
        }
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(ListingSmithError::validation(path, "must be a string")),
    }
}

fn require_count(obj: &Map<String, Value>, key: &str, path: &str) -> Result<u64> {
    optional_count(obj, key, path)?.ok_or_else(|| ListingSmithError::validation(path, "is required"))
}

fn optional_count(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<u64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ListingSmithError::validation(path, "must be a non-negative integer")),
    }
}

fn optional_flag(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<bool>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(ListingSmithError::validation(path, "must be true or false")),
    }
}

fn positive(n: u64, path: &str) -> Result<u64> {
    if n == 0 {
        return Err(ListingSmithError::validation(path, "must be greater than 0"));
    }
    Ok(n)
}

fn narrow(n: u64, path: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| ListingSmithError::validation(path, "is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "location": {"neighborhood": "Alfama", "city": "Lisbon", "country": "Portugal"},
            "features": {"bedrooms": 2, "area": 85},
            "price": 320000,
            "language": "en"
        })
    }

    fn failing_key(value: &Value) -> String {
        match validate_listing(value) {
            Err(ListingSmithError::Validation { key, .. }) => key,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_listing_is_accepted() {
        let listing = validate_listing(&valid()).unwrap();

        assert_eq!(listing.location.neighborhood, "Alfama");
        assert_eq!(listing.location.region, None);
        assert_eq!(listing.features.bedrooms, 2);
        assert_eq!(listing.features.area, 85);
        assert_eq!(listing.price, 320000);
        assert_eq!(listing.language, Language::En);
        assert_eq!(listing.tone, Tone::Friendly);
    }

    #[test]
    fn test_optional_fields_keep_presence() {
        let mut value = valid();
        value["features"]["balcony"] = json!(false);
        value["features"]["elevator"] = json!(true);
        value["features"]["bathrooms"] = json!(0);
        value["features"]["garden"] = Value::Null;
        value["location"]["region"] = json!("Lisboa");

        let listing = validate_listing(&value).unwrap();

        assert_eq!(listing.features.balcony, Some(false));
        assert_eq!(listing.features.elevator, Some(true));
        assert_eq!(listing.features.bathrooms, Some(0));
        assert_eq!(listing.features.garden, None);
        assert_eq!(listing.features.parking, None);
        assert_eq!(listing.features.furnished, None);
        assert_eq!(listing.features.year_built, None);
        assert_eq!(listing.location.region.as_deref(), Some("Lisboa"));
    }

    #[test]
    fn test_each_missing_required_key_is_named() {
        for key in REQUIRED_KEYS {
            let mut value = valid();
            value.as_object_mut().unwrap().remove(key);
            assert_eq!(failing_key(&value), key);
        }
    }

    #[test]
    fn test_unsupported_language_is_rejected() {
        let mut value = valid();
        value["language"] = json!("fr");
        assert_eq!(failing_key(&value), "language");

        value["language"] = json!(1);
        assert_eq!(failing_key(&value), "language");
    }

    #[test]
    fn test_numeric_fields_must_be_non_negative_integers() {
        let mut value = valid();
        value["price"] = json!(-5);
        assert_eq!(failing_key(&value), "price");

        let mut value = valid();
        value["features"]["area"] = json!(85.5);
        assert_eq!(failing_key(&value), "features.area");

        let mut value = valid();
        value["features"]["bathrooms"] = json!("two");
        assert_eq!(failing_key(&value), "features.bathrooms");
    }

    #[test]
    fn test_bedrooms_and_area_must_be_positive() {
        let mut value = valid();
        value["features"]["bedrooms"] = json!(0);
        assert_eq!(failing_key(&value), "features.bedrooms");

        let mut value = valid();
        value["features"].as_object_mut().unwrap().remove("area");
        assert_eq!(failing_key(&value), "features.area");
    }

    #[test]
    fn test_nested_location_fields() {
        let mut value = valid();
        value["location"].as_object_mut().unwrap().remove("city");
        assert_eq!(failing_key(&value), "location.city");

        let mut value = valid();
        value["location"] = json!("Lisbon");
        assert_eq!(failing_key(&value), "location");
    }

    #[test]
    fn test_tone() {
        let mut value = valid();
        value["tone"] = json!("luxury");
        assert_eq!(validate_listing(&value).unwrap().tone, Tone::Luxury);

        value["tone"] = json!("sarcastic");
        assert_eq!(failing_key(&value), "tone");
    }

    #[test]
    fn test_parse_listing_reports_bad_json() {
        assert_matches!(parse_listing("{not json"), Err(ListingSmithError::Json(_)));
        assert_matches!(parse_listing("[]"), Err(ListingSmithError::Validation { .. }));
    }
}
