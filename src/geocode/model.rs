use std::fmt;
use serde::Deserialize;

/// GeoJSON body returned by `/search/`
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
    /// only set when the service reports a failure inside a 200 response
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errormessage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub properties: RawGeocodeProperties,
}

/// Properties of a single geocoder result, as sent by the service.
///
/// Every field is optional: the service omits what it does not know
/// (a street-level match has no `housenumber`, for example).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawGeocodeProperties {
    pub label: Option<String>,
    pub city: Option<String>,
    pub housenumber: Option<String>,
    pub postcode: Option<String>,
    pub street: Option<String>,
    pub x: Option<Coordinate>,
    pub y: Option<Coordinate>,
}

/// A projected coordinate. The public API sends numbers, some mirrors send strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(serde_json::Number),
    Text(String),
}

impl Coordinate {
    /// a blank string carries no position
    pub fn is_blank(&self) -> bool {
        match self {
            Coordinate::Number(_) => false,
            Coordinate::Text(text) => text.trim().is_empty(),
        }
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Coordinate::Number)
            .unwrap_or_else(|| Coordinate::Text(value.to_string()))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `652089.0` and `652089` are the same position and must print alike
            Coordinate::Number(number) => match number.as_f64() {
                Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                    write!(f, "{}", value as i64)
                }
                _ => write!(f, "{}", number),
            },
            Coordinate::Text(text) => f.write_str(text.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_search_response() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [2.34, 48.86]},
                "properties": {
                    "label": "1 Rue de Rivoli 75001 Paris",
                    "score": 0.97,
                    "housenumber": "1",
                    "postcode": "75001",
                    "city": "Paris",
                    "street": "Rue de Rivoli",
                    "x": 2.34,
                    "y": 48.86
                }
            }]
        }"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        let properties = &collection.features[0].properties;

        assert_eq!(properties.city.as_deref(), Some("Paris"));
        assert_eq!(properties.housenumber.as_deref(), Some("1"));
        assert_eq!(properties.x.as_ref().unwrap().to_string(), "2.34");
        assert_eq!(properties.y.as_ref().unwrap().to_string(), "48.86");
        assert!(collection.status.is_none());
    }

    #[test]
    fn missing_properties_decode_as_none() {
        let body = r#"{"features": [{"properties": {"city": "Lyon", "x": null}}]}"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        let properties = &collection.features[0].properties;

        assert_eq!(properties.city.as_deref(), Some("Lyon"));
        assert!(properties.x.is_none());
        assert!(properties.y.is_none());
        assert!(properties.street.is_none());
    }

    #[test]
    fn string_coordinates_are_accepted() {
        let body = r#"{"features": [{"properties": {"x": "652089.7", "y": " "}}]}"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        let properties = &collection.features[0].properties;

        assert_eq!(properties.x.as_ref().unwrap().to_string(), "652089.7");
        assert!(properties.y.as_ref().unwrap().is_blank());
    }

    #[test]
    fn whole_numbers_print_without_a_fraction() {
        let body = r#"{"features": [
            {"properties": {"x": 652089.0, "y": 6862305.50}},
            {"properties": {"x": 652089, "y": 6862305.5}}
        ]}"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        let first = &collection.features[0].properties;
        let second = &collection.features[1].properties;

        assert_eq!(first.x.as_ref().unwrap().to_string(), "652089");
        assert_eq!(first.y.as_ref().unwrap().to_string(), "6862305.5");
        assert_eq!(first.x.as_ref().unwrap().to_string(), second.x.as_ref().unwrap().to_string());
        assert_eq!(Coordinate::from(-0.0).to_string(), "0");
    }

    #[test]
    fn empty_body_has_no_features() {
        let collection: FeatureCollection = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(collection.features.is_empty());
    }
}
