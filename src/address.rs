use std::cell::Cell;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};
use crate::geocode::model::{Coordinate, RawGeocodeProperties};

/// Canonical address built from one geocoder result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub city: String,
    pub street: String,
    pub postcode: String,
    pub house_number: String,
}

impl fmt::Display for Address {
    /// `1 Rue de Rivoli, 75001 Paris`, skipping whatever is empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line1 = join(&[self.house_number.as_str(), self.street.as_str()]);
        let line2 = join(&[self.postcode.as_str(), self.city.as_str()]);
        match (line1.is_empty(), line2.is_empty()) {
            (false, false) => write!(f, "{}, {}", line1, line2),
            (false, true) => f.write_str(&line1),
            _ => f.write_str(&line2),
        }
    }
}

fn join(parts: &[&str]) -> String {
    parts.iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produces the id parts used when a result has no coordinates.
pub trait IdSource {
    /// stands in for a missing `x`
    fn fallback_x(&self) -> String;
    /// stands in for a missing `y`
    fn fallback_y(&self) -> String;
}

/// Degraded mode: wall-clock milliseconds for `x`, a random fraction for `y`.
///
/// Ids built this way are not reproducible, but two of them colliding
/// requires the same millisecond and the same random draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockRandomIds;

impl IdSource for ClockRandomIds {
    fn fallback_x(&self) -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
            .to_string()
    }

    fn fallback_y(&self) -> String {
        rand::random::<f64>().to_string()
    }
}

/// Deterministic counter, every call yields the next value.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: Cell::new(start),
        }
    }

    fn bump(&self) -> String {
        let value = self.next.get();
        self.next.set(value + 1);
        value.to_string()
    }
}

impl IdSource for SequentialIds {
    fn fallback_x(&self) -> String {
        format!("x{}", self.bump())
    }

    fn fallback_y(&self) -> String {
        format!("y{}", self.bump())
    }
}

/// Normalize a raw geocoder result with the default fallback id source.
pub fn normalize(raw: &RawGeocodeProperties) -> Address {
    normalize_with(raw, &ClockRandomIds)
}

/// Normalize a raw geocoder result. Never fails: absent text fields become `""`.
pub fn normalize_with(raw: &RawGeocodeProperties, ids: &impl IdSource) -> Address {
    let x = present(&raw.x).unwrap_or_else(|| ids.fallback_x());
    let y = present(&raw.y).unwrap_or_else(|| ids.fallback_y());
    Address {
        id: format!("{}_{}", x, y),
        city: text(&raw.city),
        street: text(&raw.street),
        postcode: text(&raw.postcode),
        house_number: text(&raw.housenumber),
    }
}

fn present(coordinate: &Option<Coordinate>) -> Option<String> {
    coordinate.as_ref()
        .filter(|c| !c.is_blank())
        .map(|c| c.to_string())
}

fn text(field: &Option<String>) -> String {
    field.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use super::*;

    fn rivoli() -> RawGeocodeProperties {
        RawGeocodeProperties {
            label: Some("1 Rue de Rivoli 75001 Paris".to_string()),
            city: Some("Paris".to_string()),
            housenumber: Some("1".to_string()),
            postcode: Some("75001".to_string()),
            street: Some("Rue de Rivoli".to_string()),
            x: Some(Coordinate::from(2.34)),
            y: Some(Coordinate::from(48.86)),
        }
    }

    #[test]
    fn id_comes_from_coordinates() {
        let address = normalize(&rivoli());
        assert_eq!(address.id, "2.34_48.86");
        assert_eq!(address.city, "Paris");
        assert_eq!(address.house_number, "1");
        assert_eq!(address.postcode, "75001");
        assert_eq!(address.street, "Rue de Rivoli");
    }

    #[test]
    fn equal_coordinates_give_equal_ids() {
        let mut other = rivoli();
        other.city = Some("Somewhere else".to_string());
        other.housenumber = None;

        assert_eq!(normalize(&rivoli()).id, normalize(&other).id);
    }

    #[test]
    fn integral_and_decimal_coordinates_give_the_same_id() {
        let decode = |body: &str| serde_json::from_str::<RawGeocodeProperties>(body).unwrap();
        let decimal = normalize(&decode(r#"{"x": 1.0, "y": 2}"#));
        let integral = normalize(&decode(r#"{"x": 1, "y": 2.0}"#));

        assert_eq!(decimal.id, "1_2");
        assert_eq!(decimal.id, integral.id);
    }

    #[test]
    fn absent_fields_become_empty_strings() {
        let raw = RawGeocodeProperties {
            x: Some(Coordinate::from(1.0)),
            y: Some(Coordinate::from(2.5)),
            ..Default::default()
        };
        let address = normalize(&raw);

        assert_eq!(address.city, "");
        assert_eq!(address.street, "");
        assert_eq!(address.postcode, "");
        assert_eq!(address.house_number, "");
    }

    #[test]
    fn missing_coordinates_use_the_injected_source() {
        let ids = SequentialIds::starting_at(7);
        let raw = RawGeocodeProperties {
            y: Some(Coordinate::from(48.86)),
            ..Default::default()
        };

        assert_eq!(normalize_with(&raw, &ids).id, "x7_48.86");
        assert_eq!(normalize_with(&RawGeocodeProperties::default(), &ids).id, "x8_y9");
    }

    #[test]
    fn blank_text_coordinate_counts_as_missing() {
        let ids = SequentialIds::default();
        let raw = RawGeocodeProperties {
            x: Some(Coordinate::Text("  ".to_string())),
            y: Some(Coordinate::Text("48.86".to_string())),
            ..Default::default()
        };

        assert_eq!(normalize_with(&raw, &ids).id, "x0_48.86");
    }

    #[test]
    fn displays_as_a_postal_line() {
        assert_eq!(normalize(&rivoli()).to_string(), "1 Rue de Rivoli, 75001 Paris");

        let raw = RawGeocodeProperties {
            city: Some("Paris".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize(&raw).to_string(), "Paris");
    }

    #[test]
    fn fallback_ids_do_not_collide() {
        let raw = RawGeocodeProperties::default();
        let ids = (0..10_000)
            .map(|_| normalize(&raw).id)
            .collect::<HashSet<_>>();

        assert_eq!(ids.len(), 10_000);
    }
}
