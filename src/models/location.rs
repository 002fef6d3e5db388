//! Location model for suggestion requests

use serde::{Deserialize, Serialize};

/// Location as sent by callers: coordinates with an optional place name
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    #[serde(default, deserialize_with = "super::lenient::number")]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(default, deserialize_with = "super::lenient::number")]
    pub longitude: f64,
    /// Place name (city, town, village), when the caller knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Where the trip starts from: a named place or a bare coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Named(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl Location {
    /// Create a coordinate-only location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            city: None,
        }
    }

    /// Create location with a place name
    #[must_use]
    pub fn with_city(latitude: f64, longitude: f64, city: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            city: Some(city.into()),
        }
    }

    /// The place this location stands for. A blank city counts as absent.
    #[must_use]
    pub fn place(&self) -> Place {
        match self.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => Place::Named(city.to_string()),
            _ => Place::Coordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            },
        }
    }
}

impl Place {
    /// Text used inside prompts: the name, or `coordinates (lat, lon)`
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Place::Named(name) => name.clone(),
            Place::Coordinates {
                latitude,
                longitude,
            } => format!("coordinates ({latitude}, {longitude})"),
        }
    }
}
