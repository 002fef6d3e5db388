//! Location Resolution Module
//!
//! Turns a bare coordinate pair into a place name through a Nominatim-style
//! reverse geocoding service. Lookups are best-effort: any failure leaves the
//! caller with the raw coordinates.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::Place;

/// Reverse geocoding client
pub struct LocationResolver {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

impl Address {
    /// City, else town, else village
    fn settlement(self) -> Option<String> {
        [self.city, self.town, self.village]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    }
}

impl LocationResolver {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .with_context(|| "Failed to create geocoding HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the settlement name for a coordinate pair
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom=10",
            self.base_url, latitude, longitude
        );
        debug!("Reverse geocoding request URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| "Reverse geocoding request failed")?
            .error_for_status()
            .with_context(|| "Reverse geocoding service returned an error")?;

        let body: ReverseResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse reverse geocoding response")?;

        Ok(body.address.and_then(Address::settlement))
    }

    /// Resolve a place, naming bare coordinates when possible
    pub async fn resolve_place(&self, place: Place) -> Place {
        let Place::Coordinates {
            latitude,
            longitude,
        } = place
        else {
            return place;
        };

        match self.reverse_geocode(latitude, longitude).await {
            Ok(Some(name)) => {
                debug!("Resolved ({}, {}) to {}", latitude, longitude, name);
                Place::Named(name)
            }
            Ok(None) => {
                debug!("No settlement name found, using coordinates");
                place
            }
            Err(e) => {
                warn!("Reverse geocoding failed: {:#}, using coordinates", e);
                place
            }
        }
    }
}
