//! Fuel price lookup backed by the projectzerothree price feed.
//!
//! The feed publishes one JSON document with the cheapest price per fuel type
//! for each region. Only the configured region is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{FuelPrices, FuelQuote, FuelType};
use super::{api_error, PriceSource, ServiceError};

/// Price feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelPricesConfig {
    /// Feed URL (default: https://projectzerothree.info/api.php?format=json).
    #[serde(default = "default_url")]
    pub url: String,
    /// Region whose prices are used (default: "All").
    #[serde(default = "default_region")]
    pub region: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_url() -> String {
    "https://projectzerothree.info/api.php?format=json".to_string()
}

fn default_region() -> String {
    "All".to_string()
}

fn default_timeout() -> u32 {
    30
}

impl Default for FuelPricesConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            region: default_region(),
            timeout_secs: default_timeout(),
        }
    }
}

/// HTTP client for the price feed.
pub struct ProjectZeroThreeClient {
    client: Client,
    url: String,
    region: String,
}

impl ProjectZeroThreeClient {
    /// Create a new client.
    pub fn new(config: FuelPricesConfig) -> Result<Self, ServiceError> {
        if config.url.is_empty() {
            return Err(ServiceError::NotConfigured(
                "fuel_prices.url is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            url: config.url,
            region: config.region,
        })
    }
}

#[async_trait]
impl PriceSource for ProjectZeroThreeClient {
    async fn fuel_prices(&self) -> Result<FuelPrices, ServiceError> {
        debug!("Fetching fuel prices for region '{}'", self.region);

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let feed: PriceFeed = response.json().await.map_err(|e| {
            ServiceError::ParseError(format!("Failed to parse price feed: {}", e))
        })?;

        quotes_for_region(feed, &self.region)
    }
}

#[derive(Debug, Deserialize)]
struct PriceFeed {
    regions: Vec<RegionPrices>,
}

#[derive(Debug, Deserialize)]
struct RegionPrices {
    region: String,
    prices: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(rename = "type")]
    fuel_type: String,
    price: f64,
    lat: f64,
    lng: f64,
    #[serde(default)]
    suburb: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

fn quotes_for_region(feed: PriceFeed, region: &str) -> Result<FuelPrices, ServiceError> {
    let region_prices = feed
        .regions
        .into_iter()
        .find(|r| r.region.eq_ignore_ascii_case(region))
        .ok_or_else(|| ServiceError::ParseError(format!("Region '{}' not in price feed", region)))?;

    let mut quotes = FuelPrices::new();
    for entry in region_prices.prices {
        let Ok(fuel_type) = entry.fuel_type.parse::<FuelType>() else {
            debug!("Skipping unknown fuel type '{}'", entry.fuel_type);
            continue;
        };
        let quote = FuelQuote {
            fuel_type,
            price: entry.price,
            lat: entry.lat,
            lng: entry.lng,
            suburb: entry.suburb,
            state: entry.state,
        };
        // Keep the cheapest quote if the feed lists a type twice.
        match quotes.get(&fuel_type) {
            Some(existing) if existing.price <= quote.price => {}
            _ => {
                quotes.insert(fuel_type, quote);
            }
        }
    }

    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "updated": 1700000000,
        "regions": [
            {
                "region": "All",
                "prices": [
                    {"type": "E10", "price": 148.9, "suburb": "Parramatta", "state": "NSW", "lat": -33.81, "lng": 151.0},
                    {"type": "U91", "price": 150.0, "suburb": "Ryde", "state": "NSW", "lat": -33.8, "lng": 151.2},
                    {"type": "U91", "price": 152.0, "lat": -37.8, "lng": 144.9},
                    {"type": "Hydrogen", "price": 999.0, "lat": 0.0, "lng": 0.0}
                ]
            },
            {
                "region": "VIC",
                "prices": [
                    {"type": "Diesel", "price": 170.1, "lat": -37.8, "lng": 144.9}
                ]
            }
        ]
    }"#;

    fn feed() -> PriceFeed {
        serde_json::from_str(FEED).unwrap()
    }

    #[test]
    fn test_quotes_for_default_region() {
        let quotes = quotes_for_region(feed(), "All").unwrap();
        assert_eq!(quotes.len(), 2);

        let unleaded = &quotes[&FuelType::U91];
        assert_eq!(unleaded.price, 150.0);
        assert_eq!(unleaded.lat, -33.8);
        assert_eq!(unleaded.lng, 151.2);
        assert_eq!(unleaded.suburb.as_deref(), Some("Ryde"));
    }

    #[test]
    fn test_region_match_is_case_insensitive() {
        let quotes = quotes_for_region(feed(), "vic").unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(quotes.contains_key(&FuelType::Diesel));
    }

    #[test]
    fn test_missing_region_is_parse_error() {
        assert!(matches!(
            quotes_for_region(feed(), "TAS"),
            Err(ServiceError::ParseError(_))
        ));
    }

    #[test]
    fn test_new_requires_url() {
        let config = FuelPricesConfig {
            url: String::new(),
            ..Default::default()
        };
        assert!(ProjectZeroThreeClient::new(config).is_err());
    }
}
