//! Mock price source for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::{FuelPrices, PriceSource, ServiceError};

use super::fixtures;

/// Mock implementation of the PriceSource trait.
///
/// Returns [`fixtures::fuel_prices`] unless configured otherwise.
#[derive(Debug)]
pub struct MockPriceSource {
    prices: Arc<RwLock<FuelPrices>>,
    next_error: Arc<RwLock<Option<ServiceError>>>,
    calls: AtomicUsize,
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::with_prices(fixtures::fuel_prices())
    }

    pub fn with_prices(prices: FuelPrices) -> Self {
        Self {
            prices: Arc::new(RwLock::new(prices)),
            next_error: Arc::new(RwLock::new(None)),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_prices(&self, prices: FuelPrices) {
        *self.prices.write().await = prices;
    }

    /// Make the next lookup fail.
    pub async fn set_next_error(&self, error: ServiceError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fuel_prices(&self) -> Result<FuelPrices, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.prices.read().await.clone())
    }
}
