use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use fuelock_core::{FuelQuote, FuelType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ErrorResponse;
use crate::state::AppState;

/// Query parameters for the prices endpoint
#[derive(Debug, Deserialize)]
pub struct PriceQueryParams {
    /// Only return this fuel type
    pub fuel_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub prices: Vec<FuelQuote>,
}

/// Current quotes, ordered by fuel type.
pub async fn list_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PriceQueryParams>,
) -> Result<Json<PricesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let filter = params
        .fuel_type
        .as_deref()
        .map(str::parse::<FuelType>)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))))?;

    let prices = state.prices().fuel_prices().await.map_err(|e| {
        tracing::warn!("Fuel price lookup failed: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new(format!("Failed to fetch fuel prices: {}", e))),
        )
    })?;

    let mut quotes: Vec<FuelQuote> = prices
        .into_values()
        .filter(|q| filter.is_none_or(|f| q.fuel_type == f))
        .collect();
    quotes.sort_by_key(|q| q.fuel_type);

    Ok(Json(PricesResponse { prices: quotes }))
}
