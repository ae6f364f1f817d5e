//! Feed routes
//!
//! Three feeds with different sources and failure statuses:
//! `/api/trending` and `/api/pumpfun/trending` answer 502 when DexScreener
//! fails, `/api/tokens/trending` answers 500.

use axum::extract::{Query, State};
use axum::Json;

use super::FeedQuery;
use crate::domain::category::TrendingCategory;
use crate::domain::token::TokenView;
use crate::http::{ApiError, AppState};

/// Boosted Solana tokens
pub async fn boosted(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<TokenView>>, ApiError> {
    let category = TrendingCategory::parse_or_default(query.category.as_deref());
    let tokens = state.trending.boosted(category, query.limit()).await?;
    Ok(Json(tokens))
}

/// Launched tokens, DexScreener boosts when there are none
pub async fn listed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<TokenView>>, ApiError> {
    let category = TrendingCategory::parse_or_default(query.category.as_deref());
    let tokens = state
        .trending
        .listed(category, query.limit())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(tokens))
}

/// DexScreener search feed
pub async fn searched(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<TokenView>>, ApiError> {
    let tokens = state.trending.searched(query.category(), query.limit()).await?;
    Ok(Json(tokens))
}
