use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::domain::token::TokenView;
use crate::domain::trade::Trade;
use crate::http::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn get_token(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TokenView>, ApiError> {
    Ok(Json(state.tokens.get(&address).await?))
}

pub async fn trades(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<Trade>>, ApiError> {
    Ok(Json(state.tokens.trades(&address).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<TokenView>>, ApiError> {
    let q = query.q.unwrap_or_default();
    Ok(Json(state.tokens.search(&q).await?))
}
