//! API errors
//!
//! Every failure leaves the server as `{"error": "..."}` with a status code.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::application::{
    LaunchServiceError, PriceUpdateError, StatsError, TokenError, TradeError, TrendingError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<TrendingError> for ApiError {
    fn from(err: TrendingError) -> Self {
        tracing::warn!(error = %err, "Trending fetch failed");
        ApiError::BadGateway("Failed to fetch trending tokens".to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingAddress => ApiError::BadRequest(err.to_string()),
            TokenError::NotFound => ApiError::NotFound(err.to_string()),
            TokenError::MarketData(_) => ApiError::BadGateway(err.to_string()),
            TokenError::Repository(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::BadGateway(err.to_string())
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::MissingFields
            | TradeError::InvalidWallet(_)
            | TradeError::SlippageTooHigh(_) => ApiError::BadRequest(err.to_string()),
            TradeError::Quote(e) if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            TradeError::Swap(e) if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            TradeError::Quote(e) => {
                tracing::warn!(error = %e, "Jupiter quote error");
                ApiError::BadGateway("Failed to get quote".to_string())
            }
            TradeError::Swap(e) => {
                tracing::warn!(error = %e, "Jupiter swap error");
                ApiError::BadGateway("Failed to create transaction".to_string())
            }
            TradeError::NoDatabase | TradeError::Repository(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<LaunchServiceError> for ApiError {
    fn from(err: LaunchServiceError) -> Self {
        if err.is_client_error() {
            return ApiError::BadRequest(err.to_string());
        }
        match err {
            LaunchServiceError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            LaunchServiceError::Chain(_) => ApiError::BadGateway(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PriceUpdateError> for ApiError {
    fn from(err: PriceUpdateError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::MetadataError;
    use crate::ports::chain::ChainError;
    use crate::ports::execution::ExecutionError;
    use crate::ports::market_data::MarketDataError;

    #[test]
    fn test_trade_error_mapping() {
        let rejected: ApiError = TradeError::Quote(ExecutionError::Rejected("No routes found".into())).into();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejected.to_string(), "No routes found");

        let upstream: ApiError = TradeError::Quote(ExecutionError::ApiError("timeout".into())).into();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.to_string(), "Failed to get quote");

        let swap: ApiError = TradeError::Swap(ExecutionError::ApiError("500".into())).into();
        assert_eq!(swap.to_string(), "Failed to create transaction");

        let missing: ApiError = TradeError::MissingFields.into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Missing required fields");
    }

    #[test]
    fn test_token_error_mapping() {
        assert_eq!(ApiError::from(TokenError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(TokenError::MissingAddress).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(TokenError::MarketData(MarketDataError::Http("reset".into()))).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_launch_error_mapping() {
        let missing: ApiError = LaunchServiceError::Metadata(MetadataError::MissingFields).into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let large: ApiError = LaunchServiceError::FileTooLarge(3_000_000).into();
        assert_eq!(large.to_string(), "File too large. Max size is 2MB");

        let chain: ApiError = LaunchServiceError::Chain(ChainError::Rpc("down".into())).into();
        assert_eq!(chain.status(), StatusCode::BAD_GATEWAY);

        let duplicate: ApiError = LaunchServiceError::Duplicate("Mint".into()).into();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let wallet: ApiError = LaunchServiceError::PlatformWalletMissing.into();
        assert_eq!(wallet.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_stats_error_message() {
        let err: ApiError = StatsError::Unavailable.into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Database unavailable for stats");
    }
}
