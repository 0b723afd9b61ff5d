use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use storefront_types::domain::cart::CartError;
use storefront_types::domain::order::{OrderError, OrderStatus};
use storefront_types::ports::document_store::StoreError;

/// Every engine operation fails with one of these kinds; the kind is the
/// contract surface the presentation layer translates into messages.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("No cart line for product {0}")]
    LineNotFound(String),

    #[error("Caller does not own this cart")]
    Unauthorized,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Shipping address is missing {0}")]
    InvalidAddress(String),

    #[error("Invalid status transition {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<CartError> for EngineError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::InvalidQuantity => EngineError::InvalidQuantity,
            CartError::LineNotFound(product_id) => EngineError::LineNotFound(product_id),
        }
    }
}

impl From<OrderError> for EngineError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Unauthorized => EngineError::Unauthorized,
            OrderError::EmptyCart => EngineError::EmptyCart,
            OrderError::InvalidAddress(field) => EngineError::InvalidAddress(field),
            OrderError::InvalidTransition { from, to } => {
                EngineError::InvalidTransition { from, to }
            }
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => EngineError::StoreUnavailable(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            EngineError::InvalidQuantity
            | EngineError::EmptyCart
            | EngineError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            EngineError::LineNotFound(_) | EngineError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            EngineError::Unauthorized => (StatusCode::FORBIDDEN, self.to_string()),
            EngineError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            EngineError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            EngineError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
