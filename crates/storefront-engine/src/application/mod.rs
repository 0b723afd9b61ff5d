pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod wishlist_service;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::EngineError;

/// Collection names in the document store.
pub mod collections {
    pub const CARTS: &str = "carts";
    pub const ORDERS: &str = "orders";
    pub const ORDER_MARKERS: &str = "order_markers";
    pub const WISHLISTS: &str = "wishlists";
    pub const PRODUCTS: &str = "products";
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, EngineError> {
    serde_json::to_value(value).map_err(|e| EngineError::Internal(anyhow::anyhow!(e)))
}

pub(crate) fn decode<T: DeserializeOwned>(doc: Value) -> Result<T, EngineError> {
    serde_json::from_value(doc).map_err(|e| EngineError::Internal(anyhow::anyhow!(e)))
}
