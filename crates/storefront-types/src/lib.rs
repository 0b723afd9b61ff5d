//! storefront-types: domain model and ports for the cart & order engine.

pub mod domain;
pub mod ports;
