use serde::Deserialize;
use std::env;

use storefront_types::domain::pricing::{PricingPolicy, ShippingPolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    pub free_shipping_threshold_cents: i64,
    pub shipping_flat_fee_cents: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into());
        let database_url = env::var("DATABASE_URL").ok();
        let free_shipping_threshold_cents = match env::var("FREE_SHIPPING_THRESHOLD_CENTS") {
            Ok(raw) => raw.parse()?,
            Err(_) => ShippingPolicy::default().free_threshold_cents,
        };
        let shipping_flat_fee_cents = match env::var("SHIPPING_FLAT_FEE_CENTS") {
            Ok(raw) => raw.parse()?,
            Err(_) => ShippingPolicy::default().flat_fee_cents,
        };
        Ok(Self {
            server_port,
            database_url,
            free_shipping_threshold_cents,
            shipping_flat_fee_cents,
        })
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            shipping: ShippingPolicy {
                flat_fee_cents: self.shipping_flat_fee_cents,
                free_threshold_cents: self.free_shipping_threshold_cents,
            },
            ..PricingPolicy::default()
        }
    }
}
