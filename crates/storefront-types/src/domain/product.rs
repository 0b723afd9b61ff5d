use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cart::ProductRef;

/// Catalog record. Carts and orders snapshot what they need from it; a
/// later price edit never reaches back into an existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            product_id: self.id.clone(),
            name: self.name.clone(),
            unit_price_cents: self.unit_price_cents,
            image_ref: self.image_ref.clone(),
        }
    }
}
