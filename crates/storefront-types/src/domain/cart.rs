use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("no cart line for product {0}")]
    LineNotFound(String),
}

/// Product snapshot handed to the cart when a line is added. The cart keeps
/// its own copy of the metadata; later catalog edits do not reach back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub image_ref: Option<String>,
    pub quantity: u32,
}

/// A cart is owned by exactly one session or account; `id` is the owner key.
/// `revision` is minted once per cart lifecycle and doubles as the default
/// idempotency token for order placement. `version` counts persisted
/// mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub owner_id: String,
    pub revision: Uuid,
    pub version: u64,
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        let now = Utc::now();
        Self {
            id: owner_id.clone(),
            owner_id,
            revision: Uuid::new_v4(),
            version: 0,
            lines: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Add `quantity` units of `product`. An existing line for the same
    /// product absorbs the delta; otherwise a new line is appended, so a
    /// cart never holds two lines for one product.
    pub fn add_line(&mut self, product: ProductRef, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.product_id)
        {
            Some(existing) => existing.quantity += quantity,
            None => self.lines.push(CartLine {
                product_id: product.product_id,
                name: product.name,
                unit_price_cents: product.unit_price_cents,
                image_ref: product.image_ref,
                quantity,
            }),
        }
        self.bump();
        Ok(())
    }

    /// Set an absolute quantity, clamped to a minimum of 1. Dropping a line
    /// is `remove_line`, never a zero quantity.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;
        line.quantity = quantity.max(1);
        self.bump();
        Ok(())
    }

    /// Remove the line for `product_id`. Removing an absent line is a no-op.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return false;
        }
        self.bump();
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.bump();
    }

    /// Fold an anonymous cart into this account cart: quantities sum on a
    /// shared product id, lines unique to either side carry over, and the
    /// anonymous line's metadata (name, price, image) overwrites what the
    /// account cart held, since it reflects the latest browsing.
    ///
    /// The merge itself is pure and in memory. It is the caller's contract
    /// to run it at most once per login and to delete the anonymous cart in
    /// the same store batch; calling it twice double-counts quantities.
    pub fn merge_from(&mut self, anonymous: &Cart) {
        for incoming in &anonymous.lines {
            match self
                .lines
                .iter_mut()
                .find(|l| l.product_id == incoming.product_id)
            {
                Some(existing) => {
                    existing.quantity += incoming.quantity;
                    existing.name = incoming.name.clone();
                    existing.unit_price_cents = incoming.unit_price_cents;
                    existing.image_ref = incoming.image_ref.clone();
                }
                None => self.lines.push(incoming.clone()),
            }
        }
        self.bump();
    }

    fn bump(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
