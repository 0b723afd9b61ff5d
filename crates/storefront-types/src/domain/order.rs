use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::pricing::{compute_breakdown, PriceBreakdown, PricingPolicy};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum OrderError {
    #[error("caller does not own this cart or order")]
    Unauthorized,
    #[error("cannot place an order from an empty cart")]
    EmptyCart,
    #[error("shipping address is missing {0}")]
    InvalidAddress(String),
    #[error("invalid status transition {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl Address {
    /// Every required field must be non-blank before an order is placed.
    pub fn validate(&self) -> Result<(), OrderError> {
        let required = [
            ("name", &self.name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OrderError::InvalidAddress(field.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The immediate successor on the forward chain, if any.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Forward one step at a time, or sideways to Cancelled from any
    /// non-terminal state.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == OrderStatus::Cancelled || Some(to) == self.next()
    }
}

/// A cart line frozen at placement time. Later catalog or cart changes do
/// not reach an order line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub image_ref: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner_id: String,
    pub lines: Vec<OrderLine>,
    pub shipping_address: Address,
    pub payment_method: String,
    pub pricing: PriceBreakdown,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot a cart into a new Pending order. The breakdown is
    /// recomputed here from the cart's current lines; anything a client
    /// claims about totals is ignored.
    pub fn from_cart(
        cart: &Cart,
        placed_by: &str,
        shipping_address: Address,
        payment_method: String,
        policy: &PricingPolicy,
    ) -> Result<Self, OrderError> {
        if cart.owner_id != placed_by {
            return Err(OrderError::Unauthorized);
        }
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        shipping_address.validate()?;

        let pricing = compute_breakdown(&cart.lines, policy);
        let lines = cart
            .lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                unit_price_cents: l.unit_price_cents,
                image_ref: l.image_ref.clone(),
                quantity: l.quantity,
            })
            .collect();

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id: placed_by.to_string(),
            lines,
            shipping_address,
            payment_method,
            pricing,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
