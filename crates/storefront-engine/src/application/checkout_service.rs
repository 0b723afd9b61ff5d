use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use storefront_types::domain::cart::Cart;
use storefront_types::domain::order::{Address, Order, OrderStatus};
use storefront_types::domain::pricing::PricingPolicy;
use storefront_types::ports::document_store::{DocumentStore, Predicate, WriteOp};

use crate::application::collections::{CARTS, ORDERS, ORDER_MARKERS};
use crate::application::{decode, encode};
use crate::errors::EngineError;

/// Links an idempotency token to the order it produced. Written in the
/// same batch as the order itself.
#[derive(Serialize, Deserialize)]
struct OrderMarker {
    order_id: String,
}

pub struct CheckoutService<S: DocumentStore> {
    store: Arc<S>,
    pricing: PricingPolicy,
}

impl<S: DocumentStore> CheckoutService<S> {
    pub fn new(store: Arc<S>, pricing: PricingPolicy) -> Self {
        Self { store, pricing }
    }

    async fn placed_order_for(&self, token: &str) -> Result<Option<Order>, EngineError> {
        let Some(doc) = self.store.get(ORDER_MARKERS, token).await? else {
            return Ok(None);
        };
        let marker: OrderMarker = decode(doc)?;
        let order = self
            .store
            .get(ORDERS, &marker.order_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("order {}", marker.order_id)))?;
        Ok(Some(decode(order)?))
    }

    /// Convert a cart into an immutable Pending order.
    ///
    /// The breakdown is recomputed from the cart's stored lines; the order,
    /// its idempotency marker, and the cart deletion commit as one batch.
    /// Callers that retry should pass the `idempotency_token` they observed
    /// on the cart (`revision`); a token that already produced an order
    /// returns that order instead of creating a second one. Without a
    /// caller token the cart's current revision is used.
    pub async fn place_order(
        &self,
        cart_id: &str,
        placed_by: &str,
        shipping_address: Address,
        payment_method: String,
        idempotency_token: Option<String>,
    ) -> Result<Order, EngineError> {
        if let Some(token) = idempotency_token.as_deref() {
            if let Some(order) = self.placed_order_for(token).await? {
                tracing::info!(%order.id, token, "replayed order placement");
                return Ok(order);
            }
        }

        let cart: Cart = match self.store.get(CARTS, cart_id).await? {
            Some(doc) => decode(doc)?,
            // No cart document means nothing was ever added.
            None => return Err(EngineError::EmptyCart),
        };

        let token = match idempotency_token {
            Some(token) => token,
            None => {
                let token = cart.revision.to_string();
                if let Some(order) = self.placed_order_for(&token).await? {
                    return Ok(order);
                }
                token
            }
        };

        let order = Order::from_cart(
            &cart,
            placed_by,
            shipping_address,
            payment_method,
            &self.pricing,
        )?;

        self.store
            .apply_batch(vec![
                WriteOp::put(ORDERS, &order.id.to_string(), encode(&order)?),
                WriteOp::put(
                    ORDER_MARKERS,
                    &token,
                    encode(&OrderMarker {
                        order_id: order.id.to_string(),
                    })?,
                ),
                WriteOp::delete(CARTS, cart_id),
            ])
            .await?;

        tracing::info!(%order.id, owner_id = placed_by, total_cents = order.pricing.total_cents, "placed order");
        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, EngineError> {
        match self.store.get(ORDERS, &id.to_string()).await? {
            Some(doc) => decode(doc),
            None => Err(EngineError::NotFound(format!("order {}", id))),
        }
    }

    /// Orders for one owner, newest first.
    pub async fn list_orders(&self, owner_id: &str) -> Result<Vec<Order>, EngineError> {
        let docs = self
            .store
            .query(ORDERS, Predicate::field_equals("owner_id", json!(owner_id)))
            .await?;
        let mut orders = docs
            .into_iter()
            .map(decode::<Order>)
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, EngineError> {
        let mut order = self.get_order(id).await?;
        order.transition(status)?;
        self.store
            .set(ORDERS, &id.to_string(), encode(&order)?)
            .await?;
        Ok(order)
    }
}
