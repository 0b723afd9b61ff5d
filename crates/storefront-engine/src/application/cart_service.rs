use std::sync::Arc;

use serde::Serialize;
use storefront_types::domain::cart::{Cart, ProductRef};
use storefront_types::domain::pricing::{compute_breakdown, PriceBreakdown, PricingPolicy};
use storefront_types::ports::document_store::{DocumentStore, WriteOp};

use crate::application::collections::CARTS;
use crate::application::{decode, encode};
use crate::errors::EngineError;

/// Cart read model: the stored lines plus an advisory breakdown. The
/// breakdown shown here is never what an order is priced from; placement
/// recomputes its own.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub cart: Cart,
    pub pricing: PriceBreakdown,
}

pub struct CartService<S: DocumentStore> {
    store: Arc<S>,
    pricing: PricingPolicy,
}

impl<S: DocumentStore> CartService<S> {
    pub fn new(store: Arc<S>, pricing: PricingPolicy) -> Self {
        Self { store, pricing }
    }

    async fn load(&self, cart_id: &str) -> Result<Option<Cart>, EngineError> {
        match self.store.get(CARTS, cart_id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), EngineError> {
        self.store.set(CARTS, &cart.id, encode(cart)?).await?;
        Ok(())
    }

    /// A missing cart reads as an empty one; nothing is persisted until
    /// the first add.
    pub async fn get_cart(&self, cart_id: &str) -> Result<CartSummary, EngineError> {
        let cart = self
            .load(cart_id)
            .await?
            .unwrap_or_else(|| Cart::new(cart_id));
        let pricing = compute_breakdown(&cart.lines, &self.pricing);
        Ok(CartSummary { cart, pricing })
    }

    pub async fn add_item(
        &self,
        cart_id: &str,
        product: ProductRef,
        quantity: u32,
    ) -> Result<Cart, EngineError> {
        let mut cart = self
            .load(cart_id)
            .await?
            .unwrap_or_else(|| Cart::new(cart_id));
        cart.add_line(product, quantity)?;
        self.save(&cart).await?;
        Ok(cart)
    }

    pub async fn set_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<Cart, EngineError> {
        let mut cart = self
            .load(cart_id)
            .await?
            .ok_or_else(|| EngineError::LineNotFound(product_id.to_string()))?;
        cart.set_quantity(product_id, quantity)?;
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Removing a line that is not there (or from a cart that does not
    /// exist) succeeds and changes nothing.
    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> Result<Cart, EngineError> {
        let mut cart = match self.load(cart_id).await? {
            Some(cart) => cart,
            None => return Ok(Cart::new(cart_id)),
        };
        if cart.remove_line(product_id) {
            self.save(&cart).await?;
        }
        Ok(cart)
    }

    pub async fn clear(&self, cart_id: &str) -> Result<(), EngineError> {
        self.store.delete(CARTS, cart_id).await?;
        Ok(())
    }

    /// Fold the anonymous session cart into the account cart at login.
    /// The merged result and the deletion of the anonymous cart land in
    /// one store batch, so a failed write leaves both carts untouched.
    ///
    /// Run once per authentication; the caller holds the one-shot flag.
    pub async fn merge_on_login(
        &self,
        session_id: &str,
        account_id: &str,
    ) -> Result<Cart, EngineError> {
        let anonymous = self.load(session_id).await?;
        let mut account = self
            .load(account_id)
            .await?
            .unwrap_or_else(|| Cart::new(account_id));

        let Some(anonymous) = anonymous else {
            return Ok(account);
        };

        account.merge_from(&anonymous);
        self.store
            .apply_batch(vec![
                WriteOp::put(CARTS, account_id, encode(&account)?),
                WriteOp::delete(CARTS, session_id),
            ])
            .await?;
        tracing::info!(session_id, account_id, "merged anonymous cart into account cart");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_store::memory::MemoryStore;

    fn service() -> CartService<MemoryStore> {
        CartService::new(Arc::new(MemoryStore::new()), PricingPolicy::default())
    }

    fn widget() -> ProductRef {
        ProductRef {
            product_id: "p1".into(),
            name: "Widget".into(),
            unit_price_cents: 1000,
            image_ref: None,
        }
    }

    #[tokio::test]
    async fn add_creates_cart_then_merges_lines() {
        let svc = service();
        let cart = svc.add_item("session-1", widget(), 2).await.unwrap();
        assert_eq!(cart.lines.len(), 1);

        let cart = svc.add_item("session-1", widget(), 1).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);

        let summary = svc.get_cart("session-1").await.unwrap();
        assert_eq!(summary.pricing.subtotal_cents, 3000);
        assert_eq!(summary.pricing.shipping_cents, 499);
    }

    #[tokio::test]
    async fn add_rejects_zero_quantity() {
        let svc = service();
        let res = svc.add_item("session-1", widget(), 0).await;
        assert!(matches!(res, Err(EngineError::InvalidQuantity)));
        // Nothing was persisted for the failed add.
        let summary = svc.get_cart("session-1").await.unwrap();
        assert!(summary.cart.is_empty());
    }

    #[tokio::test]
    async fn set_quantity_clamps_and_surfaces_missing_lines() {
        let svc = service();
        svc.add_item("user-1", widget(), 3).await.unwrap();

        let cart = svc.set_quantity("user-1", "p1", 0).await.unwrap();
        assert_eq!(cart.lines[0].quantity, 1);

        let missing = svc.set_quantity("user-1", "p9", 2).await;
        assert!(matches!(missing, Err(EngineError::LineNotFound(_))));

        let no_cart = svc.set_quantity("user-2", "p1", 2).await;
        assert!(matches!(no_cart, Err(EngineError::LineNotFound(_))));
    }

    #[tokio::test]
    async fn remove_is_idempotent_across_calls() {
        let svc = service();
        svc.add_item("user-1", widget(), 1).await.unwrap();

        let cart = svc.remove_item("user-1", "p1").await.unwrap();
        assert!(cart.is_empty());
        let cart = svc.remove_item("user-1", "p1").await.unwrap();
        assert!(cart.is_empty());
        let cart = svc.remove_item("no-such-cart", "p1").await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn clear_deletes_the_cart_document() {
        let svc = service();
        svc.add_item("user-1", widget(), 2).await.unwrap();
        svc.clear("user-1").await.unwrap();
        let summary = svc.get_cart("user-1").await.unwrap();
        assert!(summary.cart.is_empty());
    }

    #[tokio::test]
    async fn merge_on_login_sums_and_drops_the_session_cart() {
        let svc = service();
        svc.add_item("session-1", widget(), 1).await.unwrap();
        svc.add_item("user-1", widget(), 2).await.unwrap();
        svc.add_item(
            "user-1",
            ProductRef {
                product_id: "p2".into(),
                name: "Gadget".into(),
                unit_price_cents: 700,
                image_ref: None,
            },
            1,
        )
        .await
        .unwrap();

        let merged = svc.merge_on_login("session-1", "user-1").await.unwrap();
        assert_eq!(merged.line("p1").unwrap().quantity, 3);
        assert_eq!(merged.line("p2").unwrap().quantity, 1);

        // The anonymous cart is gone; the account cart holds the merge.
        let session = svc.get_cart("session-1").await.unwrap();
        assert!(session.cart.is_empty());
        let account = svc.get_cart("user-1").await.unwrap();
        assert_eq!(account.cart.lines.len(), 2);
    }

    #[tokio::test]
    async fn merge_without_session_cart_is_a_no_op() {
        let svc = service();
        svc.add_item("user-1", widget(), 2).await.unwrap();
        let merged = svc.merge_on_login("session-9", "user-1").await.unwrap();
        assert_eq!(merged.line("p1").unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn repeated_login_does_not_double_count() {
        let svc = service();
        svc.add_item("session-1", widget(), 1).await.unwrap();
        svc.add_item("user-1", widget(), 2).await.unwrap();

        svc.merge_on_login("session-1", "user-1").await.unwrap();
        // The session cart was deleted with the first merge, so a second
        // login with the same session finds nothing to fold in.
        let again = svc.merge_on_login("session-1", "user-1").await.unwrap();
        assert_eq!(again.line("p1").unwrap().quantity, 3);
    }
}
