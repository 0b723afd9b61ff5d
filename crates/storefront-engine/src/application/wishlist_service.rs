use std::sync::Arc;

use storefront_types::domain::wishlist::{Wishlist, WishlistAction};
use storefront_types::ports::document_store::DocumentStore;

use crate::application::collections::WISHLISTS;
use crate::application::{decode, encode};
use crate::errors::EngineError;

pub struct WishlistService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> WishlistService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get(&self, owner_id: &str) -> Result<Wishlist, EngineError> {
        match self.store.get(WISHLISTS, owner_id).await? {
            Some(doc) => decode(doc),
            None => Ok(Wishlist::new(owner_id)),
        }
    }

    /// Membership is read fresh from the store on every call, so rapid
    /// repeated toggles settle on whatever the store last saw rather than
    /// on stale in-process state.
    pub async fn toggle(
        &self,
        owner_id: &str,
        product_id: &str,
    ) -> Result<WishlistAction, EngineError> {
        let mut list = self.get(owner_id).await?;
        let action = list.toggle(product_id);
        self.store.set(WISHLISTS, owner_id, encode(&list)?).await?;
        Ok(action)
    }
}
