use std::sync::Arc;

use storefront_types::domain::product::Product;
use storefront_types::ports::document_store::{DocumentStore, Predicate};

use crate::application::collections::PRODUCTS;
use crate::application::{decode, encode};
use crate::errors::EngineError;

/// Plain catalog CRUD. Carts snapshot product data at add time, so edits
/// here only affect future adds.
pub struct CatalogService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn upsert(&self, product: Product) -> Result<Product, EngineError> {
        self.store
            .set(PRODUCTS, &product.id, encode(&product)?)
            .await?;
        Ok(product)
    }

    pub async fn get(&self, product_id: &str) -> Result<Product, EngineError> {
        match self.store.get(PRODUCTS, product_id).await? {
            Some(doc) => decode(doc),
            None => Err(EngineError::NotFound(format!("product {}", product_id))),
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, EngineError> {
        let docs = self.store.query(PRODUCTS, Predicate::All).await?;
        let mut products = docs
            .into_iter()
            .map(decode::<Product>)
            .collect::<Result<Vec<_>, _>>()?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn delete(&self, product_id: &str) -> Result<(), EngineError> {
        self.store.delete(PRODUCTS, product_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_store::memory::MemoryStore;

    fn widget() -> Product {
        Product {
            id: "p1".into(),
            name: "Widget".into(),
            description: Some("A widget".into()),
            unit_price_cents: 1000,
            image_ref: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_get_list_delete() {
        let svc = CatalogService::new(Arc::new(MemoryStore::new()));
        svc.upsert(widget()).await.unwrap();

        let fetched = svc.get("p1").await.unwrap();
        assert_eq!(fetched.unit_price_cents, 1000);

        let listed = svc.list().await.unwrap();
        assert_eq!(listed.len(), 1);

        svc.delete("p1").await.unwrap();
        assert!(matches!(svc.get("p1").await, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn catalog_snapshot_feeds_the_cart() {
        use crate::application::cart_service::CartService;
        use storefront_types::domain::pricing::PricingPolicy;

        let store = Arc::new(MemoryStore::new());
        let catalog = CatalogService::new(store.clone());
        let carts = CartService::new(store, PricingPolicy::default());

        let product = catalog.upsert(widget()).await.unwrap();
        let cart = carts
            .add_item("user-1", product.to_ref(), 2)
            .await
            .unwrap();
        assert_eq!(cart.lines[0].name, "Widget");
        assert_eq!(cart.lines[0].unit_price_cents, 1000);
    }
}
