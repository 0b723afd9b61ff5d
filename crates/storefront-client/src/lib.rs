use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use storefront_types::domain::cart::{Cart, ProductRef};
use storefront_types::domain::order::{Address, Order, OrderStatus};
use storefront_types::domain::pricing::PriceBreakdown;
use storefront_types::domain::wishlist::{Wishlist, WishlistAction};

#[derive(Clone)]
pub struct StorefrontClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

#[derive(Clone)]
pub struct StorefrontClient {
    base: Url,
    client: reqwest::Client,
}

impl StorefrontClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<StorefrontClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(StorefrontClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    pub async fn get_cart(&self, cart_id: &str) -> anyhow::Result<CartSummary> {
        let res = self
            .client
            .get(self.url(&format!("carts/{cart_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn add_item(
        &self,
        cart_id: &str,
        product: ProductRef,
        quantity: u32,
    ) -> anyhow::Result<Cart> {
        let res = self
            .client
            .post(self.url(&format!("carts/{cart_id}/items"))?)
            .json(&AddItemRequest { product, quantity })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn set_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> anyhow::Result<Cart> {
        let res = self
            .client
            .patch(self.url(&format!("carts/{cart_id}/items/{product_id}"))?)
            .json(&UpdateQuantityRequest { quantity })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> anyhow::Result<Cart> {
        let res = self
            .client
            .delete(self.url(&format!("carts/{cart_id}/items/{product_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn clear_cart(&self, cart_id: &str) -> anyhow::Result<()> {
        self.client
            .delete(self.url(&format!("carts/{cart_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Merge the anonymous cart `cart_id` into `account_id` after login.
    pub async fn merge_cart(&self, cart_id: &str, account_id: &str) -> anyhow::Result<Cart> {
        let res = self
            .client
            .post(self.url(&format!("carts/{cart_id}/merge"))?)
            .json(&MergeCartRequest {
                account_id: account_id.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn place_order(&self, req: PlaceOrderRequest) -> anyhow::Result<Order> {
        let res = self
            .client
            .post(self.url("orders")?)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn get_order(&self, id: &str) -> anyhow::Result<Order> {
        let res = self
            .client
            .get(self.url(&format!("orders/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn list_orders(&self, owner: &str) -> anyhow::Result<Vec<Order>> {
        let res = self
            .client
            .get(self.url(&format!("orders?owner={owner}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update_status(&self, id: &str, status: OrderStatus) -> anyhow::Result<Order> {
        let res = self
            .client
            .patch(self.url(&format!("orders/{id}/status"))?)
            .json(&UpdateStatusRequest { status })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn get_wishlist(&self, owner_id: &str) -> anyhow::Result<Wishlist> {
        let res = self
            .client
            .get(self.url(&format!("wishlists/{owner_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn toggle_wishlist(
        &self,
        owner_id: &str,
        product_id: &str,
    ) -> anyhow::Result<WishlistAction> {
        let res = self
            .client
            .post(self.url(&format!("wishlists/{owner_id}/toggle"))?)
            .json(&ToggleWishlistRequest {
                product_id: product_id.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        let body: ToggleWishlistResponse = res.json().await?;
        Ok(body.action)
    }
}

impl StorefrontClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<StorefrontClient> {
        if let Some(client) = self.client {
            return Ok(StorefrontClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(StorefrontClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CartSummary {
    pub cart: Cart,
    pub pricing: PriceBreakdown,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddItemRequest {
    pub product: ProductRef,
    pub quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct UpdateQuantityRequest {
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct MergeCartRequest {
    account_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlaceOrderRequest {
    pub cart_id: String,
    pub placed_by: String,
    pub shipping_address: Address,
    pub payment_method: String,
    pub idempotency_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct UpdateStatusRequest {
    status: OrderStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ToggleWishlistRequest {
    product_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ToggleWishlistResponse {
    action: WishlistAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use storefront_types::domain::cart::CartLine;
    use storefront_types::domain::order::OrderLine;
    use storefront_types::domain::pricing::PriceBreakdown;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new("user-1");
        cart.lines.push(CartLine {
            product_id: "p1".into(),
            name: "Widget".into(),
            unit_price_cents: 1000,
            image_ref: None,
            quantity: 2,
        });
        cart
    }

    fn sample_order() -> Order {
        Order {
            id: uuid::Uuid::new_v4(),
            owner_id: "user-1".into(),
            lines: vec![OrderLine {
                product_id: "p1".into(),
                name: "Widget".into(),
                unit_price_cents: 1000,
                image_ref: None,
                quantity: 2,
            }],
            shipping_address: Address {
                name: "User".into(),
                line1: "1 Somewhere".into(),
                line2: None,
                city: "Town".into(),
                postal_code: "12345".into(),
                country: "US".into(),
                phone: None,
            },
            payment_method: "card".into(),
            pricing: PriceBreakdown {
                subtotal_cents: 2000,
                shipping_cents: 499,
                discount_cents: 0,
                total_cents: 2499,
            },
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn add_item_and_place_order() {
        let server = MockServer::start();
        let cart = sample_cart();
        let order = sample_order();

        let add_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/carts/user-1/items")
                .json_body_obj(&AddItemRequest {
                    product: ProductRef {
                        product_id: "p1".into(),
                        name: "Widget".into(),
                        unit_price_cents: 1000,
                        image_ref: None,
                    },
                    quantity: 2,
                });
            then.status(200).json_body_obj(&cart);
        });

        let place_mock = server.mock(|when, then| {
            when.method(POST).path("/orders");
            then.status(201).json_body_obj(&order);
        });

        let client = StorefrontClient::new(&server.base_url()).unwrap();
        let got = client
            .add_item(
                "user-1",
                ProductRef {
                    product_id: "p1".into(),
                    name: "Widget".into(),
                    unit_price_cents: 1000,
                    image_ref: None,
                },
                2,
            )
            .await
            .unwrap();
        assert_eq!(got.lines[0].quantity, 2);

        let placed = client
            .place_order(PlaceOrderRequest {
                cart_id: "user-1".into(),
                placed_by: "user-1".into(),
                shipping_address: order.shipping_address.clone(),
                payment_method: "card".into(),
                idempotency_token: None,
            })
            .await
            .unwrap();
        assert_eq!(placed.id, order.id);
        assert_eq!(placed.pricing.total_cents, 2499);

        add_mock.assert();
        place_mock.assert();
    }

    #[tokio::test]
    async fn orders_and_wishlist_round_trip() {
        let server = MockServer::start();
        let order = sample_order();

        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/orders")
                .query_param("owner", "user-1");
            then.status(200).json_body_obj(&vec![order.clone()]);
        });

        let update_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path(format!("/orders/{}/status", order.id))
                .json_body_obj(&UpdateStatusRequest {
                    status: OrderStatus::Processing,
                });
            let mut updated = order.clone();
            updated.status = OrderStatus::Processing;
            then.status(200).json_body_obj(&updated);
        });

        let toggle_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/wishlists/user-1/toggle")
                .json_body_obj(&ToggleWishlistRequest {
                    product_id: "p1".into(),
                });
            then.status(200).json_body_obj(&ToggleWishlistResponse {
                action: WishlistAction::Added,
            });
        });

        let client = StorefrontClient::new(&server.base_url()).unwrap();

        let listed = client.list_orders("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);

        let updated = client
            .update_status(&order.id.to_string(), OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        let action = client.toggle_wishlist("user-1", "p1").await.unwrap();
        assert_eq!(action, WishlistAction::Added);

        list_mock.assert();
        update_mock.assert();
        toggle_mock.assert();
    }
}
