use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    serve, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::cart_service::{CartService, CartSummary};
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::wishlist_service::WishlistService;
use crate::errors::EngineError;
use storefront_types::domain::cart::{Cart, ProductRef};
use storefront_types::domain::order::{Address, Order, OrderStatus};
use storefront_types::domain::pricing::PricingPolicy;
use storefront_types::domain::product::Product;
use storefront_types::domain::wishlist::{Wishlist, WishlistAction};
use storefront_types::ports::document_store::DocumentStore;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

/// The engine services behind the HTTP surface, sharing one store handle.
pub struct Services<S: DocumentStore> {
    pub carts: CartService<S>,
    pub checkout: CheckoutService<S>,
    pub wishlists: WishlistService<S>,
    pub catalog: CatalogService<S>,
}

impl<S: DocumentStore> Services<S> {
    pub fn new(store: S, pricing: PricingPolicy) -> Self {
        let store = Arc::new(store);
        Self {
            carts: CartService::new(store.clone(), pricing.clone()),
            checkout: CheckoutService::new(store.clone(), pricing),
            wishlists: WishlistService::new(store.clone()),
            catalog: CatalogService::new(store),
        }
    }
}

pub struct HttpServer<S: DocumentStore> {
    pub services: Arc<Services<S>>,
    pub config: HttpServerConfig,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product: ProductRef,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct MergeCartRequest {
    pub account_id: String,
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub cart_id: String,
    pub placed_by: String,
    pub shipping_address: Address,
    pub payment_method: String,
    pub idempotency_token: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ListOrdersParams {
    pub owner: String,
}

#[derive(Deserialize)]
pub struct ToggleWishlistRequest {
    pub product_id: String,
}

#[derive(Serialize)]
pub struct ToggleWishlistResponse {
    pub action: WishlistAction,
}

#[derive(Deserialize)]
pub struct UpsertProductRequest {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub image_ref: Option<String>,
}

impl<S> HttpServer<S>
where
    S: DocumentStore,
{
    pub async fn new(services: Services<S>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            services: Arc::new(services),
            config,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let services = self.services.clone();
        let app = Router::new()
            .route("/health", get(health))
            .route("/carts/{cart_id}", get(get_cart::<S>))
            .route("/carts/{cart_id}", delete(clear_cart::<S>))
            .route("/carts/{cart_id}/items", post(add_item::<S>))
            .route(
                "/carts/{cart_id}/items/{product_id}",
                patch(set_quantity::<S>),
            )
            .route(
                "/carts/{cart_id}/items/{product_id}",
                delete(remove_item::<S>),
            )
            .route("/carts/{cart_id}/merge", post(merge_cart::<S>))
            .route("/orders", post(place_order::<S>))
            .route("/orders", get(list_orders::<S>))
            .route("/orders/{id}", get(get_order::<S>))
            .route("/orders/{id}/status", patch(update_status::<S>))
            .route("/wishlists/{owner_id}", get(get_wishlist::<S>))
            .route("/wishlists/{owner_id}/toggle", post(toggle_wishlist::<S>))
            .route("/products", post(upsert_product::<S>))
            .route("/products", get(list_products::<S>))
            .route("/products/{id}", get(get_product::<S>))
            .route("/products/{id}", delete(delete_product::<S>))
            .layer(trace_layer)
            .with_state(services);

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn get_cart<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartSummary>, EngineError> {
    let summary = services.carts.get_cart(&cart_id).await?;
    Ok(Json(summary))
}

async fn add_item<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(cart_id): Path<String>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<Cart>, EngineError> {
    let cart = services
        .carts
        .add_item(&cart_id, payload.product, payload.quantity)
        .await?;
    Ok(Json(cart))
}

async fn set_quantity<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<Json<Cart>, EngineError> {
    let cart = services
        .carts
        .set_quantity(&cart_id, &product_id, payload.quantity)
        .await?;
    Ok(Json(cart))
}

async fn remove_item<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Result<Json<Cart>, EngineError> {
    let cart = services.carts.remove_item(&cart_id, &product_id).await?;
    Ok(Json(cart))
}

async fn clear_cart<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(cart_id): Path<String>,
) -> Result<axum::http::StatusCode, EngineError> {
    services.carts.clear(&cart_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn merge_cart<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(cart_id): Path<String>,
    Json(payload): Json<MergeCartRequest>,
) -> Result<Json<Cart>, EngineError> {
    let cart = services
        .carts
        .merge_on_login(&cart_id, &payload.account_id)
        .await?;
    Ok(Json(cart))
}

async fn place_order<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<Order>), EngineError> {
    let order = services
        .checkout
        .place_order(
            &payload.cart_id,
            &payload.placed_by,
            payload.shipping_address,
            payload.payment_method,
            payload.idempotency_token,
        )
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(order)))
}

async fn get_order<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, EngineError> {
    let uuid =
        Uuid::parse_str(&id).map_err(|_| EngineError::NotFound(format!("order {}", id)))?;
    let order = services.checkout.get_order(uuid).await?;
    Ok(Json(order))
}

async fn list_orders<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>, EngineError> {
    let list = services.checkout.list_orders(&params.owner).await?;
    Ok(Json(list))
}

async fn update_status<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, EngineError> {
    let uuid =
        Uuid::parse_str(&id).map_err(|_| EngineError::NotFound(format!("order {}", id)))?;
    let updated = services.checkout.update_status(uuid, payload.status).await?;
    Ok(Json(updated))
}

async fn get_wishlist<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(owner_id): Path<String>,
) -> Result<Json<Wishlist>, EngineError> {
    let list = services.wishlists.get(&owner_id).await?;
    Ok(Json(list))
}

async fn toggle_wishlist<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(owner_id): Path<String>,
    Json(payload): Json<ToggleWishlistRequest>,
) -> Result<Json<ToggleWishlistResponse>, EngineError> {
    let action = services
        .wishlists
        .toggle(&owner_id, &payload.product_id)
        .await?;
    Ok(Json(ToggleWishlistResponse { action }))
}

async fn upsert_product<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Json(payload): Json<UpsertProductRequest>,
) -> Result<(axum::http::StatusCode, Json<Product>), EngineError> {
    let now = Utc::now();
    let product = services
        .catalog
        .upsert(Product {
            id: payload.id,
            name: payload.name,
            description: payload.description,
            unit_price_cents: payload.unit_price_cents,
            image_ref: payload.image_ref,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(product)))
}

async fn get_product<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, EngineError> {
    let product = services.catalog.get(&id).await?;
    Ok(Json(product))
}

async fn list_products<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
) -> Result<Json<Vec<Product>>, EngineError> {
    let list = services.catalog.list().await?;
    Ok(Json(list))
}

async fn delete_product<S: DocumentStore>(
    State(services): State<Arc<Services<S>>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, EngineError> {
    services.catalog.delete(&id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
