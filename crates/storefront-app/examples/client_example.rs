///  To run :
///  cargo r --example client_example
use storefront_client::{PlaceOrderRequest, StorefrontClient};
use storefront_engine::inbound::http::{HttpServer, HttpServerConfig, Services};
use storefront_store::build_store;
use storefront_types::domain::cart::ProductRef;
use storefront_types::domain::order::{Address, OrderStatus};
use storefront_types::domain::pricing::PricingPolicy;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Start server on ephemeral port.
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("storefront.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let store = build_store(Some(&db_url)).await?;
    let services = Services::new(store, PricingPolicy::default());
    let server = HttpServer::new(
        services,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Browse anonymously, then log in and merge.
    let client = StorefrontClient::new(&addr)?;
    let cart = client
        .add_item(
            "session-42",
            ProductRef {
                product_id: "p1".into(),
                name: "Widget".into(),
                unit_price_cents: 1000,
                image_ref: None,
            },
            2,
        )
        .await?;
    println!("Anonymous cart holds {} line(s)", cart.lines.len());

    let merged = client.merge_cart("session-42", "user-42").await?;
    println!("Merged into account cart: {} line(s)", merged.lines.len());

    let summary = client.get_cart("user-42").await?;
    println!(
        "Cart total {} cents (shipping {})",
        summary.pricing.total_cents, summary.pricing.shipping_cents
    );

    let order = client
        .place_order(PlaceOrderRequest {
            cart_id: "user-42".into(),
            placed_by: "user-42".into(),
            shipping_address: Address {
                name: "Example".into(),
                line1: "1 Example Road".into(),
                line2: None,
                city: "Exampleton".into(),
                postal_code: "99999".into(),
                country: "US".into(),
                phone: None,
            },
            payment_method: "card".into(),
            idempotency_token: Some(summary.cart.revision.to_string()),
        })
        .await?;
    println!("Placed order id={} total={}", order.id, order.pricing.total_cents);
    assert_eq!(order.status, OrderStatus::Pending);

    let updated = client
        .update_status(&order.id.to_string(), OrderStatus::Processing)
        .await?;
    println!("Updated status={:?}", updated.status);

    let listed = client.list_orders("user-42").await?;
    println!("Account has {} order(s)", listed.len());

    handle.abort();
    Ok(())
}
