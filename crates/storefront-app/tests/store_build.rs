use std::env;
use storefront_store::{build_store, Store};
use storefront_types::ports::document_store::{DocumentStore, Predicate};

#[tokio::test]
async fn builds_sqlite_store_from_env() {
    // Use a temp DB path for isolation.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("storefront-test.db");
    let url = format!("sqlite://{}", db_path.display());
    env::set_var("DATABASE_URL", &url);

    let store: Store = build_store(Some(&url)).await.expect("build store");
    // basic sanity: an empty collection queries as empty
    let carts = store.query("carts", Predicate::All).await.expect("query");
    assert!(carts.is_empty());
}
