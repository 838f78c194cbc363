//! End-to-end: HTTP catalog + SQLite storage, including a restart.

mod support;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cartkit_cart::Cart;
use cartkit_core::ProductId;
use cartkit_store::{
    CART_STORAGE_KEY, CartHandle, ChannelNotifier, HttpCatalog, KeyValueStore, MutationOutcome,
    NoticeKind, Notification, SqliteStorage,
};
use tokio::sync::mpsc::UnboundedReceiver;

use support::TestServer;

async fn open(srv: &TestServer, db: &Path) -> (CartHandle, UnboundedReceiver<Notification>) {
    let catalog = HttpCatalog::new(srv.base_url.clone(), Duration::from_secs(5)).unwrap();
    let (notifier, rx) = ChannelNotifier::new();
    let handle = CartHandle::open(
        Arc::new(catalog),
        Arc::new(SqliteStorage::open(db)),
        Arc::new(notifier),
    )
    .await;
    (handle, rx)
}

fn id(raw: u64) -> ProductId {
    ProductId::new(raw)
}

#[tokio::test]
async fn cart_survives_restart() {
    let srv = TestServer::spawn().await;
    srv.state.add_product(1, "Tênis de Caminhada Leve Confortável", 179.9, 3);
    srv.state.add_product(2, "Tênis VR Caminhada Confortável", 139.9, 5);
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cart.db");

    {
        let (cart, mut notices) = open(&srv, &db).await;
        assert!(cart.add_product(id(2)).await.is_committed());
        assert!(cart.add_product(id(1)).await.is_committed());
        assert!(cart.update_product_amount(id(2), 4).await.is_committed());
        assert!(notices.try_recv().is_err());
    }

    let (cart, mut notices) = open(&srv, &db).await;
    let restored = cart.cart();
    let order: Vec<u64> = restored.iter().map(|e| e.product_id().get()).collect();
    assert_eq!(order, vec![2, 1]);
    assert_eq!(restored.amount_of(id(2)), 4);
    assert_eq!(restored.get(id(1)).unwrap().title(), Some("Tênis de Caminhada Leve Confortável"));
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn stored_payload_always_matches_live_cart() {
    let srv = TestServer::spawn().await;
    srv.state.add_product(1, "Shoe", 99.0, 2);
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cart.db");
    let (cart, mut notices) = open(&srv, &db).await;
    let storage = SqliteStorage::open(&db);

    cart.add_product(id(1)).await;
    cart.add_product(id(1)).await;
    let rejected = cart.add_product(id(1)).await;
    assert!(matches!(rejected, MutationOutcome::OutOfStock(_)));
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::OutOfStock);

    cart.update_product_amount(id(1), 1).await;
    cart.remove_product(id(3)).await;
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::RemoveFailed);

    let payload = storage.get(CART_STORAGE_KEY).await.unwrap().unwrap();
    let stored: Cart = serde_json::from_str(&payload).unwrap();
    assert_eq!(*cart.cart(), stored);
    assert_eq!(stored.amount_of(id(1)), 1);
}

#[tokio::test]
async fn stock_drop_on_the_server_blocks_further_adds() {
    let srv = TestServer::spawn().await;
    srv.state.add_product(1, "Shoe", 99.0, 5);
    let dir = tempfile::tempdir().unwrap();
    let (cart, mut notices) = open(&srv, &dir.path().join("cart.db")).await;

    cart.add_product(id(1)).await;
    srv.state.set_stock(1, 1);

    assert!(matches!(
        cart.add_product(id(1)).await,
        MutationOutcome::OutOfStock(_)
    ));
    assert!(matches!(
        cart.update_product_amount(id(1), 2).await,
        MutationOutcome::OutOfStock(_)
    ));
    assert_eq!(cart.cart().amount_of(id(1)), 1);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::OutOfStock);
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::OutOfStock);
}

#[tokio::test]
async fn unknown_product_reports_add_failure() {
    let srv = TestServer::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let (cart, mut notices) = open(&srv, &dir.path().join("cart.db")).await;

    assert!(matches!(
        cart.add_product(id(404)).await,
        MutationOutcome::Failed(_)
    ));
    assert!(cart.cart().is_empty());
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::AddFailed);
}

#[tokio::test]
async fn corrupt_saved_cart_is_replaced_on_next_commit() {
    let srv = TestServer::spawn().await;
    srv.state.add_product(1, "Shoe", 99.0, 5);
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cart.db");
    SqliteStorage::open(&db)
        .set(CART_STORAGE_KEY, "[{\"id\": 1, \"amount\": 0}]")
        .await
        .unwrap();

    let (cart, mut notices) = open(&srv, &db).await;
    assert!(cart.cart().is_empty());
    assert_eq!(notices.try_recv().unwrap().kind, NoticeKind::RestoreFailed);

    assert!(cart.add_product(id(1)).await.is_committed());
    let payload = SqliteStorage::open(&db).get(CART_STORAGE_KEY).await.unwrap().unwrap();
    let stored: Cart = serde_json::from_str(&payload).unwrap();
    assert_eq!(stored.amount_of(id(1)), 1);
}
