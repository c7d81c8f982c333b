use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use zen_shop_api::{
    db::{DbPool, MIGRATOR},
    error::AppError,
    models::{Order, OrderStatus},
    notify::{self, NoopGateway, NotificationGateway, NotifyError, OrderNotification},
    routes::{cart::AddToCartRequest, orders::PlaceOrderRequest},
    services::{cart_service, order_service},
};

#[derive(Default)]
struct RecordingGateway {
    notes: Mutex<Vec<OrderNotification>>,
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn notify_order(&self, note: &OrderNotification) -> Result<(), NotifyError> {
        self.notes.lock().unwrap().push(note.clone());
        Ok(())
    }
}

struct FailingGateway;

#[async_trait]
impl NotificationGateway for FailingGateway {
    async fn notify_order(&self, _note: &OrderNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Api("forced failure".to_string()))
    }
}

async fn setup_pool() -> anyhow::Result<DbPool> {
    // Same options as db::create_pool, on a single in-memory connection.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

async fn seed_product(pool: &DbPool, name: &str, price: i64) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO products (store_id, name, description, price, category, sizes)
        VALUES (1, ?, 'test product', ?, 'tee', 'S,M,L,XL')
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

fn add_request(product_id: i64, size: &str, quantity: i64) -> AddToCartRequest {
    AddToCartRequest {
        product_id: Some(product_id),
        size: Some(size.to_string()),
        quantity: Some(quantity),
    }
}

fn order_request(items: serde_json::Value, total: i64) -> PlaceOrderRequest {
    PlaceOrderRequest {
        user_name: Some("Alice".to_string()),
        user_phone: Some("+100".to_string()),
        user_address: None,
        items: Some(items),
        total: Some(total),
    }
}

async fn cart_count(pool: &DbPool, user_id: &str) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// P1: the order row is durable before the cart rows go away; a failed insert
// leaves the cart untouched and creates no order.
#[tokio::test]
async fn order_durability_precedes_cart_clear() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 2)).await?;

    let items = serde_json::json!([{ "product_id": product_id, "quantity": 2, "price": 2990 }]);
    let order_id =
        order_service::place_order(&pool, Arc::new(NoopGateway), "u1", order_request(items, 5980))
            .await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(cart_count(&pool, "u1").await?, 0);
    Ok(())
}

#[tokio::test]
async fn failed_persist_leaves_cart_untouched() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 1)).await?;

    // Storage fault: the orders table is gone.
    sqlx::query("DROP TABLE orders").execute(&pool).await?;

    let items = serde_json::json!([{ "product_id": product_id, "quantity": 1 }]);
    let err =
        order_service::place_order(&pool, Arc::new(NoopGateway), "u1", order_request(items, 2990))
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::DbError(_)));
    assert_eq!(cart_count(&pool, "u1").await?, 1);
    Ok(())
}

// P2: the submitted total is stored verbatim, never recomputed server-side.
#[tokio::test]
async fn submitted_total_is_stored_verbatim() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;

    let items = serde_json::json!([{ "product_id": product_id, "quantity": 1, "price": 2990 }]);
    let order_id = order_service::place_order(
        &pool,
        Arc::new(NoopGateway),
        "u1",
        order_request(items, 999_999),
    )
    .await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(order.total, 999_999);
    Ok(())
}

// P3: the clear is unconditional; a row added between the snapshot read and
// the checkout submit is wiped too.
#[tokio::test]
async fn cart_clear_is_unconditional() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 1)).await?;

    let snapshot = cart_service::list_cart(&pool, "u1").await?;
    assert_eq!(snapshot.len(), 1);

    // Concurrent add from a second tab, after the client read its cart.
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "L", 3)).await?;

    let items = serde_json::to_value(&snapshot)?;
    order_service::place_order(&pool, Arc::new(NoopGateway), "u1", order_request(items, 2990))
        .await?;

    assert!(cart_service::list_cart(&pool, "u1").await?.is_empty());
    Ok(())
}

// P4: a failing gateway cannot block or fail the checkout.
#[tokio::test]
async fn notification_failure_does_not_block_checkout() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;

    let items = serde_json::json!([{ "product_id": product_id, "quantity": 1 }]);
    let order_id = order_service::place_order(
        &pool,
        Arc::new(FailingGateway),
        "u1",
        order_request(items, 2990),
    )
    .await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(order.status, OrderStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn checkout_dispatches_notification_with_item_count() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;

    let recorder = Arc::new(RecordingGateway::default());
    let items = serde_json::json!([
        { "product_id": product_id, "quantity": 2 },
        { "product_id": product_id, "quantity": 1 },
    ]);
    let order_id =
        order_service::place_order(&pool, recorder.clone(), "u1", order_request(items, 8970))
            .await?;

    // The dispatch runs detached; give the task queue a chance to drain.
    for _ in 0..50 {
        if !recorder.notes.lock().unwrap().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }

    let notes = recorder.notes.lock().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].order_id, order_id);
    assert_eq!(notes[0].item_count, 3);
    assert_eq!(notes[0].total, 8970);
    assert_eq!(notes[0].user_name.as_deref(), Some("Alice"));
    Ok(())
}

#[tokio::test]
async fn dispatch_surfaces_outcome_only_to_logs() -> anyhow::Result<()> {
    let note = OrderNotification {
        order_id: 1,
        user_id: "u1".to_string(),
        user_name: None,
        user_phone: None,
        total: 100,
        item_count: 1,
    };
    // The handle resolves even when delivery fails.
    notify::dispatch(Arc::new(FailingGateway), note).await?;
    Ok(())
}

// P5: clearing an empty cart is a no-op success.
#[tokio::test]
async fn clearing_empty_cart_is_noop() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    cart_service::clear_cart(&pool, "nobody").await?;
    cart_service::clear_cart(&pool, "nobody").await?;
    assert!(cart_service::list_cart(&pool, "nobody").await?.is_empty());
    Ok(())
}

// P6: removal is scoped to the owning user.
#[tokio::test]
async fn remove_requires_ownership() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "alice", add_request(product_id, "M", 1)).await?;

    let items = cart_service::list_cart(&pool, "alice").await?;
    let item_id = items[0].id;

    let err = cart_service::remove_from_cart(&pool, "bob", item_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(cart_service::list_cart(&pool, "alice").await?.len(), 1);

    cart_service::remove_from_cart(&pool, "alice", item_id).await?;
    assert!(cart_service::list_cart(&pool, "alice").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_items_or_total_rejects_checkout() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 1)).await?;

    for payload in [
        PlaceOrderRequest {
            user_name: None,
            user_phone: None,
            user_address: None,
            items: None,
            total: Some(100),
        },
        PlaceOrderRequest {
            user_name: None,
            user_phone: None,
            user_address: None,
            items: Some(serde_json::Value::Null),
            total: Some(100),
        },
        PlaceOrderRequest {
            user_name: None,
            user_phone: None,
            user_address: None,
            items: Some(serde_json::json!([])),
            total: None,
        },
    ] {
        let err = order_service::place_order(&pool, Arc::new(NoopGateway), "u1", payload)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await?;
    assert_eq!(orders, 0);
    assert_eq!(cart_count(&pool, "u1").await?, 1);
    Ok(())
}

#[tokio::test]
async fn cart_list_reflects_current_product_price() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 1)).await?;

    sqlx::query("UPDATE products SET price = ? WHERE id = ?")
        .bind(3490)
        .bind(product_id)
        .execute(&pool)
        .await?;

    let items = cart_service::list_cart(&pool, "u1").await?;
    assert_eq!(items[0].price, 3490);
    Ok(())
}

#[tokio::test]
async fn add_to_cart_requires_product_and_size() -> anyhow::Result<()> {
    let pool = setup_pool().await?;

    let err = cart_service::add_to_cart(
        &pool,
        "u1",
        AddToCartRequest {
            product_id: None,
            size: Some("M".to_string()),
            quantity: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::add_to_cart(
        &pool,
        "u1",
        AddToCartRequest {
            product_id: Some(1),
            size: None,
            quantity: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(cart_count(&pool, "u1").await?, 0);
    Ok(())
}

#[tokio::test]
async fn repeated_adds_create_separate_rows() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 1)).await?;
    cart_service::add_to_cart(&pool, "u1", add_request(product_id, "M", 1)).await?;

    let items = cart_service::list_cart(&pool, "u1").await?;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].quantity, 1);
    Ok(())
}

#[tokio::test]
async fn status_update_enforces_closed_enum() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;
    let items = serde_json::json!([{ "product_id": product_id, "quantity": 1 }]);
    let order_id =
        order_service::place_order(&pool, Arc::new(NoopGateway), "u1", order_request(items, 2990))
            .await?;

    let err = order_service::update_order_status(&pool, order_id, "shipped")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::update_order_status(&pool, 9999, "completed")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    order_service::update_order_status(&pool, order_id, "completed").await?;
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(order.status, OrderStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn orders_list_newest_first() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let product_id = seed_product(&pool, "Tee", 2990).await?;

    for total in [100, 200, 300] {
        let items = serde_json::json!([{ "product_id": product_id, "quantity": 1 }]);
        order_service::place_order(&pool, Arc::new(NoopGateway), "u1", order_request(items, total))
            .await?;
    }

    let orders = order_service::list_orders(&pool, "u1").await?;
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0].total, 300);
    assert_eq!(orders[2].total, 100);

    assert!(order_service::list_orders(&pool, "nobody").await?.is_empty());
    Ok(())
}
