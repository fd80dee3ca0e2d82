use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem},
    traits::{CheckoutGatewayError, InsertOrderResult},
};

/// Inserts the order and its line items, reporting `AlreadyExists` if an order for the same payment session
/// is already stored.
///
/// Idempotency rides on the UNIQUE constraint on `orders.payment_session_id`: the insert itself detects the
/// duplicate, so two concurrent deliveries of the same session cannot both pass a pre-check and both insert.
/// Call this inside a transaction so the order row and its items land atomically.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, CheckoutGatewayError> {
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (payment_session_id, user_id, total_price, paid)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (payment_session_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(&order.payment_session_id)
    .bind(order.user_id)
    .bind(order.total_price)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        None => Ok(InsertOrderResult::AlreadyExists(order.payment_session_id)),
        Some(o) => {
            for item in &order.items {
                insert_order_item(o.id, item, &mut *conn).await?;
            }
            debug!("📝️ Order [{}] inserted with id {}", o.payment_session_id, o.id);
            Ok(InsertOrderResult::Inserted(o))
        },
    }
}

async fn insert_order_item(order_id: i64, item: &NewOrderItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)")
        .bind(order_id)
        .bind(item.product_id)
        .bind(i64::from(item.quantity))
        .bind(item.unit_price)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

/// Returns `false` if no order with the given id exists. Line items go with the order (cascade).
pub async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
