use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Money, NewOrderLine, Order, OrderDetail, OrderStatusType, ShippingDetails},
    traits::{CommerceError, OrderWithDetails},
};

/// Writes a `Pending` order and one detail row per line. The order total is the sum of the line subtotals.
///
/// This is not atomic. Embed the call in a transaction, together with the stock reservations for the same lines.
pub async fn insert_order_with_details(
    user_id: i64,
    lines: &[NewOrderLine],
    shipping: &ShippingDetails,
    conn: &mut SqliteConnection,
) -> Result<OrderWithDetails, CommerceError> {
    let subtotals = lines
        .iter()
        .map(|l| l.subtotal().ok_or(CommerceError::InvalidQuantity(l.quantity)))
        .collect::<Result<Vec<Money>, _>>()?;
    let total = subtotals
        .iter()
        .try_fold(0i64, |acc, s| acc.checked_add(s.value()))
        .map(Money::from)
        .ok_or_else(|| CommerceError::DatabaseError("Order total overflows".to_string()))?;
    let order = insert_order(user_id, total, shipping, &mut *conn).await?;
    let mut details = Vec::with_capacity(lines.len());
    for (line, subtotal) in lines.iter().zip(subtotals) {
        let detail = insert_detail(order.id, line, subtotal, &mut *conn).await?;
        details.push(detail);
    }
    debug!("🗃️ Order #{} for user #{user_id} saved with {} lines. Total {total}", order.id, details.len());
    Ok(OrderWithDetails::new(order, details))
}

async fn insert_order(
    user_id: i64,
    total: Money,
    shipping: &ShippingDetails,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (user_id, status, total_amount, recipient_name, phone, address, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(OrderStatusType::Pending)
    .bind(total)
    .bind(&shipping.recipient_name)
    .bind(&shipping.phone)
    .bind(&shipping.address)
    .bind(&shipping.note)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

async fn insert_detail(
    order_id: i64,
    line: &NewOrderLine,
    subtotal: Money,
    conn: &mut SqliteConnection,
) -> Result<OrderDetail, sqlx::Error> {
    let detail = sqlx::query_as(
        r#"
            INSERT INTO order_details (order_id, variant_id, quantity, price, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.variant_id)
    .bind(line.quantity)
    .bind(line.price)
    .bind(subtotal)
    .fetch_one(conn)
    .await?;
    Ok(detail)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_details(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderDetail>, sqlx::Error> {
    let details = sqlx::query_as("SELECT * FROM order_details WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(details)
}

/// Orders for the user, ordered by `created_at` in ascending order
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    trace!("🗃️ Fetched {} orders for user #{user_id}", orders.len());
    Ok(orders)
}

/// Takes the write lock and returns the current order row. Nothing in the row changes.
pub async fn lock_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET updated_at = updated_at WHERE id = $1 RETURNING *")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Moves the order to `to`, but only if it is still in `from`. Returns `None` if the order was not in `from`.
pub async fn update_status_if(
    order_id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(to)
    .bind(order_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
