use log::trace;
use sqlx::SqliteConnection;

use super::is_foreign_key_violation;
use crate::{
    db_types::{Cart, CartLine, Money},
    traits::CommerceError,
};

/// Returns the user's cart, creating it if necessary. This always issues a write, so it is safe to call first thing
/// in a transaction.
pub async fn ensure_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<Cart, CommerceError> {
    let inserted = sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| if is_foreign_key_violation(&e) { CommerceError::UserNotFound(user_id) } else { e.into() })?;
    if inserted.rows_affected() > 0 {
        trace!("🗃️ Created cart for user #{user_id}");
    }
    let cart = sqlx::query_as("SELECT * FROM carts WHERE user_id = $1").bind(user_id).fetch_one(conn).await?;
    Ok(cart)
}

pub async fn fetch_cart_by_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let cart = sqlx::query_as("SELECT * FROM carts WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(cart)
}

/// Takes the write lock on the cart, if it exists and belongs to `user_id`.
pub async fn lock_cart(cart_id: i64, user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let cart = sqlx::query_as(
        "UPDATE carts SET updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(cart_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(cart)
}

pub async fn fetch_lines(cart_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines =
        sqlx::query_as("SELECT * FROM cart_lines WHERE cart_id = $1 ORDER BY id").bind(cart_id).fetch_all(conn).await?;
    Ok(lines)
}

pub async fn fetch_line(
    cart_id: i64,
    variant_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLine>, sqlx::Error> {
    let line = sqlx::query_as("SELECT * FROM cart_lines WHERE cart_id = $1 AND variant_id = $2")
        .bind(cart_id)
        .bind(variant_id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

/// Writes the line for `variant_id` with the given quantity and unit price, replacing any existing line for the same
/// variant.
pub async fn upsert_line(
    cart_id: i64,
    variant_id: i64,
    quantity: i64,
    price: Money,
    subtotal: Money,
    conn: &mut SqliteConnection,
) -> Result<CartLine, sqlx::Error> {
    let line = sqlx::query_as(
        r#"
            INSERT INTO cart_lines (cart_id, variant_id, quantity, price, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cart_id, variant_id) DO UPDATE SET
                quantity = excluded.quantity,
                price = excluded.price,
                subtotal = excluded.subtotal
            RETURNING *;
        "#,
    )
    .bind(cart_id)
    .bind(variant_id)
    .bind(quantity)
    .bind(price)
    .bind(subtotal)
    .fetch_one(conn)
    .await?;
    Ok(line)
}

/// Returns `false` if there was no such line.
pub async fn delete_line(cart_id: i64, variant_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1 AND variant_id = $2")
        .bind(cart_id)
        .bind(variant_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_lines(cart_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1").bind(cart_id).execute(conn).await?;
    trace!("🗃️ Removed {} lines from cart #{cart_id}", result.rows_affected());
    Ok(result.rows_affected())
}

/// Sets the cart total to the sum of its line subtotals.
pub async fn recompute_total(cart_id: i64, conn: &mut SqliteConnection) -> Result<Cart, sqlx::Error> {
    let cart = sqlx::query_as(
        r#"
            UPDATE carts SET
                total = COALESCE((SELECT SUM(subtotal) FROM cart_lines WHERE cart_id = $1), 0),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(cart_id)
    .fetch_one(conn)
    .await?;
    Ok(cart)
}
