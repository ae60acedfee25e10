use log::debug;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{NewPayment, Payment, PaymentStatusType},
    traits::CommerceError,
};

pub async fn insert_payment(payment: &NewPayment, conn: &mut SqliteConnection) -> Result<Payment, CommerceError> {
    let result: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, amount, method, txid, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.method)
    .bind(&payment.txid)
    .bind(PaymentStatusType::Pending)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CommerceError::PaymentAlreadyExists(payment.txid.clone())
        } else {
            CommerceError::from(e)
        }
    })?;
    debug!("🗃️ Payment {} ({}) recorded for order #{}", result.txid, result.amount, result.order_id);
    Ok(result)
}

pub async fn fetch_payment_by_txid(txid: &str, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE txid = $1").bind(txid).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn fetch_payments_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Payment>, sqlx::Error> {
    let payments = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(payments)
}

/// Takes the write lock and returns the current payment row. Nothing in the row changes.
pub async fn lock_payment(txid: &str, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("UPDATE payments SET updated_at = updated_at WHERE txid = $1 RETURNING *")
        .bind(txid)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// Moves a payment from `from` to `status`. Returns `None` if the payment is no longer in `from`.
pub async fn finalize_payment(
    payment_id: i64,
    from: PaymentStatusType,
    status: PaymentStatusType,
    provider_ref: Option<&str>,
    message: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                status = $1,
                provider_ref = COALESCE($2, provider_ref),
                provider_message = COALESCE($3, provider_message),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $4 AND status = $5
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(provider_ref)
    .bind(message)
    .bind(payment_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

pub async fn annotate_payment(
    txid: &str,
    provider_ref: Option<&str>,
    message: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET
                provider_ref = COALESCE($1, provider_ref),
                provider_message = COALESCE($2, provider_message),
                updated_at = CURRENT_TIMESTAMP
            WHERE txid = $3
            RETURNING *;
        "#,
    )
    .bind(provider_ref)
    .bind(message)
    .bind(txid)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Whether the order already has a successful payment.
pub async fn has_successful_payment(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE order_id = $1 AND status = $2")
        .bind(order_id)
        .bind(PaymentStatusType::Success)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}
