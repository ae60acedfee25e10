//! Products, variants and the inventory ledger.
use log::{debug, trace};
use sqlx::SqliteConnection;

use super::is_foreign_key_violation;
use crate::{
    db_types::{NewVariant, Product, Variant},
    traits::CommerceError,
};

pub async fn insert_product(name: &str, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as("INSERT INTO products (name) VALUES ($1) RETURNING *").bind(name).fetch_one(conn).await?;
    Ok(product)
}

pub async fn insert_variant(variant: NewVariant, conn: &mut SqliteConnection) -> Result<Variant, CommerceError> {
    if variant.stock < 0 {
        return Err(CommerceError::InvalidQuantity(variant.stock));
    }
    let product_id = variant.product_id;
    let result: Variant = sqlx::query_as(
        r#"
            INSERT INTO variants (product_id, sku, price, sale_price, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(variant.product_id)
    .bind(variant.sku)
    .bind(variant.price)
    .bind(variant.sale_price)
    .bind(variant.stock)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            CommerceError::DatabaseError(format!("Product {product_id} does not exist"))
        } else {
            CommerceError::from(e)
        }
    })?;
    debug!("🗃️ Variant #{} ({}) created with {} in stock", result.id, result.sku, result.stock);
    Ok(result)
}

pub async fn fetch_variant(variant_id: i64, conn: &mut SqliteConnection) -> Result<Option<Variant>, sqlx::Error> {
    let variant = sqlx::query_as("SELECT * FROM variants WHERE id = $1").bind(variant_id).fetch_optional(conn).await?;
    Ok(variant)
}

/// Updates the catalog fields of a variant. Stock is not written here.
pub async fn update_variant(variant: &Variant, conn: &mut SqliteConnection) -> Result<Option<Variant>, sqlx::Error> {
    let result = sqlx::query_as(
        r#"
            UPDATE variants SET sku = $1, price = $2, sale_price = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(&variant.sku)
    .bind(variant.price)
    .bind(variant.sale_price)
    .bind(variant.id)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Takes `quantity` units out of stock with a single conditioned update, so the stock can never go negative no
/// matter how many reservations race each other.
///
/// This is not atomic by itself with respect to anything else you do. Embed it in a transaction and pass `&mut tx`;
/// an error here means the caller should drop (roll back) that transaction.
pub async fn reserve(variant_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<Variant, CommerceError> {
    if quantity < 1 {
        return Err(CommerceError::InvalidQuantity(quantity));
    }
    let reserved: Option<Variant> = sqlx::query_as(
        r#"
            UPDATE variants SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock >= $1
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(variant_id)
    .fetch_optional(&mut *conn)
    .await?;
    match reserved {
        Some(variant) => {
            trace!("🗃️ Reserved {quantity} of variant #{variant_id}. {} left", variant.stock);
            Ok(variant)
        },
        None => match fetch_variant(variant_id, conn).await? {
            Some(v) => {
                debug!("🗃️ Cannot reserve {quantity} of variant #{variant_id}. Only {} in stock", v.stock);
                Err(CommerceError::InsufficientStock { variant_id, requested: quantity, available: v.stock })
            },
            None => Err(CommerceError::VariantNotFound(variant_id)),
        },
    }
}

/// Puts `quantity` units back into stock.
pub async fn restore(variant_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<Variant, CommerceError> {
    if quantity < 1 {
        return Err(CommerceError::InvalidQuantity(quantity));
    }
    let restored: Option<Variant> = sqlx::query_as(
        "UPDATE variants SET stock = stock + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(quantity)
    .bind(variant_id)
    .fetch_optional(conn)
    .await?;
    let variant = restored.ok_or(CommerceError::VariantNotFound(variant_id))?;
    trace!("🗃️ Restored {quantity} of variant #{variant_id}. {} in stock", variant.stock);
    Ok(variant)
}
