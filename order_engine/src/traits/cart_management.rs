use crate::{
    db_types::{Cart, CartLine},
    traits::{data_objects::CartWithLines, CommerceError},
};

/// How a quantity passed to [`CartManagement::upsert_cart_line`] is applied to an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineUpdate {
    /// Add to the existing quantity, or create the line
    Increment,
    /// Replace the existing quantity. The line must already exist.
    Replace,
}

/// Behaviour for managing a user's shopping cart.
///
/// Every mutation refreshes the unit price snapshot of the line it touches to the variant's current effective price,
/// recomputes that line's subtotal, and recomputes the cart total, all in one transaction. Stock is checked, but never
/// reserved, by cart operations.
#[allow(async_fn_in_trait)]
pub trait CartManagement: Clone {
    /// Returns the user's cart, creating an empty one on first access.
    async fn fetch_or_create_cart(&self, user_id: i64) -> Result<CartWithLines, CommerceError>;

    async fn find_cart_by_user(&self, user_id: i64) -> Result<Option<Cart>, CommerceError>;

    async fn find_lines_by_cart(&self, cart_id: i64) -> Result<Vec<CartLine>, CommerceError>;

    async fn upsert_cart_line(
        &self,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
        mode: LineUpdate,
    ) -> Result<CartWithLines, CommerceError>;

    /// Removes the line for `variant_id`. Fails with `CartItemNotFound` if there is no such line.
    async fn remove_cart_line(&self, user_id: i64, variant_id: i64) -> Result<CartWithLines, CommerceError>;

    /// Deletes all lines and zeroes the total.
    async fn delete_lines_by_cart(&self, user_id: i64) -> Result<CartWithLines, CommerceError>;
}
