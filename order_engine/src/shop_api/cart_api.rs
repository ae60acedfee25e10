use std::fmt::Debug;

use log::*;

use crate::traits::{CartManagement, CartWithLines, CommerceError, LineUpdate};

/// `CartApi` manages a user's pending line items. Nothing here reserves stock; that happens when the cart becomes an
/// order.
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    /// Returns the user's cart. An empty cart is created on first access.
    pub async fn fetch_cart(&self, user_id: i64) -> Result<CartWithLines, CommerceError> {
        self.db.fetch_or_create_cart(user_id).await
    }

    /// Adds `quantity` units of a variant. If the variant is already in the cart, the quantities are added together.
    /// The combined quantity must be in stock.
    pub async fn add_item(&self, user_id: i64, variant_id: i64, quantity: i64) -> Result<CartWithLines, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let cart = self.db.upsert_cart_line(user_id, variant_id, quantity, LineUpdate::Increment).await?;
        debug!("🛒️ Added {quantity} of variant #{variant_id} to the cart of user #{user_id}");
        Ok(cart)
    }

    /// Sets the quantity of a variant that is already in the cart.
    pub async fn update_item(
        &self,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
    ) -> Result<CartWithLines, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let cart = self.db.upsert_cart_line(user_id, variant_id, quantity, LineUpdate::Replace).await?;
        debug!("🛒️ Set variant #{variant_id} to {quantity} in the cart of user #{user_id}");
        Ok(cart)
    }

    pub async fn remove_item(&self, user_id: i64, variant_id: i64) -> Result<CartWithLines, CommerceError> {
        let cart = self.db.remove_cart_line(user_id, variant_id).await?;
        debug!("🛒️ Removed variant #{variant_id} from the cart of user #{user_id}");
        Ok(cart)
    }

    pub async fn clear_cart(&self, user_id: i64) -> Result<CartWithLines, CommerceError> {
        let cart = self.db.delete_lines_by_cart(user_id).await?;
        debug!("🛒️ Cleared the cart of user #{user_id}");
        Ok(cart)
    }
}
