use crate::{
    db_types::{NewUser, NewVariant, Product, User, Variant},
    traits::CommerceError,
};

/// Lookups into the user and catalog subsystems, plus the inventory ledger.
///
/// User and catalog administration lives elsewhere. The engine only needs to read users and variants, and to write the
/// few fields it owns. The `insert_*` methods exist so that those subsystems (and tests) can seed records.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    async fn insert_user(&self, user: NewUser) -> Result<User, CommerceError>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, CommerceError>;

    async fn insert_product(&self, name: &str) -> Result<Product, CommerceError>;

    async fn insert_variant(&self, variant: NewVariant) -> Result<Variant, CommerceError>;

    async fn find_variant(&self, variant_id: i64) -> Result<Option<Variant>, CommerceError>;

    /// Saves the catalog fields of a variant (sku, list price and sale price). The stock count is ignored, since it
    /// is only changed through [`Self::reserve_stock`] and [`Self::restore_stock`].
    async fn save_variant(&self, variant: &Variant) -> Result<Variant, CommerceError>;

    /// Atomically takes `quantity` units out of stock. Fails with `InsufficientStock` and leaves the stock unchanged
    /// if fewer than `quantity` units are available.
    async fn reserve_stock(&self, variant_id: i64, quantity: i64) -> Result<Variant, CommerceError>;

    /// Puts `quantity` units back into stock.
    async fn restore_stock(&self, variant_id: i64, quantity: i64) -> Result<Variant, CommerceError>;
}
