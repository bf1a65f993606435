//! Product catalog commands.

use std::sync::Arc;

use showcase_core::{ProductCatalog, ProductId, StateStore};
use tracing::info;

use super::{CliError, found};

/// Print the catalog.
pub fn list(store: Arc<dyn StateStore>) {
    let catalog = ProductCatalog::load(store);
    for product in catalog.list() {
        info!(
            id = %product.id,
            name = %product.name,
            price = %product.price,
            in_stock = product.in_stock,
            "product"
        );
    }
    info!(count = catalog.list().len(), "Products listed");
}

/// Delete a product.
///
/// # Errors
///
/// Returns `CliError::NotFound` for an unknown ID.
pub fn delete(store: Arc<dyn StateStore>, id: i64) -> Result<(), CliError> {
    let id = ProductId::new(id);
    found(ProductCatalog::load(store).delete(id)?, || format!("product {id}"))?;
    info!(product_id = %id, "Product deleted");
    Ok(())
}
