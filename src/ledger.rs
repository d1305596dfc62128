//! Inventory ledger: the sole authority over product quantities
use crate::error::{Outcome, StockError};
use crate::product::{Product, TimeStamp};
use crate::store::StockStore;
use tracing::{info, warn};

/// In-memory projection of the products collection. Every mutation persists
/// through the store first, then re-reads the projection (read-after-write);
/// the projection is never the source of truth on its own.
pub struct InventoryLedger {
    store: StockStore,
    products: Vec<Product>,
}

impl InventoryLedger {
    pub fn open(store: StockStore) -> Result<Self, StockError> {
        let mut ledger = Self {
            store,
            products: Vec::new(),
        };
        ledger.refresh()?;
        Ok(ledger)
    }

    pub fn refresh(&mut self) -> Result<(), StockError> {
        self.products = self.store.list_products()?;
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_by_sku(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.matches_sku(sku))
    }

    /// Derived sum over the projection. Recomputed on every refresh, never
    /// persisted on its own.
    pub fn total_units(&self) -> u64 {
        self.products.iter().map(|p| u64::from(p.quantity)).sum()
    }

    /// Restock an existing SKU (case-insensitive match) by adding the
    /// quantity, or create the product with that quantity as initial stock.
    /// Zero is a valid delta; a product can be listed before stock arrives.
    pub fn upsert_by_sku(&mut self, sku: &str, name: &str, quantity: u32) -> Outcome {
        self.try_upsert_by_sku(sku, name, quantity).into()
    }

    fn try_upsert_by_sku(
        &mut self,
        sku: &str,
        name: &str,
        quantity: u32,
    ) -> Result<String, StockError> {
        match self.find_by_sku(sku).cloned() {
            Some(mut existing) => {
                if name.trim().is_empty() {
                    return Err(StockError::Validation(
                        "Product name must not be empty".into(),
                    ));
                }
                existing.quantity = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    StockError::Validation(format!("Quantity for {} would overflow", existing.sku))
                })?;
                existing.name = name.trim().to_owned();
                existing.updated_at = TimeStamp::new();
                self.store.put_product(&existing)?;
                self.refresh()?;

                info!(
                    sku = %existing.sku,
                    added = quantity,
                    total = existing.quantity,
                    "product restocked"
                );
                Ok(format!(
                    "Updated {}: added {} units (total: {})",
                    existing.sku, quantity, existing.quantity
                ))
            }
            None => {
                let product = Product::new(sku, name, quantity)?;
                self.store.put_product(&product)?;
                self.refresh()?;

                info!(sku = %product.sku, quantity, "product added");
                Ok(format!("Added new product: {}", product.sku))
            }
        }
    }

    /// Take stock out for a dispatch. The existence check runs against the
    /// projection; the quantity check runs as a conditional update at the
    /// store, so a concurrent dispatch cannot push the row negative.
    pub fn decrease(&mut self, product_id: &str, quantity: u32) -> Outcome {
        self.try_decrease(product_id, quantity).into()
    }

    pub(crate) fn try_decrease(
        &mut self,
        product_id: &str,
        quantity: u32,
    ) -> Result<String, StockError> {
        let sku = self
            .find(product_id)
            .ok_or_else(|| StockError::ProductNotFound(product_id.to_owned()))?
            .sku
            .clone();

        let updated = match self.store.decrement_quantity(product_id, quantity) {
            Ok(product) => product,
            Err(err) => {
                warn!(product_id, %err, "stock decrease rejected");
                return Err(err);
            }
        };
        self.refresh()?;

        info!(
            sku = %sku,
            dispatched = quantity,
            remaining = updated.quantity,
            "stock decreased"
        );
        Ok(format!("Successfully dispatched {quantity} units of {sku}"))
    }

    pub fn remove(&mut self, product_id: &str) -> Outcome {
        self.try_remove(product_id).into()
    }

    fn try_remove(&mut self, product_id: &str) -> Result<String, StockError> {
        if !self.store.delete_product(product_id)? {
            return Err(StockError::ProductNotFound(product_id.to_owned()));
        }
        self.refresh()?;

        info!(product_id, "product removed");
        Ok("Product removed successfully".into())
    }

    pub fn clear_all(&mut self) -> Outcome {
        self.try_clear_all().into()
    }

    fn try_clear_all(&mut self) -> Result<String, StockError> {
        self.store.clear_products()?;
        self.refresh()?;
        Ok("All products cleared successfully".into())
    }
}
