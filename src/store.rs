//! Persistence gateway: CBOR-encoded rows in one sled tree per collection
use crate::error::StockError;
use crate::product::{Product, TimeStamp};
use crate::request::Request;
use crate::user::User;
use chrono::Utc;

/// One branding key/value row, e.g. the company name or logo URL. The asset
/// itself lives in external blob storage; only the reference is kept here.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct CompanySetting {
    #[n(0)]
    pub setting_key: String,
    #[n(1)]
    pub setting_value: Option<String>,
    #[n(2)]
    pub created_at: TimeStamp<Utc>,
    #[n(3)]
    pub updated_at: TimeStamp<Utc>,
}

#[derive(Clone)]
pub struct StockStore {
    products: sled::Tree,
    requests: sled::Tree,
    users: sled::Tree,
    settings: sled::Tree,
}

impl StockStore {
    pub fn open(db: &sled::Db) -> Result<Self, StockError> {
        Ok(Self {
            products: db.open_tree("products")?,
            requests: db.open_tree("requests")?,
            users: db.open_tree("users")?,
            settings: db.open_tree("settings")?,
        })
    }

    // PRODUCTS

    pub fn put_product(&self, product: &Product) -> Result<(), StockError> {
        self.products
            .insert(product.id.as_bytes(), minicbor::to_vec(product)?)?;
        Ok(())
    }

    pub fn fetch_product(&self, id: &str) -> Result<Option<Product>, StockError> {
        match self.products.get(id.as_bytes())? {
            Some(raw) => Ok(Some(minicbor::decode(raw.as_ref())?)),
            None => Ok(None),
        }
    }

    pub fn delete_product(&self, id: &str) -> Result<bool, StockError> {
        Ok(self.products.remove(id.as_bytes())?.is_some())
    }

    /// All products, oldest first. The order the inventory table renders in.
    pub fn list_products(&self) -> Result<Vec<Product>, StockError> {
        let mut rows: Vec<Product> = Vec::new();
        for entry in self.products.iter() {
            let (_, raw) = entry?;
            rows.push(minicbor::decode(raw.as_ref())?);
        }
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    pub fn clear_products(&self) -> Result<(), StockError> {
        self.products.clear()?;
        Ok(())
    }

    /// Conditional decrement executed against the stored row rather than a
    /// client snapshot, so two dispatchers racing the same product cannot
    /// both succeed past the available quantity. Retries on a lost race.
    pub fn decrement_quantity(&self, id: &str, amount: u32) -> Result<Product, StockError> {
        loop {
            let current = self
                .products
                .get(id.as_bytes())?
                .ok_or_else(|| StockError::ProductNotFound(id.to_owned()))?;
            let mut product: Product = minicbor::decode(current.as_ref())?;

            if product.quantity < amount {
                return Err(StockError::InsufficientStock {
                    available: product.quantity,
                    requested: amount,
                });
            }

            product.quantity -= amount;
            product.updated_at = TimeStamp::new();
            let next = minicbor::to_vec(&product)?;

            match self
                .products
                .compare_and_swap(id.as_bytes(), Some(&current), Some(next))?
            {
                Ok(()) => return Ok(product),
                Err(_) => continue, // another writer got there first; re-read
            }
        }
    }

    // REQUESTS

    pub fn put_request(&self, request: &Request) -> Result<(), StockError> {
        self.requests
            .insert(request.id.as_bytes(), minicbor::to_vec(request)?)?;
        Ok(())
    }

    pub fn fetch_request(&self, id: &str) -> Result<Option<Request>, StockError> {
        match self.requests.get(id.as_bytes())? {
            Some(raw) => Ok(Some(minicbor::decode(raw.as_ref())?)),
            None => Ok(None),
        }
    }

    pub fn delete_request(&self, id: &str) -> Result<bool, StockError> {
        Ok(self.requests.remove(id.as_bytes())?.is_some())
    }

    /// All requests, newest first. The order the request queue renders in.
    pub fn list_requests(&self) -> Result<Vec<Request>, StockError> {
        let mut rows: Vec<Request> = Vec::new();
        for entry in self.requests.iter() {
            let (_, raw) = entry?;
            rows.push(minicbor::decode(raw.as_ref())?);
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn clear_requests(&self) -> Result<(), StockError> {
        self.requests.clear()?;
        Ok(())
    }

    // USERS
    //
    // Seeded by the identity layer; the core only reads them.

    pub fn put_user(&self, user: &User) -> Result<(), StockError> {
        self.users
            .insert(user.id.as_bytes(), minicbor::to_vec(user)?)?;
        Ok(())
    }

    pub fn fetch_user(&self, id: &str) -> Result<Option<User>, StockError> {
        match self.users.get(id.as_bytes())? {
            Some(raw) => Ok(Some(minicbor::decode(raw.as_ref())?)),
            None => Ok(None),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>, StockError> {
        let mut rows: Vec<User> = Vec::new();
        for entry in self.users.iter() {
            let (_, raw) = entry?;
            rows.push(minicbor::decode(raw.as_ref())?);
        }
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    // SETTINGS

    pub fn set_setting(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> Result<CompanySetting, StockError> {
        let now = TimeStamp::new();
        let setting = match self.fetch_setting(key)? {
            Some(mut existing) => {
                existing.setting_value = value.map(str::to_owned);
                existing.updated_at = now;
                existing
            }
            None => CompanySetting {
                setting_key: key.to_owned(),
                setting_value: value.map(str::to_owned),
                created_at: now.clone(),
                updated_at: now,
            },
        };
        self.settings
            .insert(key.as_bytes(), minicbor::to_vec(&setting)?)?;
        Ok(setting)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, StockError> {
        Ok(self.fetch_setting(key)?.and_then(|row| row.setting_value))
    }

    fn fetch_setting(&self, key: &str) -> Result<Option<CompanySetting>, StockError> {
        match self.settings.get(key.as_bytes())? {
            Some(raw) => Ok(Some(minicbor::decode(raw.as_ref())?)),
            None => Ok(None),
        }
    }
}
