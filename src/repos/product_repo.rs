/*
 * Responsibility
 * - Product records served by the /api/products handlers
 * - `ProductStore` is the seam; `InMemoryProductStore` is the process-local implementation
 */
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub description: String,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ProductRow>, RepoError>;

    async fn get(&self, id: u64) -> Result<Option<ProductRow>, RepoError>;

    async fn create(&self, product: NewProduct) -> Result<ProductRow, RepoError>;

    /// Replace every field of an existing product. `None` if `id` is unknown.
    async fn update(&self, id: u64, product: NewProduct) -> Result<Option<ProductRow>, RepoError>;

    /// Remove a product and hand back what was removed.
    async fn delete(&self, id: u64) -> Result<Option<ProductRow>, RepoError>;
}

#[derive(Debug, Default)]
struct ProductTable {
    next_id: u64,
    rows: BTreeMap<u64, ProductRow>,
}

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    table: RwLock<ProductTable>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self) -> Result<Vec<ProductRow>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> Result<Option<ProductRow>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<ProductRow, RepoError> {
        let mut table = self.table.write().await;
        table.next_id += 1;

        let row = ProductRow {
            id: table.next_id,
            sku: product.sku,
            name: product.name,
            price: product.price,
            description: product.description,
        };
        table.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn update(&self, id: u64, product: NewProduct) -> Result<Option<ProductRow>, RepoError> {
        let mut table = self.table.write().await;

        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.sku = product.sku;
        row.name = product.name;
        row.price = product.price;
        row.description = product.description;

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: u64) -> Result<Option<ProductRow>, RepoError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id))
    }
}
