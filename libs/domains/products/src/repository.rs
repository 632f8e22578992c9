use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, image_records};

/// Repository trait for Product persistence
///
/// Implementations own the aggregate boundary: a product and its images are
/// written and removed together.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and its images atomically
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// Page through products in store order
    async fn list(&self, limit: u64, offset: u64) -> ProductResult<Vec<Product>>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Case-insensitive title match, or slug equal to the lowercased term
    async fn get_by_title_or_slug(&self, term: &str) -> ProductResult<Option<Product>>;

    /// Persist the fields of `product`; when `images` is given, replace the
    /// image set in the same transaction.
    async fn update(&self, product: Product, images: Option<Vec<String>>) -> ProductResult<()>;

    /// Delete a product and its images; `false` if it did not exist
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Delete every product, returning how many were removed
    async fn delete_all(&self) -> ProductResult<u64>;
}

/// Process-local repository with the same uniqueness rules as the database.
///
/// Handy for handler tests and local runs without Postgres.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(products: &[Product], candidate: &Product) -> ProductResult<()> {
        for other in products.iter().filter(|p| p.id != candidate.id) {
            if other.title == candidate.title {
                return Err(ProductError::Duplicate(format!(
                    "Key (title)=({}) already exists.",
                    candidate.title
                )));
            }
            if other.slug == candidate.slug {
                return Err(ProductError::Duplicate(format!(
                    "Key (slug)=({}) already exists.",
                    candidate.slug
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        let mut products = self.products.write().await;

        Self::check_unique(&products, &product)?;
        products.push(product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn list(&self, limit: u64, offset: u64) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_by_title_or_slug(&self, term: &str) -> ProductResult<Option<Product>> {
        let title = term.to_uppercase();
        let slug = term.to_lowercase();

        let products = self.products.read().await;
        Ok(products
            .iter()
            .find(|p| p.title.to_uppercase() == title || p.slug == slug)
            .cloned())
    }

    async fn update(&self, mut product: Product, images: Option<Vec<String>>) -> ProductResult<()> {
        let mut products = self.products.write().await;

        Self::check_unique(&products, &product)?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| ProductError::NotFound(product.id.to_string()))?;

        if let Some(urls) = images {
            product.images = image_records(&urls);
        }
        product.updated_at = chrono::Utc::now();
        *slot = product;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let mut products = self.products.write().await;
        let deleted = products.len() as u64;
        products.clear();
        Ok(deleted)
    }
}
