//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, NewProduct, Pagination, Product, ProductView, UpdateProduct, parse_uuid_term,
};
use crate::repository::ProductRepository;

/// Product service providing the catalog operations
///
/// Validation, slug resolution and lookup-mode selection live here; the
/// repository owns persistence and transactional writes.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product together with its images
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<ProductView> {
        input.validate()?;

        let product = self.repository.create(NewProduct::from(input)).await?;
        Ok(product.into())
    }

    /// One page of products with images flattened to URLs
    #[instrument(skip(self))]
    pub async fn find_all(&self, pagination: Pagination) -> ProductResult<Vec<ProductView>> {
        pagination.validate()?;

        let products = self
            .repository
            .list(pagination.limit(), pagination.offset())
            .await?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Look up by id when `term` is a UUID, otherwise by title or slug
    #[instrument(skip(self))]
    pub async fn find_one(&self, term: &str) -> ProductResult<Product> {
        let found = match parse_uuid_term(term) {
            Some(id) => self.repository.get_by_id(id).await?,
            None => self.repository.get_by_title_or_slug(term).await?,
        };

        found.ok_or_else(|| ProductError::NotFound(term.to_string()))
    }

    /// [`find_one`](Self::find_one) with images flattened to URLs
    pub async fn find_one_plain(&self, term: &str) -> ProductResult<ProductView> {
        self.find_one(term).await.map(Into::into)
    }

    /// Merge `input` into the stored product.
    ///
    /// When `input.images` is present the image set is replaced in the same
    /// transaction as the field update; on failure nothing changes.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductView> {
        input.validate()?;

        let mut product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;

        let images = product.apply_update(input);
        self.repository.update(product, images).await?;

        self.find_one_plain(&id.to_string()).await
    }

    /// Delete a product; its images go with it
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: Uuid) -> ProductResult<()> {
        let product = self.find_one(&id.to_string()).await?;

        if !self.repository.delete(product.id).await? {
            return Err(ProductError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Wipe the catalog. Returns the number of deleted products.
    #[instrument(skip(self))]
    pub async fn delete_all_products(&self) -> ProductResult<u64> {
        self.repository.delete_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, ProductImage};
    use crate::repository::MockProductRepository;
    use mockall::predicate::{always, eq};

    fn stored_product(id: Uuid) -> Product {
        let now = chrono::Utc::now();
        Product {
            id,
            title: "Shirt".into(),
            price: 20.0,
            description: None,
            slug: "shirt".into(),
            stock: 5,
            sizes: vec!["M".into()],
            gender: Gender::Men,
            tags: vec![],
            images: vec![ProductImage {
                id: Uuid::now_v7(),
                url: "old.jpg".into(),
                position: 0,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    fn create_input() -> CreateProduct {
        CreateProduct {
            title: "Men's Tee".into(),
            price: Some(9.5),
            description: None,
            slug: None,
            stock: None,
            sizes: vec!["S".into()],
            gender: Gender::Men,
            tags: vec![],
            images: vec!["1.jpg".into(), "2.jpg".into()],
        }
    }

    #[tokio::test]
    async fn test_create_passes_resolved_slug_and_flattens_images() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_create()
            .withf(|input| input.slug == "mens_tee" && input.stock == 0)
            .returning(|input| Ok(Product::new(input)));

        let service = ProductService::new(mock_repo);
        let view = service.create(create_input()).await.unwrap();

        assert_eq!(view.images, ["1.jpg", "2.jpg"]);
        assert_eq!(view.slug, "mens_tee");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_storage() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_create().never();

        let mut input = create_input();
        input.price = Some(-1.0);

        let service = ProductService::new(mock_repo);
        let err = service.create(input).await.unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_surfaces_duplicate() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_create().returning(|_| {
            Err(ProductError::Duplicate(
                "Key (title)=(Men's Tee) already exists.".into(),
            ))
        });

        let service = ProductService::new(mock_repo);
        let err = service.create(create_input()).await.unwrap_err();
        assert!(matches!(err, ProductError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_all_applies_default_page() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_list()
            .with(eq(10), eq(0))
            .returning(|_, _| Ok(vec![]));

        let service = ProductService::new(mock_repo);
        let page = service.find_all(Pagination::default()).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_find_one_by_uuid_uses_id_lookup() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(|id| Ok(Some(stored_product(id))));
        mock_repo.expect_get_by_title_or_slug().never();

        let service = ProductService::new(mock_repo);
        let product = service.find_one(&id.to_string()).await.unwrap();
        assert_eq!(product.id, id);
    }

    #[tokio::test]
    async fn test_find_one_by_text_uses_title_or_slug() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().never();
        mock_repo
            .expect_get_by_title_or_slug()
            .withf(|term| term.to_string() == "RED-SHIRT")
            .returning(|_| Ok(Some(stored_product(Uuid::now_v7()))));

        let service = ProductService::new(mock_repo);
        assert!(service.find_one("RED-SHIRT").await.is_ok());
    }

    #[tokio::test]
    async fn test_find_one_unknown_uuid_names_the_id() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let err = service.find_one(&id.to_string()).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(term) if term == id.to_string()));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().never();

        let service = ProductService::new(mock_repo);
        let err = service
            .update(Uuid::now_v7(), UpdateProduct::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_hands_replacement_images_to_repository() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .times(2)
            .returning(|id| Ok(Some(stored_product(id))));
        mock_repo
            .expect_update()
            .withf(|product, images| {
                product.stock == 1
                    && images.as_deref() == Some(&["new.jpg".to_string()][..])
            })
            .returning(|_, _| Ok(()));

        let service = ProductService::new(mock_repo);
        let input = UpdateProduct {
            stock: Some(1),
            images: Some(vec!["new.jpg".into()]),
            ..Default::default()
        };
        service.update(id, input).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_without_images_keeps_them() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Ok(Some(stored_product(id))));
        mock_repo
            .expect_update()
            .with(always(), eq(None))
            .returning(|_, _| Ok(()));

        let service = ProductService::new(mock_repo);
        let view = service
            .update(id, UpdateProduct { price: Some(1.0), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(view.images, ["old.jpg"]);
    }

    #[tokio::test]
    async fn test_remove_missing_product_is_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = ProductService::new(mock_repo);
        let err = service.remove(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_all_returns_count() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_delete_all().returning(|| Ok(7));

        let service = ProductService::new(mock_repo);
        assert_eq!(service.delete_all_products().await.unwrap(), 7);
    }
}
