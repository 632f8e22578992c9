use async_trait::async_trait;
use database::postgres::with_transaction;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, LoaderTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity::{product_images, products},
    error::{ProductError, ProductResult},
    models::{NewProduct, Product},
    repository::ProductRepository,
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_images(&self, model: products::Model) -> ProductResult<Product> {
        let images = model
            .find_related(product_images::Entity)
            .order_by_asc(product_images::Column::Position)
            .all(&self.db)
            .await?;

        Ok(Product::from_parts(model, images))
    }
}

fn active_model(product: &Product) -> products::ActiveModel {
    products::ActiveModel {
        id: Set(product.id),
        title: Set(product.title.clone()),
        price: Set(product.price),
        description: Set(product.description.clone()),
        slug: Set(product.slug.clone()),
        stock: Set(product.stock),
        sizes: Set(product.sizes.clone().into()),
        gender: Set(product.gender),
        tags: Set(product.tags.clone().into()),
        // Maintained by column defaults and the touch trigger
        created_at: NotSet,
        updated_at: NotSet,
    }
}

async fn insert_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    urls: &[String],
) -> Result<Vec<product_images::Model>, DbErr> {
    let mut images = Vec::with_capacity(urls.len());
    for (position, url) in urls.iter().enumerate() {
        let image = product_images::ActiveModel {
            id: Set(Uuid::now_v7()),
            url: Set(url.clone()),
            position: Set(position as i32),
            product_id: Set(product_id),
        }
        .insert(conn)
        .await?;
        images.push(image);
    }
    Ok(images)
}

async fn save_fields<C: ConnectionTrait>(
    conn: &C,
    model: products::ActiveModel,
    id: Uuid,
) -> ProductResult<()> {
    match model.update(conn).await {
        Ok(_) => Ok(()),
        Err(DbErr::RecordNotUpdated) => Err(ProductError::NotFound(id.to_string())),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let model = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(input.title),
            price: Set(input.price),
            description: Set(input.description),
            slug: Set(input.slug),
            stock: Set(input.stock),
            sizes: Set(input.sizes.into()),
            gender: Set(input.gender),
            tags: Set(input.tags.into()),
            ..Default::default()
        };
        let urls = input.images;

        let product = with_transaction(&self.db, |txn| {
            Box::pin(async move {
                let model = model.insert(txn).await?;
                let images = insert_images(txn, model.id, &urls).await?;
                Ok::<_, ProductError>(Product::from_parts(model, images))
            })
        })
        .await?;

        tracing::info!(product_id = %product.id, images = product.images.len(), "Created product");
        Ok(product)
    }

    async fn list(&self, limit: u64, offset: u64) -> ProductResult<Vec<Product>> {
        let models = products::Entity::find()
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        let images = models
            .load_many(
                product_images::Entity::find().order_by_asc(product_images::Column::Position),
                &self.db,
            )
            .await?;

        Ok(models
            .into_iter()
            .zip(images)
            .map(|(model, images)| Product::from_parts(model, images))
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        match products::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => self.with_images(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_by_title_or_slug(&self, term: &str) -> ProductResult<Option<Product>> {
        use sea_orm::sea_query::ExprTrait;

        let condition = Condition::any()
            .add(Expr::expr(Func::upper(Expr::col(products::Column::Title))).eq(term.to_uppercase()))
            .add(Expr::col(products::Column::Slug).eq(term.to_lowercase()));

        match products::Entity::find().filter(condition).one(&self.db).await? {
            Some(model) => self.with_images(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn update(&self, product: Product, images: Option<Vec<String>>) -> ProductResult<()> {
        let id = product.id;
        let model = active_model(&product);

        let Some(urls) = images else {
            save_fields(&self.db, model, id).await?;
            tracing::info!(product_id = %id, "Updated product");
            return Ok(());
        };

        with_transaction(&self.db, |txn| {
            Box::pin(async move {
                product_images::Entity::delete_many()
                    .filter(product_images::Column::ProductId.eq(id))
                    .exec(txn)
                    .await?;
                save_fields(txn, model, id).await?;
                insert_images(txn, id, &urls).await?;
                Ok::<_, ProductError>(())
            })
        })
        .await?;

        tracing::info!(product_id = %id, "Updated product and replaced images");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = products::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let result = products::Entity::delete_many().exec(&self.db).await?;

        tracing::warn!(deleted = result.rows_affected, "Deleted all products");
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn product_row(id: Uuid) -> products::Model {
        let now = chrono::Utc::now().fixed_offset();
        products::Model {
            id,
            title: "Shirt".into(),
            price: 10.0,
            description: None,
            slug: "shirt".into(),
            stock: 3,
            sizes: serde_json::json!(["M"]),
            gender: Gender::Men,
            tags: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    fn image_row(product_id: Uuid, url: &str, position: i32) -> product_images::Model {
        product_images::Model {
            id: Uuid::now_v7(),
            url: url.into(),
            position,
            product_id,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_loads_images_in_order() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_row(id)]])
            .append_query_results([vec![image_row(id, "b.jpg", 1), image_row(id, "a.jpg", 0)]])
            .into_connection();

        let product = PgProductRepository::new(db).get_by_id(id).await.unwrap().unwrap();

        let urls: Vec<_> = product.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["a.jpg", "b.jpg"]);
        assert_eq!(product.sizes, ["M"]);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<products::Model>::new()])
            .into_connection();

        let found = PgProductRepository::new(db).get_by_id(Uuid::now_v7()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_with_images_runs_in_one_transaction() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .append_query_results([vec![product_row(id)]])
            .append_query_results([vec![image_row(id, "c.jpg", 0)]])
            .into_connection();

        let product = Product::from_parts(product_row(id), vec![]);
        PgProductRepository::new(db.clone())
            .update(product, Some(vec!["c.jpg".into()]))
            .await
            .unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1, "expected a single transaction, got {log:?}");
    }

    #[tokio::test]
    async fn test_failed_image_insert_is_classified() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![product_row(id)]])
            .append_query_errors([DbErr::Custom("disk full".into())])
            .into_connection();

        let product = Product::from_parts(product_row(id), vec![]);
        let err = PgProductRepository::new(db)
            .update(product, Some(vec!["c.jpg".into()]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Internal));
    }

    #[tokio::test]
    async fn test_delete_reports_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let deleted = PgProductRepository::new(db).delete(Uuid::now_v7()).await.unwrap();
        assert!(!deleted);
    }
}
