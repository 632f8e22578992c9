//! Sea-ORM entities and their conversions to domain models.

pub mod product_images;
pub mod products;

use sea_orm::prelude::Json;
use uuid::Uuid;

use crate::models::{Product, ProductImage};

/// Read a JSONB string array; a malformed value is logged and read as empty.
fn string_list(product_id: Uuid, column: &'static str, value: Json) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(
            product_id = %product_id,
            column,
            error = %e,
            "Malformed JSON column, using []"
        );
        Vec::new()
    })
}

impl From<product_images::Model> for ProductImage {
    fn from(model: product_images::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            position: model.position,
        }
    }
}

impl Product {
    /// Assemble the aggregate from its row and its image rows.
    ///
    /// Images are sorted by `position` whatever order they were loaded in.
    pub(crate) fn from_parts(model: products::Model, images: Vec<product_images::Model>) -> Self {
        let mut images: Vec<ProductImage> = images.into_iter().map(Into::into).collect();
        images.sort_by_key(|image| image.position);

        Self {
            id: model.id,
            title: model.title,
            price: model.price,
            description: model.description,
            slug: model.slug,
            stock: model.stock,
            sizes: string_list(model.id, "sizes", model.sizes),
            gender: model.gender,
            tags: string_list(model.id, "tags", model.tags),
            images,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
