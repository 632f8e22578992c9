use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Page size used when `limit` is omitted
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest `limit`/`offset` Postgres accepts as a BIGINT
pub const MAX_PAGE_VALUE: u64 = i64::MAX as u64;

/// Target audience of a product
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_gender")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "men")]
    Men,
    #[sea_orm(string_value = "women")]
    Women,
    #[sea_orm(string_value = "kid")]
    Kid,
    #[sea_orm(string_value = "unisex")]
    Unisex,
}

/// Image owned by a single product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
    /// Index in the list the images were submitted with
    pub position: i32,
}

/// Product aggregate: the product row plus its ordered images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    /// Unique display title
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    /// Unique URL handle, always normalized (see [`normalize_slug`])
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product as returned over HTTP: images reduced to their URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    /// Image URLs in submission order
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub description: Option<String>,
    /// Derived from `title` when omitted
    pub slug: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub sizes: Vec<String>,
    pub gender: Gender,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image URLs, stored in this order
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO for a partial update
///
/// `images`, when present, replaces the whole image set.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    /// Absent keeps the description, `null` clears it
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub slug: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<Gender>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

/// Create input with defaults applied and the slug resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

/// `?limit=&offset=` page selection
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Maximum number of products, at least 1 (default 10)
    #[validate(range(min = 1, max = MAX_PAGE_VALUE))]
    pub limit: Option<u64>,
    /// Number of products to skip (default 0)
    #[validate(range(max = MAX_PAGE_VALUE))]
    pub offset: Option<u64>,
}

/// Body of the bulk delete response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletedProducts {
    pub deleted: u64,
}

/// Wraps a present field in `Some`, so an explicit `null` becomes `Some(None)`.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Lowercase, spaces to `_`, apostrophes dropped.
///
/// ```
/// use domain_products::models::normalize_slug;
///
/// assert_eq!(normalize_slug("Men's Chill Crew"), "mens_chill_crew");
/// ```
pub fn normalize_slug(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_").replace('\'', "")
}

/// Only the canonical hyphenated form counts as an id lookup.
pub fn parse_uuid_term(term: &str) -> Option<Uuid> {
    if term.len() != 36 {
        return None;
    }
    Uuid::parse_str(term).ok()
}

pub(crate) fn image_records(urls: &[String]) -> Vec<ProductImage> {
    urls.iter()
        .enumerate()
        .map(|(position, url)| ProductImage {
            id: Uuid::now_v7(),
            url: url.clone(),
            position: position as i32,
        })
        .collect()
}

impl From<CreateProduct> for NewProduct {
    fn from(input: CreateProduct) -> Self {
        let slug = normalize_slug(input.slug.as_deref().unwrap_or(&input.title));

        Self {
            title: input.title,
            price: input.price.unwrap_or(0.0),
            description: input.description,
            slug,
            stock: input.stock.unwrap_or(0),
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            images: input.images,
        }
    }
}

impl Product {
    /// Build a fresh aggregate, as stored by in-process repositories
    pub fn new(input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            images: image_records(&input.images),
            title: input.title,
            price: input.price,
            description: input.description,
            slug: input.slug,
            stock: input.stock,
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the present fields of `update` into this product.
    ///
    /// Returns the replacement image list, if any; images are swapped by the
    /// repository so the replacement can be transactional.
    pub fn apply_update(&mut self, update: UpdateProduct) -> Option<Vec<String>> {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(slug) = update.slug {
            self.slug = normalize_slug(&slug);
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        update.images
    }
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            description: product.description,
            slug: product.slug,
            stock: product.stock,
            sizes: product.sizes,
            gender: product.gender,
            tags: product.tags,
            images: product.images.into_iter().map(|image| image.url).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}
