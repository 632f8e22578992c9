use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestDuplicateResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, DeletedProducts, Gender, Pagination, ProductView, UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

const TAG: &str = "products";

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        find_all,
        create_product,
        find_one,
        update_product,
        remove_product,
        delete_all_products,
    ),
    components(
        schemas(ProductView, CreateProduct, UpdateProduct, Pagination, DeletedProducts, Gender),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            BadRequestDuplicateResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router; mount it under `/products`
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(find_all::<R>)
                .post(create_product::<R>)
                .delete(delete_all_products::<R>),
        )
        .route(
            "/{term}",
            get(find_one::<R>)
                .patch(update_product::<R>)
                .delete(remove_product::<R>),
        )
        .with_state(shared_service)
}

/// List products, `limit` defaults to 10 and `offset` to 0
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(Pagination),
    responses(
        (status = 200, description = "Page of products", body = Vec<ProductView>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_all<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
) -> ProductResult<Json<Vec<ProductView>>> {
    let products = service.find_all(pagination).await?;
    Ok(Json(products))
}

/// Create a product with its images
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductView),
        (status = 400, response = BadRequestDuplicateResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by id, title (any case) or slug
#[utoipa::path(
    get,
    path = "/{term}",
    tag = TAG,
    params(
        ("term" = String, Path, description = "Product UUID, title or slug")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductView),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_one<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(term): Path<String>,
) -> ProductResult<Json<ProductView>> {
    let product = service.find_one_plain(&term).await?;
    Ok(Json(product))
}

/// Partially update a product; `images` replaces the whole set
#[utoipa::path(
    patch,
    path = "/{term}",
    tag = TAG,
    params(
        ("term" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductView),
        (status = 400, response = BadRequestDuplicateResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<ProductView>> {
    let product = service.update(id, input).await?;
    Ok(Json(product))
}

/// Delete a product and its images
#[utoipa::path(
    delete,
    path = "/{term}",
    tag = TAG,
    params(
        ("term" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<StatusCode> {
    service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every product
#[utoipa::path(
    delete,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "Number of deleted products", body = DeletedProducts),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_all_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<DeletedProducts>> {
    let deleted = service.delete_all_products().await?;
    Ok(Json(DeletedProducts { deleted }))
}
