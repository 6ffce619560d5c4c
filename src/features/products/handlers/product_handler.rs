use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{
    CreateProductDto, CreateProductFormDto, ImageField, ImageUpload, ListProductsQuery,
    ProductListResponseDto, ProductResponseDto, UpdateProductFields, UpdateProductFormDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::{ErrorResponse, MessageResponse};

/// List products with optional search and pagination
///
/// `search` matches case-insensitively against name, description or category.
/// Either `limit`+`offset` or `limit`+`page` may be supplied; an explicit
/// `offset` wins, and the returned `page` is always recomputed from it.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Paginated product listing", body = ProductListResponseDto),
        (status = 500, description = "Persistence error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ProductListResponseDto>> {
    let listing = service.list(&query).await?;
    Ok(Json(listing))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponseDto),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Persistence error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponseDto>> {
    let product = service.get(id).await?;
    Ok(Json(product))
}

/// Create a product
///
/// Accepts multipart/form-data with name, description, price, category and a
/// mandatory image file. The image is uploaded to storage before the row is
/// inserted; a failed insert deletes the fresh upload again.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body(
        content = CreateProductFormDto,
        content_type = "multipart/form-data",
        description = "Product fields plus the image file",
    ),
    responses(
        (status = 201, description = "Product created", body = ProductResponseDto),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse),
        (status = 500, description = "Upload or persistence error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(service): State<Arc<ProductService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProductResponseDto>)> {
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut price_text: Option<String> = None;
    let mut category: Option<String> = None;
    let mut image: Option<ImageField> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "name" => name = Some(text_field(field).await?),
            "description" => description = Some(text_field(field).await?),
            "price" => price_text = Some(text_field(field).await?),
            "category" => category = Some(text_field(field).await?),
            "image" => image = Some(image_field(field).await?),
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (Some(name), Some(description), Some(price_text), Some(category), Some(image)) =
        (name, description, price_text, category, image)
    else {
        return Err(AppError::Validation(
            "Required fields: name, description, price, category, image".to_string(),
        ));
    };

    let image = match image {
        ImageField::File(upload) => upload,
        ImageField::Url(_) => {
            return Err(AppError::Validation(
                "The image must be an uploaded file".to_string(),
            ))
        }
    };

    let price = parse_price(&price_text)?;

    let dto = CreateProductDto {
        name,
        description,
        price,
        category,
        image,
    };
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = service.create(dto).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
///
/// All fields are optional; empty text fields are ignored, and a price of 0
/// counts as "not supplied". The image may be a new file (the old stored
/// image is deleted after the row update succeeds) or a URL string (applied
/// only when it differs from the current value).
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    request_body(
        content = UpdateProductFormDto,
        content_type = "multipart/form-data",
        description = "Any subset of product fields",
    ),
    responses(
        (status = 200, description = "Product updated", body = ProductResponseDto),
        (status = 400, description = "Malformed field", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Upload or persistence error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProductResponseDto>> {
    let mut fields = UpdateProductFields::default();

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "name" => fields.name = non_empty(text_field(field).await?),
            "description" => fields.description = non_empty(text_field(field).await?),
            "category" => fields.category = non_empty(text_field(field).await?),
            "price" => {
                if let Some(text) = non_empty(text_field(field).await?) {
                    fields.price = Some(parse_price(&text)?);
                }
            }
            "image" => fields.image = Some(image_field(field).await?),
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let product = service.update(id, fields).await?;
    Ok(Json(product))
}

/// Delete a product and its stored image
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Persistence error", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    service.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>> {
    multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })
}

async fn text_field(field: Field<'_>) -> Result<String> {
    let name = field.name().unwrap_or("").to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read field '{}': {}", name, e)))
}

/// Read the `image` field as either a real file upload or a raw URL string
async fn image_field(field: Field<'_>) -> Result<ImageField> {
    if field.file_name().is_some() {
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        Ok(ImageField::File(ImageUpload {
            data: data.to_vec(),
            content_type,
        }))
    } else {
        Ok(ImageField::Url(text_field(field).await?))
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_price(text: &str) -> Result<Decimal> {
    let price: Decimal = text
        .parse()
        .map_err(|_| AppError::Validation("price must be a valid number".to_string()))?;

    if price.is_sign_negative() {
        return Err(AppError::Validation(
            "price must be greater than or equal to 0".to_string(),
        ));
    }

    Ok(price)
}
