use utoipa::{Modify, OpenApi};

use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Products
        products_handlers::list_products,
        products_handlers::get_product,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageResponse,
            // Products
            products_dtos::ProductResponseDto,
            products_dtos::ProductListResponseDto,
            products_dtos::CreateProductFormDto,
            products_dtos::UpdateProductFormDto,
        )
    ),
    tags(
        (name = "products", description = "Product catalog CRUD with image upload"),
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalog API documentation",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
