/// Default page size for product listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Storage folder prefix for product images
pub const PRODUCT_IMAGE_FOLDER: &str = "products";
