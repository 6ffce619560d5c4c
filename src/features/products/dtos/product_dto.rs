use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::shared::constants::DEFAULT_PAGE_SIZE;

/// Query params for listing products
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct ListProductsQuery {
    /// Case-insensitive substring match against name, description or category
    pub search: Option<String>,
    /// Page size (default: 10)
    pub limit: Option<i64>,
    /// Row offset; takes precedence over `page` when both are supplied
    pub offset: Option<i64>,
    /// 1-based page number, used only when `offset` is absent
    pub page: Option<i64>,
}

impl ListProductsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Effective row offset. An explicit `offset` wins over `page`.
    pub fn offset(&self) -> i64 {
        match (self.offset, self.page) {
            (Some(offset), _) => offset.max(0),
            (None, Some(page)) => (page.max(1) - 1) * self.limit(),
            (None, None) => 0,
        }
    }

    /// SQL ILIKE pattern for the search term, if any
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()))
    }
}

/// Response DTO for a single product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated product listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponseDto {
    pub data: Vec<ProductResponseDto>,
    /// Count of rows matching the filter, ignoring pagination
    pub total: i64,
    /// Recomputed as floor(offset/limit)+1, so it can diverge from a
    /// caller-supplied `page` when `offset` was passed directly
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl ProductListResponseDto {
    pub fn new(data: Vec<ProductResponseDto>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            data,
            total,
            page: offset / limit + 1,
            limit,
            total_pages: total_pages(total, limit),
        }
    }
}

/// ceil(total / limit); 0 when there are no rows
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// An image file read out of a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// The `image` field of an update form: either a fresh file or a raw URL string
#[derive(Debug, Clone)]
pub enum ImageField {
    File(ImageUpload),
    Url(String),
}

/// Validated fields for creating a product (image presence is checked upstream)
#[derive(Debug, Validate)]
pub struct CreateProductDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    pub image: ImageUpload,
}

/// Parsed multipart fields for a product update; absent fields leave the
/// corresponding column unchanged
#[derive(Debug, Default)]
pub struct UpdateProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<ImageField>,
}

impl UpdateProductFields {
    /// A supplied price of exactly 0 is treated as "not supplied", matching
    /// the falsy check this endpoint has always had
    pub fn effective_price(&self) -> Option<Decimal> {
        self.price.filter(|p| !p.is_zero())
    }
}

/// Create form for OpenAPI documentation only; the handler reads the
/// multipart body directly
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateProductFormDto {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    /// Product image file (required)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Update form for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UpdateProductFormDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    /// New image file, or an image URL string
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(
        limit: Option<i64>,
        offset: Option<i64>,
        page: Option<i64>,
    ) -> ListProductsQuery {
        ListProductsQuery {
            search: None,
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn limit_defaults_to_ten_and_has_a_floor_of_one() {
        assert_eq!(query(None, None, None).limit(), 10);
        assert_eq!(query(Some(25), None, None).limit(), 25);
        assert_eq!(query(Some(0), None, None).limit(), 1);
        assert_eq!(query(Some(-3), None, None).limit(), 1);
    }

    #[test]
    fn offset_derived_from_page_when_absent() {
        assert_eq!(query(Some(10), None, Some(1)).offset(), 0);
        assert_eq!(query(Some(10), None, Some(3)).offset(), 20);
        assert_eq!(query(Some(7), None, Some(4)).offset(), 21);
        assert_eq!(query(None, None, None).offset(), 0);
    }

    #[test]
    fn explicit_offset_wins_over_page() {
        assert_eq!(query(Some(10), Some(35), Some(2)).offset(), 35);
    }

    #[test]
    fn returned_page_recomputed_from_offset() {
        // page = floor(offset/limit) + 1, even when it diverges from the request
        let dto = ProductListResponseDto::new(vec![], 100, 10, 35);
        assert_eq!(dto.page, 4);

        let dto = ProductListResponseDto::new(vec![], 100, 10, 20);
        assert_eq!(dto.page, 3);
    }

    #[test]
    fn page_and_offset_round_trip() {
        for limit in [1_i64, 3, 10, 25] {
            for page in 1_i64..=5 {
                let q = query(Some(limit), None, Some(page));
                let dto = ProductListResponseDto::new(vec![], 0, q.limit(), q.offset());
                assert_eq!(dto.page, page);
            }
        }
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(99, 10), 10);
    }

    #[test]
    fn search_pattern_is_lowercased_substring() {
        let q = ListProductsQuery {
            search: Some("ChAiR".to_string()),
            ..Default::default()
        };
        assert_eq!(q.search_pattern().as_deref(), Some("%chair%"));

        let q = ListProductsQuery {
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(q.search_pattern(), None);
    }

    #[test]
    fn zero_price_counts_as_not_supplied() {
        use rust_decimal::Decimal;

        let fields = UpdateProductFields {
            price: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert_eq!(fields.effective_price(), None);

        let fields = UpdateProductFields {
            price: Some(Decimal::new(5999, 2)),
            ..Default::default()
        };
        assert_eq!(fields.effective_price(), Some(Decimal::new(5999, 2)));
    }
}
