//! Product routes: pages, category lists, creation, edits, review and deletion.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use arvigo_core::{BrandId, CategoryId, ProductId, ProductStatus, Role, parse_tag_ids};

use super::validate::{Validator, positive_id};
use crate::error::Result;
use crate::middleware::{ApiKey, AuthUser};
use crate::models::{
    MarketplaceProduct, MerchantProductEdit, ProductCard, ProductDetail, ProductExport,
    ProductReview,
};
use crate::response::{ApiJson, ApiResponse};
use crate::services::catalog::{ImageUpload, ProductForm};
use crate::state::AppState;

/// Multipart part carrying an image file.
const IMAGES_FIELD: &str = "images";

/// Review decision sent by an admin.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    pub product_id: i64,
    /// `approved` or `rejected`.
    pub status: String,
    /// Required when rejecting.
    pub rejected_note: String,
}

impl VerifyRequest {
    fn review(&self) -> Result<(ProductId, ProductReview)> {
        let status = match self.status.trim() {
            "approved" => Some(ProductStatus::Approved),
            "rejected" => Some(ProductStatus::Rejected),
            _ => None,
        };
        let note = self.rejected_note.trim();

        Validator::new()
            .check(self.product_id > 0, "product_id", "product_id must be a positive id")
            .check(status.is_some(), "status", "status must be approved or rejected")
            .check(
                status != Some(ProductStatus::Rejected) || !note.is_empty(),
                "rejected_note",
                "rejected_note is required when rejecting",
            )
            .finish()?;

        let status = status.unwrap_or(ProductStatus::Approved);
        let rejected_note = (status == ProductStatus::Rejected).then(|| note.to_owned());
        Ok((
            ProductId::new(self.product_id),
            ProductReview {
                status,
                rejected_note,
            },
        ))
    }
}

/// A merchant's edit of one of its products.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMerchantProductRequest {
    pub product_id: i64,
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
}

impl UpdateMerchantProductRequest {
    fn edit(&self) -> Result<(ProductId, MerchantProductEdit)> {
        Validator::new()
            .check(self.product_id > 0, "product_id", "product_id must be a positive id")
            .required("name", &self.name)
            .required("description", &self.description)
            .check(
                self.price.is_some_and(|p| !p.is_sign_negative()),
                "price",
                "price must be a non-negative number",
            )
            .finish()?;

        Ok((
            ProductId::new(self.product_id),
            MerchantProductEdit {
                name: self.name.trim().to_owned(),
                description: self.description.trim().to_owned(),
                price: self.price.unwrap_or_default(),
            },
        ))
    }
}

/// GET /v1/products/initials/{id}
///
/// # Errors
///
/// Returns 400 for a bad id and 404 for an unknown product.
pub async fn show(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<ProductDetail>> {
    let id = ProductId::new(positive_id(&id, "Invalid product ID")?);
    let product = state.catalog().product_detail(id).await?;
    Ok(ApiResponse::ok("Success", product))
}

/// GET /v1/products/initials/category/{id}
///
/// # Errors
///
/// Returns 400 for a bad id.
pub async fn by_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<ProductCard>>> {
    let id = CategoryId::new(positive_id(&id, "Invalid category ID")?);
    let products = state.catalog().category_products(id).await?;
    Ok(ApiResponse::ok("Success", products))
}

/// POST /v1/products/initials
///
/// Creates a platform-owned product, published immediately.
///
/// # Errors
///
/// Returns 400 for an unreadable form, invalid fields or no images.
pub async fn create_initial(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<()>> {
    let form = read_product_form(multipart?).await?;
    state.catalog().create_product(form, None).await?;
    Ok(ApiResponse::message(StatusCode::CREATED, "Product created"))
}

/// POST /v1/products/merchants
///
/// Creates a product of the caller's merchant, pending review.
///
/// # Errors
///
/// As [`create_initial`], plus 404 if the caller owns no merchant.
pub async fn create_for_merchant(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<()>> {
    let merchant = state.merchants().merchant_for(user.id).await?;
    let form = read_product_form(multipart?).await?;
    state.catalog().create_product(form, Some(merchant)).await?;
    Ok(ApiResponse::message(StatusCode::CREATED, "Product created"))
}

/// PUT /v1/products/initials/{id}
///
/// Replaces a platform product's fields, images and tags.
///
/// # Errors
///
/// Returns 400 for a bad id, an unreadable form, invalid fields or no
/// images, and 404 for an unknown product.
pub async fn update_initial(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<()>> {
    let id = ProductId::new(positive_id(&id, "Invalid product ID")?);
    let form = read_product_form(multipart?).await?;
    state.catalog().update_product(id, form).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Product updated"))
}

/// GET /v1/products/initials/marketplace/{id}
///
/// Counts the visit and lists where the product is sold.
///
/// # Errors
///
/// Returns 400 for a bad id and 404 for an unknown product.
pub async fn marketplace(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<MarketplaceProduct>> {
    let id = ProductId::new(positive_id(&id, "Invalid product ID")?);
    tracing::debug!(user_id = %user.id, product_id = %id, "Marketplace view");
    let product = state.catalog().marketplace_product(id).await?;
    Ok(ApiResponse::ok("Success", product))
}

/// PUT /v1/products/merchants
///
/// Edits one of the caller's merchant products and sends it back to review.
///
/// # Errors
///
/// Returns 400 for invalid fields and 404 if the caller owns no merchant or
/// the product is not theirs.
pub async fn update_for_merchant(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpdateMerchantProductRequest>,
) -> Result<ApiResponse<()>> {
    let (id, edit) = request.edit()?;
    let merchant = state.merchants().merchant_for(user.id).await?;
    state
        .catalog()
        .update_merchant_product(merchant, id, edit)
        .await?;
    Ok(ApiResponse::message(StatusCode::OK, "Product updated"))
}

/// PUT /v1/products/merchants/verify
///
/// Admin review of a merchant product.
///
/// # Errors
///
/// Returns 403 for non-admins, 400 for invalid fields and 404 if there is no
/// merchant product with this id.
pub async fn verify(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<ApiResponse<()>> {
    user.require_role(state.tables(), Role::Admin)?;
    let (id, review) = request.review()?;
    state.catalog().review_product(id, review).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Product updated"))
}

/// GET /v1/product-recommendation
///
/// Visible products for the recommendation service to index.
///
/// # Errors
///
/// Returns 401 without the configured `x-api-key`.
pub async fn recommendation_export(
    State(state): State<AppState>,
    _key: ApiKey,
) -> Result<ApiResponse<Vec<ProductExport>>> {
    let products = state.catalog().export_products().await?;
    Ok(ApiResponse::ok("Success", products))
}

/// DELETE /v1/products/{id}
///
/// # Errors
///
/// Returns 400 for a bad id and 404 for an unknown product.
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let id = ProductId::new(positive_id(&id, "Invalid product ID")?);
    state.catalog().delete_product(id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Success"))
}

/// Read text fields and image parts, then validate the text fields.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == IMAGES_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                images.push(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }

    parse_product_form(&fields, images)
}

fn field_text<'a>(fields: &'a HashMap<String, String>, key: &str) -> &'a str {
    fields.get(key).map_or("", |v| v.trim())
}

fn parse_product_form(
    fields: &HashMap<String, String>,
    images: Vec<ImageUpload>,
) -> Result<ProductForm> {
    let text = |key: &str| field_text(fields, key);

    let price = text("price").parse::<Decimal>().ok();
    let brand_id = positive_id(text("brand_id"), "").ok();
    let category_id = positive_id(text("category_id"), "").ok();

    Validator::new()
        .required("name", text("name"))
        .required("description", text("description"))
        .check(
            price.is_some_and(|p| !p.is_sign_negative()),
            "price",
            "price must be a non-negative number",
        )
        .check(brand_id.is_some(), "brand_id", "brand_id must be a positive id")
        .check(
            category_id.is_some(),
            "category_id",
            "category_id must be a positive id",
        )
        .finish()?;

    Ok(ProductForm {
        name: text("name").to_owned(),
        description: text("description").to_owned(),
        price: price.unwrap_or_default(),
        brand_id: BrandId::new(brand_id.unwrap_or_default()),
        category_id: CategoryId::new(category_id.unwrap_or_default()),
        tags: parse_tag_ids(text("tags")),
        images,
    })
}
