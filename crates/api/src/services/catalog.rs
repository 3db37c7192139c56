//! Product catalog service.

use rust_decimal::Decimal;
use tracing::instrument;

use arvigo_core::{
    BrandId, CatalogTables, CategoryId, MerchantId, ProductId, ProductImages, ProductStatus, TagId,
};

use super::ServiceError;
use super::listings::store_listings;
use crate::db::{AddressLookup, CatalogStore, RepositoryError};
use crate::models::{
    MarketplaceProduct, MerchantProductEdit, NewProduct, ProductCard, ProductDetail,
    ProductExport, ProductFilter, ProductReview, ProductSummary, ProductUpdate,
};
use crate::uploads::ImageStore;

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fields of the product form.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand_id: BrandId,
    pub category_id: CategoryId,
    pub tags: Vec<TagId>,
    pub images: Vec<ImageUpload>,
}

/// Cards for a list of products: primary image plus deduplicated tag names.
pub(crate) async fn product_cards(
    catalog: &dyn CatalogStore,
    tables: &CatalogTables,
    products: Vec<ProductSummary>,
) -> Result<Vec<ProductCard>, RepositoryError> {
    let mut cards = Vec::with_capacity(products.len());
    for product in products {
        let tags = catalog.product_tag_ids(product.id).await?;
        cards.push(ProductCard::new(product, tables.tag_names_for(&tags)));
    }
    Ok(cards)
}

/// Product catalog service.
pub struct CatalogService<'a> {
    catalog: &'a dyn CatalogStore,
    addresses: &'a dyn AddressLookup,
    images: &'a dyn ImageStore,
    tables: &'a CatalogTables,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(
        catalog: &'a dyn CatalogStore,
        addresses: &'a dyn AddressLookup,
        images: &'a dyn ImageStore,
        tables: &'a CatalogTables,
    ) -> Self {
        Self {
            catalog,
            addresses,
            images,
            tables,
        }
    }

    /// Platform products of a category.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a query fails.
    #[instrument(skip(self), fields(category_id = %category))]
    pub async fn category_products(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ProductCard>, ServiceError> {
        let products = self
            .catalog
            .platform_products(ProductFilter {
                category: Some(category),
                tags: None,
            })
            .await?;

        Ok(product_cards(self.catalog, self.tables, products).await?)
    }

    /// Full product page with every image, tag names and listings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_detail(&self, id: ProductId) -> Result<ProductDetail, ServiceError> {
        let product = self
            .catalog
            .product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_owned()))?;

        let tag_ids = self.catalog.product_tag_ids(id).await?;
        let listings = self.catalog.product_listings(id).await?;
        let marketplaces = store_listings(self.addresses, self.tables, listings).await;

        Ok(ProductDetail {
            id: product.id,
            images: product.images.all(),
            name: product.name,
            description: product.description,
            price: product.price,
            brand_name: product.brand_name,
            category_name: product.category_name,
            status: product.status,
            is_subscription_active: product.is_subscription_active,
            rejected_note: product.rejected_note,
            link_external: product.link_external,
            tags: self.tables.tag_names_for(&tag_ids),
            marketplaces,
        })
    }

    /// Store the images and insert a product.
    ///
    /// Platform products (`merchant` is `None`) are published immediately;
    /// merchant products wait for review. Images already written are removed
    /// again if a later image or the insert fails.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::BadRequest` if no image was uploaded and
    /// `ServiceError::Storage` if an image cannot be written.
    #[instrument(skip(self, form), fields(name = %form.name, images = form.images.len()))]
    pub async fn create_product(
        &self,
        form: ProductForm,
        merchant: Option<MerchantId>,
    ) -> Result<ProductId, ServiceError> {
        if form.images.is_empty() {
            return Err(ServiceError::BadRequest("Images must be filled".to_owned()));
        }

        let urls = self.save_images(&form.images).await?;

        let status = if merchant.is_some() {
            ProductStatus::Pending
        } else {
            ProductStatus::Approved
        };

        let product = NewProduct {
            name: form.name,
            description: form.description,
            price: form.price,
            brand_id: form.brand_id,
            category_id: form.category_id,
            merchant_id: merchant,
            images: ProductImages::from_urls(&urls),
            status,
            tags: form.tags,
        };

        match self.catalog.create_product(&product).await {
            Ok(id) => {
                tracing::info!(product_id = %id, status = %status, "Product created");
                Ok(id)
            }
            Err(e) => {
                self.discard_images(&urls).await;
                Err(e.into())
            }
        }
    }

    /// Replace a platform product's fields, images and tags.
    ///
    /// The new images replace the old ones, which are removed from storage
    /// once the row is updated.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::BadRequest` if no image was uploaded and
    /// `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self, form), fields(product_id = %id, images = form.images.len()))]
    pub async fn update_product(
        &self,
        id: ProductId,
        form: ProductForm,
    ) -> Result<(), ServiceError> {
        if form.images.is_empty() {
            return Err(ServiceError::BadRequest("Images must be filled".to_owned()));
        }

        let urls = self.save_images(&form.images).await?;
        let update = ProductUpdate {
            name: form.name,
            description: form.description,
            price: form.price,
            brand_id: form.brand_id,
            category_id: form.category_id,
            images: ProductImages::from_urls(&urls),
            tags: form.tags,
        };

        match self.catalog.update_product(id, &update).await {
            Ok(Some(previous)) => {
                self.discard_images(&previous.all()).await;
                tracing::info!("Product updated");
                Ok(())
            }
            Ok(None) => {
                self.discard_images(&urls).await;
                Err(ServiceError::NotFound("Product not found".to_owned()))
            }
            Err(e) => {
                self.discard_images(&urls).await;
                Err(e.into())
            }
        }
    }

    /// Edit a merchant's own product; it goes back to review.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the merchant has no such product.
    #[instrument(skip(self, edit), fields(merchant_id = %merchant, product_id = %id))]
    pub async fn update_merchant_product(
        &self,
        merchant: MerchantId,
        id: ProductId,
        edit: MerchantProductEdit,
    ) -> Result<(), ServiceError> {
        if self
            .catalog
            .update_merchant_product(merchant, id, &edit)
            .await?
        {
            tracing::info!("Merchant product updated, pending review");
            Ok(())
        } else {
            Err(ServiceError::NotFound("Product not found".to_owned()))
        }
    }

    /// Approve or reject a merchant product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no merchant product with
    /// this id.
    #[instrument(skip(self, review), fields(product_id = %id, status = %review.status))]
    pub async fn review_product(
        &self,
        id: ProductId,
        review: ProductReview,
    ) -> Result<(), ServiceError> {
        if self.catalog.review_product(id, &review).await? {
            tracing::info!("Product reviewed");
            Ok(())
        } else {
            Err(ServiceError::NotFound("Product not found".to_owned()))
        }
    }

    /// Count a visit and list where the product is sold.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn marketplace_product(
        &self,
        id: ProductId,
    ) -> Result<MarketplaceProduct, ServiceError> {
        if !self.catalog.record_click(id).await? {
            return Err(ServiceError::NotFound("Product not found".to_owned()));
        }

        let product = self
            .catalog
            .product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_owned()))?;
        let listings = self.catalog.product_listings(id).await?;
        let marketplaces = store_listings(self.addresses, self.tables, listings).await;

        Ok(MarketplaceProduct {
            product_id: product.id,
            image: product.images.primary().to_owned(),
            name: product.name,
            brand: product.brand_name,
            price: product.price,
            marketplaces,
        })
    }

    /// Every visible product with its tag names, for the recommendation index.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a query fails.
    #[instrument(skip(self))]
    pub async fn export_products(&self) -> Result<Vec<ProductExport>, ServiceError> {
        let records = self.catalog.export_products().await?;
        let mut exports = Vec::with_capacity(records.len());
        for record in records {
            let tags = self.catalog.product_tag_ids(record.id).await?;
            exports.push(ProductExport::new(record, &self.tables.tag_names_for(&tags)));
        }
        Ok(exports)
    }

    /// Delete a product with its tags and listings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        if self.catalog.delete_product(id).await? {
            tracing::info!("Product deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound("Product not found".to_owned()))
        }
    }

    /// Write every upload, removing the ones already written if one fails.
    async fn save_images(&self, images: &[ImageUpload]) -> Result<Vec<String>, ServiceError> {
        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            match self.images.save(&image.file_name, &image.bytes).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    self.discard_images(&urls).await;
                    return Err(e.into());
                }
            }
        }
        Ok(urls)
    }

    /// Best-effort removal of stored images.
    async fn discard_images(&self, urls: &[String]) {
        for url in urls {
            if let Err(e) = self.images.delete(url).await {
                tracing::warn!(url = %url, error = %e, "Failed to remove image");
            }
        }
    }
}
