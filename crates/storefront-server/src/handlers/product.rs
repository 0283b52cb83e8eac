//! Product catalog handlers.

use axum::extract::{Multipart, Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use storefront_core::{Photo, Product, StorefrontError};
use storefront_store::{Filter, FindOptions, StoredObject, Upload};
use tracing::{info, instrument, warn};

use crate::cache::{CacheKey, InvalidationRequest};
use crate::error::AppError;
use crate::extractors::{AdminUser, IdPath, SearchQuery, read_product_form};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

/// One cached page of search results.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub products: Vec<Product>,
    pub total_page: usize,
}

fn to_photos(stored: Vec<StoredObject>) -> Vec<Photo> {
    stored
        .into_iter()
        .map(|object| Photo {
            public_id: object.id,
            url: object.url,
        })
        .collect()
}

fn check_photo_count(count: usize, max: usize) -> Result<(), AppError> {
    if count == 0 {
        return Err(AppError::BadRequest(
            "Please upload at least one photo".to_string(),
        ));
    }
    if count > max {
        return Err(AppError::BadRequest(format!(
            "You can only upload {max} photos"
        )));
    }
    Ok(())
}

/// Uploads photos, or nothing at all: a partial failure releases what was stored.
async fn upload_photos(state: &AppState, uploads: Vec<Upload>) -> Result<Vec<Photo>, AppError> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match state.objects().upload(upload).await {
            Ok(object) => stored.push(object),
            Err(e) => {
                let ids: Vec<String> = stored.into_iter().map(|o| o.id).collect();
                release_photos(state, &ids).await;
                return Err(e.into());
            }
        }
    }
    Ok(to_photos(stored))
}

async fn release_photos(state: &AppState, ids: &[String]) {
    if ids.is_empty() {
        return;
    }
    if let Err(e) = state.objects().delete_many(ids).await {
        warn!(ids = ?ids, error = %e, "Failed to release product photos");
    }
}

async fn load_product(state: &AppState, id: &str) -> Result<Product, AppError> {
    state
        .products()
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Product", id).into())
}

/// POST /product/new
#[instrument(skip_all)]
pub async fn new_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse, AppError> {
    let form = read_product_form(multipart).await?;
    let (draft, uploads) = form.into_new_product();

    check_photo_count(uploads.len(), state.catalog().max_photos)?;
    let mut product = draft.into_product(Vec::new(), Utc::now())?;

    product.photos = upload_photos(&state, uploads).await?;
    if let Err(e) = state.products().insert(&product).await {
        release_photos(&state, &product.photo_ids()).await;
        return Err(e.into());
    }

    state
        .invalidator()
        .invalidate(&InvalidationRequest::new().tag_product().tag_admin())
        .await;

    info!(product = %product.id, "Product created");
    ApiResponse::created()
        .message("Product created successfully")
        .field("product", &product)
}

/// GET /product/latest
#[instrument(skip_all)]
pub async fn latest_products(State(state): State<AppState>) -> Result<ApiResponse, AppError> {
    let limit = state.catalog().latest_limit;
    let products: Vec<Product> = state
        .cache()
        .read_through(&CacheKey::LatestProducts, || async {
            let mut products = state.products().all().await?;
            // Newest insert first among equal timestamps
            products.reverse();
            products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            products.truncate(limit);
            Ok::<_, AppError>(products)
        })
        .await?;

    ApiResponse::ok().field("products", &products)
}

/// GET /product/categories
#[instrument(skip_all)]
pub async fn categories(State(state): State<AppState>) -> Result<ApiResponse, AppError> {
    let categories: Vec<String> = state
        .cache()
        .read_through(&CacheKey::Categories, || async {
            Ok::<_, AppError>(state.products().distinct_strings("category").await?)
        })
        .await?;

    ApiResponse::ok().field("categories", &categories)
}

/// GET /product/admin/products
#[instrument(skip_all)]
pub async fn admin_products(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let products: Vec<Product> = state
        .cache()
        .read_through(&CacheKey::AllProducts, || async {
            Ok::<_, AppError>(state.products().all().await?)
        })
        .await?;

    ApiResponse::ok().field("products", &products)
}

/// GET /product/all
///
/// Pages expire after the search TTL rather than being invalidated.
#[instrument(skip_all, fields(page = query.page()))]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse, AppError> {
    let key = CacheKey::ProductSearch(query.cache_key());
    let per_page = state.catalog().per_page;

    let page: SearchPage = state
        .cache()
        .read_through_with_ttl(&key, state.search_ttl(), || async {
            let mut filter = Filter::all();
            if let Some(search) = query.search() {
                filter = filter.contains("name", search);
            }
            if let Some(price) = query.max_price() {
                filter = filter.lte("price", price);
            }
            if let Some(category) = query.category() {
                filter = filter.eq("category", category.to_lowercase());
            }

            // Pages past the end are empty, never an overflow
            let skip = query.page().saturating_sub(1).saturating_mul(per_page);
            let mut options = FindOptions::new().skip(skip).limit(per_page);
            if let Some(order) = query.sort_order() {
                options = options.sort_by("price", order);
            }

            let products = state.products().find_with(&filter, &options).await?;
            let total = state.products().count(&filter).await?;

            Ok::<_, AppError>(SearchPage {
                products,
                total_page: total.div_ceil(per_page),
            })
        })
        .await?;

    ApiResponse::ok()
        .field("products", &page.products)?
        .field("totalPage", &page.total_page)
}

/// GET /product/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let product: Product = state
        .cache()
        .read_through(&CacheKey::product(id), || load_product(&state, id))
        .await?;

    ApiResponse::ok().field("product", &product)
}

/// PUT /product/{id}
///
/// Uploaded photos replace the stored ones; without photos they are kept.
#[instrument(skip_all, fields(id = %path.id))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
    multipart: Multipart,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let mut product = load_product(&state, id).await?;

    let form = read_product_form(multipart).await?;
    let (patch, uploads) = form.into_patch();
    if !uploads.is_empty() {
        check_photo_count(uploads.len(), state.catalog().max_photos)?;
    }
    patch.apply(&mut product, Utc::now())?;

    let replaced = if uploads.is_empty() {
        Vec::new()
    } else {
        let old = product.photo_ids();
        product.photos = upload_photos(&state, uploads).await?;
        old
    };

    if let Err(e) = state.products().save(&product).await {
        if !replaced.is_empty() {
            release_photos(&state, &product.photo_ids()).await;
        }
        return Err(e.into());
    }
    release_photos(&state, &replaced).await;

    state
        .invalidator()
        .invalidate(
            &InvalidationRequest::new()
                .tag_product()
                .tag_admin()
                .for_product(id),
        )
        .await;

    info!(product = %id, "Product updated");
    ApiResponse::ok()
        .message("Product updated successfully")
        .field("product", &product)
}

/// DELETE /product/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let product = load_product(&state, id).await?;

    state.products().delete(id).await?;
    release_photos(&state, &product.photo_ids()).await;

    state
        .invalidator()
        .invalidate(
            &InvalidationRequest::new()
                .tag_product()
                .tag_admin()
                .for_product(id),
        )
        .await;

    info!(product = %id, "Product deleted");
    Ok(ApiResponse::ok().message("Product deleted successfully"))
}
