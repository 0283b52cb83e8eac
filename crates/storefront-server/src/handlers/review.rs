//! Product review handlers.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{NewReview, Product, Review, StorefrontError, User};
use storefront_store::Filter;
use tracing::{info, instrument};

use crate::cache::{CacheKey, InvalidationRequest};
use crate::error::AppError;
use crate::extractors::{Caller, IdPath};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

/// Review author embedded in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub photo: String,
}

/// A review as listed under its product. Authors that no longer exist render as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(rename = "_id")]
    pub id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub user: Option<Author>,
    pub product: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewView {
    fn new(review: Review, author: Option<&User>) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            comment: review.comment,
            user: author.map(|user| Author {
                id: user.id.clone(),
                name: user.name.clone(),
                photo: user.photo.clone(),
            }),
            product: review.product,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

async fn reviews_for(state: &AppState, product_id: &str) -> Result<Vec<Review>, AppError> {
    Ok(state
        .reviews()
        .find(&Filter::all().eq("product", product_id))
        .await?)
}

/// Recomputes the product's rating from its stored reviews.
async fn refresh_ratings(state: &AppState, product: &mut Product) -> Result<(), AppError> {
    let ratings: Vec<u8> = reviews_for(state, &product.id)
        .await?
        .iter()
        .map(|r| r.rating)
        .collect();
    product.apply_ratings(&ratings);
    state.products().save(product).await?;
    Ok(())
}

fn review_invalidation(product_id: &str) -> InvalidationRequest {
    InvalidationRequest::new()
        .tag_product()
        .tag_review()
        .tag_admin()
        .for_product(product_id)
}

/// GET /product/reviews/{id}
#[instrument(skip_all, fields(product = %path.id))]
pub async fn product_reviews(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    if state.products().find_by_id(id).await?.is_none() {
        return Err(StorefrontError::not_found("Product", id).into());
    }

    let reviews: Vec<ReviewView> = state
        .cache()
        .read_through(&CacheKey::product_reviews(id), || async {
            let mut reviews = reviews_for(&state, id).await?;
            reviews.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

            let mut authors: HashMap<String, Option<User>> = HashMap::new();
            let mut views = Vec::with_capacity(reviews.len());
            for review in reviews {
                if !authors.contains_key(&review.user) {
                    let user = state.users().find_by_id(&review.user).await?;
                    authors.insert(review.user.clone(), user);
                }
                let author = authors.get(&review.user).and_then(Option::as_ref);
                views.push(ReviewView::new(review, author));
            }
            Ok::<_, AppError>(views)
        })
        .await?;

    ApiResponse::ok().field("reviews", &reviews)
}

/// POST /product/review/new/{id}
///
/// A second review by the same user replaces the first.
#[instrument(skip_all, fields(product = %path.id, user = %caller.id))]
pub async fn new_review(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(path): Path<IdPath>,
    Json(body): Json<NewReview>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let mut product = state
        .products()
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Product", id))?;

    let existing = state
        .reviews()
        .find_one(&Filter::all().eq("product", id).eq("user", caller.id.as_str()))
        .await?;

    let now = Utc::now();
    let (response, message) = match existing {
        Some(mut review) => {
            body.apply_to(&mut review, now)?;
            state.reviews().save(&review).await?;
            (ApiResponse::ok(), "Review updated successfully")
        }
        None => {
            let review = body.into_review(&caller.id, id, now)?;
            state.reviews().insert(&review).await?;
            (ApiResponse::created(), "Review added successfully")
        }
    };

    refresh_ratings(&state, &mut product).await?;
    state.invalidator().invalidate(&review_invalidation(id)).await;

    info!(rating = product.ratings, reviews = product.num_reviews, "Review saved");
    Ok(response.message(message))
}

/// DELETE /product/review/{id}
///
/// Allowed for the author and for admins.
#[instrument(skip_all, fields(review = %path.id, user = %caller.id))]
pub async fn delete_review(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let review = state
        .reviews()
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Review", id))?;

    if review.user != caller.id && !caller.is_admin() {
        return Err(StorefrontError::forbidden("Not authorized to delete this review").into());
    }

    state.reviews().delete(id).await?;

    if let Some(mut product) = state.products().find_by_id(&review.product).await? {
        refresh_ratings(&state, &mut product).await?;
    }
    state
        .invalidator()
        .invalidate(&review_invalidation(&review.product))
        .await;

    info!(product = %review.product, "Review deleted");
    Ok(ApiResponse::ok().message("Review deleted successfully"))
}
