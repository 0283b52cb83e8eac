//! Order handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use storefront_core::{NewOrder, Order, Product, StorefrontError};
use storefront_store::Filter;
use tracing::{info, instrument, warn};

use crate::cache::{CacheKey, InvalidationRequest};
use crate::error::AppError;
use crate::extractors::{AdminUser, IdPath, MyOrdersQuery};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

async fn load_order(state: &AppState, id: &str) -> Result<Order, AppError> {
    state
        .orders()
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Order", id).into())
}

fn order_invalidation(order: &Order) -> InvalidationRequest {
    InvalidationRequest::new()
        .tag_order()
        .tag_admin()
        .for_user(order.user.clone())
        .for_order(order.id.clone())
}

/// A product with its stock already reduced by `quantity`.
struct Reservation {
    product: Product,
    quantity: u32,
}

/// Totals the ordered quantity per product.
fn total_quantities(order: &Order) -> Result<BTreeMap<&str, u32>, AppError> {
    let mut quantities: BTreeMap<&str, u32> = BTreeMap::new();
    for item in &order.order_items {
        let total = quantities.entry(item.product_id.as_str()).or_default();
        *total = total.checked_add(item.quantity).ok_or_else(|| {
            AppError::BadRequest(format!("Quantity too large for product {}", item.product_id))
        })?;
    }
    Ok(quantities)
}

/// Checks every ordered quantity against stock and returns the updated products.
///
/// Nothing is written, so an order that cannot be fully served leaves stock untouched.
async fn reserve_stock(state: &AppState, order: &Order) -> Result<Vec<Reservation>, AppError> {
    let quantities = total_quantities(order)?;

    let mut reserved = Vec::with_capacity(quantities.len());
    for (product_id, quantity) in quantities {
        let mut product = state
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Product", product_id))?;

        if product.stock < quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        product.stock -= quantity;
        reserved.push(Reservation { product, quantity });
    }
    Ok(reserved)
}

/// Puts reserved quantities back after a failed placement.
async fn restore_stock(state: &AppState, saved: &[Reservation]) {
    for reservation in saved {
        let mut product = reservation.product.clone();
        product.stock = product.stock.saturating_add(reservation.quantity);
        if let Err(e) = state.products().save(&product).await {
            warn!(product = %product.id, error = %e, "Failed to restore reserved stock");
        }
    }
}

/// Writes the reduced stock, then the order. Any failure restores the stock
/// already written.
async fn place_order(
    state: &AppState,
    order: &Order,
    reservations: Vec<Reservation>,
) -> Result<(), AppError> {
    let mut saved = Vec::with_capacity(reservations.len());
    for reservation in reservations {
        if let Err(e) = state.products().save(&reservation.product).await {
            restore_stock(state, &saved).await;
            return Err(e.into());
        }
        saved.push(reservation);
    }

    if let Err(e) = state.orders().insert(order).await {
        restore_stock(state, &saved).await;
        return Err(e.into());
    }
    Ok(())
}

/// POST /order/new
#[instrument(skip_all)]
pub async fn new_order(
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> Result<ApiResponse, AppError> {
    let order = body.into_order(Utc::now())?;

    let reservations = reserve_stock(&state, &order).await?;
    place_order(&state, &order, reservations).await?;

    state
        .invalidator()
        .invalidate(
            &InvalidationRequest::new()
                .tag_product()
                .tag_order()
                .tag_admin()
                .for_user(order.user.clone())
                .for_products(order.product_ids()),
        )
        .await;

    info!(order = %order.id, user = %order.user, total = order.total, "Order placed");
    ApiResponse::created()
        .message("Order placed successfully")
        .field("order", &order)
}

/// GET /order/my?id=
#[instrument(skip_all)]
pub async fn my_orders(
    State(state): State<AppState>,
    Query(query): Query<MyOrdersQuery>,
) -> Result<ApiResponse, AppError> {
    let user_id = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Please provide a user id".to_string()))?;

    let orders: Vec<Order> = state
        .cache()
        .read_through(&CacheKey::my_orders(user_id), || async {
            Ok::<_, AppError>(state.orders().find(&Filter::all().eq("user", user_id)).await?)
        })
        .await?;

    ApiResponse::ok().field("orders", &orders)
}

/// GET /order/all
#[instrument(skip_all)]
pub async fn all_orders(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let orders: Vec<Order> = state
        .cache()
        .read_through(&CacheKey::AllOrders, || async {
            Ok::<_, AppError>(state.orders().all().await?)
        })
        .await?;

    ApiResponse::ok().field("orders", &orders)
}

/// GET /order/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let order: Order = state
        .cache()
        .read_through(&CacheKey::order(id), || load_order(&state, id))
        .await?;

    ApiResponse::ok().field("order", &order)
}

/// PUT /order/{id}
///
/// Moves the order one step along Processing, Shipped, Delivered.
#[instrument(skip_all, fields(id = %path.id))]
pub async fn process_order(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let mut order = load_order(&state, id).await?;

    order.status = order.status.advance();
    order.updated_at = Utc::now();
    state.orders().save(&order).await?;

    state.invalidator().invalidate(&order_invalidation(&order)).await;

    info!(order = %id, status = ?order.status, "Order processed");
    ApiResponse::ok()
        .message("Order processed successfully")
        .field("order", &order)
}

/// DELETE /order/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let order = load_order(&state, id).await?;

    state.orders().delete(id).await?;
    state.invalidator().invalidate(&order_invalidation(&order)).await;

    info!(order = %id, "Order deleted");
    Ok(ApiResponse::ok().message("Order deleted successfully"))
}
