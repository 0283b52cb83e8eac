//! Tag-based cache invalidation.
//!
//! Writes describe what changed as an [`InvalidationRequest`]: a set of tags
//! plus the ids they are scoped to. The request derives the exact keys to drop
//! and the [`InvalidationRouter`] removes them with a single multi-key delete.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::cache::key_store::KeyStore;
use crate::cache::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// Entity kinds changed by a write, optionally scoped to ids.
///
/// On the wire `productId` may be a single id or a list of ids.
///
/// # Examples
///
/// ```
/// use storefront_server::cache::InvalidationRequest;
///
/// let request = InvalidationRequest::new()
///     .tag_product()
///     .for_products(["p1", "p2"]);
///
/// let keys: Vec<String> = request.keys().into_iter().collect();
/// assert_eq!(
///     keys,
///     vec!["all-products", "categories", "latest-products", "product-p1", "product-p2"]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvalidationRequest {
    pub product: bool,
    pub order: bool,
    pub admin: bool,
    pub review: bool,
    pub coupon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub product_id: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<String>,
}

impl InvalidationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag_product(mut self) -> Self {
        self.product = true;
        self
    }

    pub fn tag_order(mut self) -> Self {
        self.order = true;
        self
    }

    pub fn tag_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn tag_review(mut self) -> Self {
        self.review = true;
        self
    }

    pub fn tag_coupon(mut self) -> Self {
        self.coupon = true;
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn for_order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn for_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id.push(product_id.into());
        self
    }

    pub fn for_products<I, S>(mut self, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.product_id
            .extend(product_ids.into_iter().map(Into::into));
        self
    }

    pub fn for_coupon(mut self, coupon_id: impl Into<String>) -> Self {
        self.coupon_id = Some(coupon_id.into());
        self
    }

    /// True when no tag is set.
    pub fn is_empty(&self) -> bool {
        !(self.product || self.order || self.admin || self.review || self.coupon)
    }

    /// The union of the keys every set tag contributes.
    pub fn keys(&self) -> BTreeSet<String> {
        let mut keys = Vec::new();
        if self.product {
            keys.extend(product_keys(&self.product_id));
        }
        if self.order {
            keys.extend(order_keys(self.user_id.as_deref(), self.order_id.as_deref()));
        }
        if self.admin {
            keys.extend(admin_keys());
        }
        if self.review {
            keys.extend(review_keys(&self.product_id));
        }
        if self.coupon {
            keys.extend(coupon_keys(self.coupon_id.as_deref()));
        }
        keys.into_iter().map(String::from).collect()
    }
}

/// Catalog listings plus one detail key per product id.
pub fn product_keys(product_ids: &[String]) -> Vec<CacheKey> {
    let mut keys = vec![
        CacheKey::Categories,
        CacheKey::LatestProducts,
        CacheKey::AllProducts,
    ];
    keys.extend(product_ids.iter().map(CacheKey::product));
    keys
}

/// The order listing plus the caller's listing and the order detail when known.
pub fn order_keys(user_id: Option<&str>, order_id: Option<&str>) -> Vec<CacheKey> {
    let mut keys = vec![CacheKey::AllOrders];
    keys.extend(user_id.map(CacheKey::my_orders));
    keys.extend(order_id.map(CacheKey::order));
    keys
}

/// The precomputed dashboard views.
pub fn admin_keys() -> Vec<CacheKey> {
    CacheKey::dashboard().to_vec()
}

/// One review listing per product id.
pub fn review_keys(product_ids: &[String]) -> Vec<CacheKey> {
    product_ids.iter().map(CacheKey::product_reviews).collect()
}

pub fn coupon_keys(coupon_id: Option<&str>) -> Vec<CacheKey> {
    coupon_id.map(CacheKey::coupon).into_iter().collect()
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids,
    })
}

/// Outcome of an invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationResult {
    /// Keys targeted by the request.
    pub keys: Vec<String>,
    /// Keys that existed and were removed.
    pub removed: usize,
    /// False when the key store call failed.
    pub applied: bool,
}

/// Turns invalidation requests into one multi-key delete.
///
/// Must run after the triggering write has committed.
#[derive(Clone)]
pub struct InvalidationRouter {
    store: Arc<dyn KeyStore>,
    metrics: CacheMetrics,
}

impl InvalidationRouter {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            store,
            metrics: CacheMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Deletes every key the request derives.
    ///
    /// Failures are logged and reported in the result, never returned.
    pub async fn invalidate(&self, request: &InvalidationRequest) -> InvalidationResult {
        let keys = request.keys();
        if keys.is_empty() {
            debug!("Invalidation request derived no keys");
            return InvalidationResult {
                keys: Vec::new(),
                removed: 0,
                applied: true,
            };
        }

        match self.store.delete_many(&keys).await {
            Ok(removed) => {
                self.metrics.record_invalidated(removed);
                info!(keys = ?keys, removed = removed, "Cache keys invalidated");
                InvalidationResult {
                    keys: keys.into_iter().collect(),
                    removed,
                    applied: true,
                }
            }
            Err(e) => {
                warn!(keys = ?keys, error = %e, "Cache invalidation failed");
                self.metrics.record_backend_error("delete");
                InvalidationResult {
                    keys: keys.into_iter().collect(),
                    removed: 0,
                    applied: false,
                }
            }
        }
    }
}
