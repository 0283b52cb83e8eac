//! Cache key derivation.

use std::fmt;

/// Every key the storefront caches under.
///
/// The `Display` output is the literal key written to the key store, so
/// renaming a variant never changes what is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Categories,
    LatestProducts,
    AllProducts,
    Product(String),
    ProductReviews(String),
    AllOrders,
    MyOrders(String),
    Order(String),
    Coupon(String),
    AdminStats,
    PieCharts,
    BarCharts,
    LineCharts,
    /// One page of a catalog search. Entries expire instead of being invalidated.
    ProductSearch(SearchKey),
}

/// The parameters a search page is cached by. Absent values render empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub page: usize,
}

impl CacheKey {
    /// Builds a product detail key.
    ///
    /// # Examples
    ///
    /// ```
    /// use storefront_server::cache::CacheKey;
    ///
    /// assert_eq!(CacheKey::product("p-1").to_string(), "product-p-1");
    /// assert_eq!(CacheKey::product_reviews("p-1").to_string(), "product-p-1-reviews");
    /// ```
    pub fn product(id: impl Into<String>) -> Self {
        Self::Product(id.into())
    }

    pub fn product_reviews(id: impl Into<String>) -> Self {
        Self::ProductReviews(id.into())
    }

    pub fn my_orders(user_id: impl Into<String>) -> Self {
        Self::MyOrders(user_id.into())
    }

    pub fn order(id: impl Into<String>) -> Self {
        Self::Order(id.into())
    }

    pub fn coupon(id: impl Into<String>) -> Self {
        Self::Coupon(id.into())
    }

    /// The four precomputed dashboard keys.
    pub fn dashboard() -> [Self; 4] {
        [
            Self::AdminStats,
            Self::PieCharts,
            Self::BarCharts,
            Self::LineCharts,
        ]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categories => f.write_str("categories"),
            Self::LatestProducts => f.write_str("latest-products"),
            Self::AllProducts => f.write_str("all-products"),
            Self::Product(id) => write!(f, "product-{id}"),
            Self::ProductReviews(id) => write!(f, "product-{id}-reviews"),
            Self::AllOrders => f.write_str("all-orders"),
            Self::MyOrders(user) => write!(f, "my-orders-{user}"),
            Self::Order(id) => write!(f, "order-{id}"),
            Self::Coupon(id) => write!(f, "coupon-{id}"),
            Self::AdminStats => f.write_str("admin-stats"),
            Self::PieCharts => f.write_str("pie-charts"),
            Self::BarCharts => f.write_str("bar-charts"),
            Self::LineCharts => f.write_str("line-charts"),
            Self::ProductSearch(key) => {
                f.write_str("search")?;
                for part in [&key.search, &key.sort, &key.category, &key.price] {
                    f.write_str("-")?;
                    write_escaped(f, part.as_deref().unwrap_or_default())?;
                }
                write!(f, "-{}", key.page)
            }
        }
    }
}

/// Writes a search parameter with `%` and `-` percent-encoded, so the `-`
/// separators of a search key only ever come from the key itself.
fn write_escaped(f: &mut fmt::Formatter<'_>, part: &str) -> fmt::Result {
    for c in part.chars() {
        match c {
            '%' => f.write_str("%25")?,
            '-' => f.write_str("%2D")?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}
