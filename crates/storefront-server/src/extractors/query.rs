use serde::Deserialize;
use storefront_store::SortOrder;

use crate::cache::SearchKey;

/// Query parameters for the product search.
///
/// Every field is read as a string so that malformed values fall back to
/// "not set" instead of rejecting the request.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub page: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SearchQuery {
    pub fn search(&self) -> Option<&str> {
        non_blank(&self.search)
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(&self.category)
    }

    /// Price sort requested with `sort=asc|desc`.
    pub fn sort_order(&self) -> Option<SortOrder> {
        match non_blank(&self.sort)?.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// Upper price bound.
    pub fn max_price(&self) -> Option<f64> {
        non_blank(&self.price)?
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
    }

    /// One-based page number, defaulting to 1.
    pub fn page(&self) -> usize {
        non_blank(&self.page)
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }

    /// Cache key for the normalized query.
    pub fn cache_key(&self) -> SearchKey {
        SearchKey {
            search: self.search().map(str::to_string),
            sort: self.sort_order().map(|o| match o {
                SortOrder::Asc => "asc".to_string(),
                SortOrder::Desc => "desc".to_string(),
            }),
            category: self.category().map(str::to_lowercase),
            price: self.max_price().map(|p| p.to_string()),
            page: self.page(),
        }
    }
}

/// `GET /order/my?id=`
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct MyOrdersQuery {
    pub id: Option<String>,
}

/// `GET /payment/discount?code=`
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DiscountQuery {
    pub code: Option<String>,
}
